use proc_macro2::TokenStream;
use quote::ToTokens;
use std::any;
use syn::{
    parse::{Parse, ParseStream},
    Meta, Token,
};

fn keyword_name<K>() -> &'static str {
    let name = any::type_name::<K>();
    name.rsplit_once("::").map_or(name, |(_, last)| last)
}

fn specified_more_than_once<K: ToTokens>(kw: K) -> syn::Error {
    syn::Error::new_spanned(kw, ["`", keyword_name::<K>(), "` specified more than once"].concat())
}

/// Parses `kw = value` into `out`, failing if `out` is already set
pub(crate) fn parse_assignment_attribute<K, T>(input: ParseStream<'_>, out: &mut Option<(K, T)>) -> syn::Result<()>
where
    K: Parse + ToTokens,
    T: Parse,
{
    let kw = input.parse()?;
    input.parse::<Token![=]>()?;
    let inner = input.parse()?;

    if out.is_some() {
        return Err(specified_more_than_once(kw));
    }

    *out = Some((kw, inner));

    Ok(())
}

/// Parses a bare keyword flag into `out`, failing if `out` is already set
pub(crate) fn parse_flag_attribute<K>(input: ParseStream<'_>, out: &mut Option<K>) -> syn::Result<()>
where
    K: Parse + ToTokens,
{
    let kw = input.parse()?;

    if out.is_some() {
        return Err(specified_more_than_once(kw));
    }

    *out = Some(kw);

    Ok(())
}

pub(crate) trait Combine: Sized {
    fn combine(self, other: Self) -> syn::Result<Self>;
}

/// Parses and combines all attributes named `ident`.
/// Attributes without arguments, like `#[factory]`, are parsed from empty input.
pub(crate) fn parse_attrs<T>(ident: &str, attrs: &[syn::Attribute]) -> Option<Result<T, (syn::Error, syn::Attribute)>>
where
    T: Combine + Parse,
{
    let mut iter = attrs
        .iter()
        .filter(|attr| attr.meta.path().is_ident(ident))
        .map(|attr| match &attr.meta {
            Meta::Path(_) => (attr, syn::parse2::<T>(TokenStream::new())),
            _ => (attr, attr.parse_args::<T>()),
        });

    let first = match iter.next() {
        Some((_, Ok(first))) => first,
        Some((attr, Err(err))) => return Some(Err((err, attr.clone()))),
        None => return None,
    };

    let result = iter.try_fold(first, |out, (attr, next_result)| match next_result {
        Ok(next) => out.combine(next).map_err(|err| (err, attr.clone())),
        Err(err) => Err((err, attr.clone())),
    });

    Some(result)
}

pub(crate) fn combine_attribute<K, T>(a: &mut Option<(K, T)>, b: Option<(K, T)>) -> syn::Result<()>
where
    K: ToTokens,
{
    if let Some((kw, inner)) = b {
        if a.is_some() {
            return Err(specified_more_than_once(kw));
        }
        *a = Some((kw, inner));
    }
    Ok(())
}
