use proc_macro2::TokenStream;
use quote::{format_ident, quote, quote_spanned};
use syn::{
    ext::IdentExt as _,
    parse::{Parse, ParseStream},
    Error, Ident, Item, ItemConst, ItemStatic, LitStr, StaticMutability, Token,
};

use crate::attr_parsing::parse_assignment_attribute;

mod kw {
    syn::custom_keyword!(owner);
}

/// Arguments of `#[import(...)]`
pub(crate) struct ImportArgs {
    owner: Option<(kw::owner, LitStr)>,
}

impl Parse for ImportArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut owner = None;

        while !input.is_empty() {
            let lh = input.lookahead1();
            if lh.peek(kw::owner) {
                parse_assignment_attribute(input, &mut owner)?;
            } else {
                return Err(lh.error());
            }

            if !input.is_empty() {
                input.parse::<Token![,]>()?;
            }
        }

        Ok(Self { owner })
    }
}

fn entry_getter(ident: &Ident, owner: &TokenStream, site: &TokenStream) -> TokenStream {
    let name = ident.unraw().to_string();
    let getter_name = format_ident!("__FABRIK_IMPORT_{}", name.to_uppercase());

    quote_spanned! { ident.span() =>
        #[::fabrik::entry_getters::distributed_slice(::fabrik::entry_getters::__IMPORT_GETTERS)]
        #[linkme(crate = ::fabrik::entry_getters::linkme)]
        #[allow(clippy::borrow_interior_mutable_const)]
        static #getter_name: fn() -> ::fabrik::ImportSite = || {
            ::fabrik::ImportSite::#site(#owner, #name, &#ident)
        };
    }
}

pub(crate) fn expand(args: ImportArgs, item: Item) -> syn::Result<TokenStream> {
    let owner = match &args.owner {
        Some((_, owner)) => quote_spanned! { owner.span() => #owner },
        None => quote! { ::core::module_path!() },
    };

    let getter = match &item {
        Item::Static(ItemStatic {
            mutability: StaticMutability::Mut(mutability),
            ..
        }) => {
            return Err(Error::new_spanned(
                mutability,
                "`static mut` can't be imported into, use `static` with `Import::new()`",
            ))
        }
        Item::Static(ItemStatic { ident, .. }) => entry_getter(ident, &owner, &quote! { of_static }),
        // Not writable: reported by the injector when something has to be assigned here
        Item::Const(ItemConst { ident, .. }) => entry_getter(ident, &owner, &quote! { of_const }),
        _ => {
            return Err(Error::new_spanned(
                item,
                "#[import] can only be used on `static` items of type `Import<T>`",
            ))
        }
    };

    Ok(quote! {
        #item
        #getter
    })
}
