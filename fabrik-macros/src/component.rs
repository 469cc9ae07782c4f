mod attr;

pub(crate) use attr::ComponentArgs;

use crate::component::attr::{parse_factory_attrs, FactoryArgs};

use proc_macro2::TokenStream;
use quote::{format_ident, quote, quote_spanned, ToTokens as _};
use syn::{
    parse_quote, spanned::Spanned as _, Error, FnArg, GenericArgument, Ident, ImplItem, ImplItemFn, Item, ItemImpl, PathArguments,
    ReturnType, Type,
};

/// Type the function provides and whether it's wrapped into `Result`
fn return_shape(output: &ReturnType) -> (Type, bool) {
    match output {
        ReturnType::Default => (parse_quote! { () }, false),
        ReturnType::Type(_, ty) => match result_ok_type(ty) {
            Some(ok) => (ok.clone(), true),
            None => (ty.as_ref().clone(), false),
        },
    }
}

fn result_ok_type(ty: &Type) -> Option<&Type> {
    let Type::Path(path) = ty else {
        return None;
    };
    let segment = path.path.segments.last()?;
    if segment.ident != "Result" {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    match args.args.first()? {
        GenericArgument::Type(ok) => Some(ok),
        _ => None,
    }
}

fn is_self(ty: &Type, self_ty: &Type) -> bool {
    match ty {
        Type::Path(path) if path.qself.is_none() && path.path.is_ident("Self") => true,
        _ => ty.to_token_stream().to_string() == self_ty.to_token_stream().to_string(),
    }
}

fn expand_member(
    impl_item_fn: &ImplItemFn,
    self_ty: &Type,
    configuration: bool,
    factory_args: Option<FactoryArgs>,
) -> syn::Result<Option<TokenStream>> {
    let sig = &impl_item_fn.sig;
    let fn_name = &sig.ident;
    let span = impl_item_fn.span();

    let receiver = sig.receiver().is_some();
    let arity = sig.inputs.iter().filter(|input| matches!(input, FnArg::Typed(_))).count();
    let (provides, fallible) = return_shape(&sig.output);
    // Configuration components don't have constructors: `fn make() -> Self` there provides the component itself
    let constructor = !configuration && !receiver && is_self(&provides, self_ty);

    // Unmarked constructors are kept for the type-level marker, other unmarked functions don't matter
    if factory_args.is_none() && !constructor {
        return Ok(None);
    }

    if factory_args.is_some() {
        if let Some(asyncness) = &sig.asyncness {
            return Err(Error::new_spanned(asyncness, "async factories aren't supported"));
        }
        if let Some(unsafety) = &sig.unsafety {
            return Err(Error::new_spanned(unsafety, "unsafe factories aren't supported"));
        }
        if !sig.generics.params.is_empty() {
            return Err(Error::new_spanned(&sig.generics, "generic factories aren't supported"));
        }
        if let Type::ImplTrait(_) = provides {
            return Err(Error::new_spanned(&provides, "factory must return a concrete type"));
        }
    }

    let name = fn_name.to_string();
    let member = if constructor {
        quote_spanned! { span => ::fabrik::Member::constructor::<#provides>(#name) }
    } else {
        quote_spanned! { span => ::fabrik::Member::method::<#provides>(#name) }
    };
    let receiver = receiver.then(|| quote! { .with_receiver() });
    let arity = (arity > 0).then(|| quote! { .with_arity(#arity) });
    let factory = factory_args.map(|args| match args.priority {
        Some((_, priority)) => quote_spanned! { priority.span() => .factory(::core::option::Option::Some(#priority)) },
        None => quote! { .factory(::core::option::Option::None) },
    });

    let callable = receiver.is_none()
        && arity.is_none()
        && sig.asyncness.is_none()
        && sig.unsafety.is_none()
        && sig.generics.params.is_empty();
    let instantiator = callable.then(|| {
        let build = if fallible {
            quote_spanned! { span =>
                Self::#fn_name().map_err(|err| ::fabrik::InstantiateErrorKind::Custom(::core::convert::Into::into(err)))
            }
        } else {
            quote_spanned! { span =>
                ::core::result::Result::Ok::<_, ::fabrik::InstantiateErrorKind>(Self::#fn_name())
            }
        };
        quote! { .instantiator(::fabrik::Instantiator::new(|| #build)) }
    });

    Ok(Some(quote! {
        #member #receiver #arity #factory #instantiator
    }))
}

fn entry_getter_name(self_ty: &Type) -> Ident {
    let name = self_ty
        .to_token_stream()
        .to_string()
        .chars()
        .map(|char| if char.is_ascii_alphanumeric() { char.to_ascii_uppercase() } else { '_' })
        .collect::<String>();
    format_ident!("__FABRIK_COMPONENT_{}", name)
}

pub(crate) fn expand(args: ComponentArgs, mut item: Item) -> syn::Result<TokenStream> {
    let (trait_, generics, self_ty, items) = match &mut item {
        Item::Impl(ItemImpl {
            trait_,
            generics,
            self_ty,
            items,
            ..
        }) => (trait_, generics, self_ty, items),
        other => return Err(Error::new_spanned(other, "#[component] can only be used on `impl` blocks")),
    };
    if let Some((_, path, _)) = trait_ {
        return Err(Error::new_spanned(path, "you can't use macro with trait"));
    }
    if !generics.params.is_empty() {
        return Err(Error::new_spanned(generics, "generic components aren't supported"));
    }

    let mut members = Vec::new();
    for impl_item in items.iter_mut() {
        let ImplItem::Fn(impl_item_fn) = impl_item else {
            continue;
        };

        let factory_args = parse_factory_attrs(&impl_item_fn.attrs).transpose()?;
        // Remove `factory` attribute from final code
        impl_item_fn.attrs.retain(|attr| !attr.path().is_ident("factory"));

        if let Some(member) = expand_member(impl_item_fn, self_ty, args.configuration.is_some(), factory_args)? {
            members.push(member);
        }
    }

    let configuration = args.configuration.map(|_| quote! { .configuration() });
    let factory = args.factory.map(|_| match args.priority {
        Some((_, priority)) => quote_spanned! { priority.span() => .factory(::core::option::Option::Some(#priority)) },
        None => quote! { .factory(::core::option::Option::None) },
    });
    let getter_name = entry_getter_name(self_ty);
    let self_ty = self_ty.clone();

    Ok(quote! {
        #item

        impl ::fabrik::Component for #self_ty {
            fn component() -> ::fabrik::ComponentData {
                ::fabrik::ComponentData::new::<Self>(::core::module_path!())
                    #configuration
                    #factory
                    #( .member(#members) )*
            }
        }

        #[::fabrik::entry_getters::distributed_slice(::fabrik::entry_getters::__COMPONENT_GETTERS)]
        #[linkme(crate = ::fabrik::entry_getters::linkme)]
        static #getter_name: fn() -> ::fabrik::ComponentData = <#self_ty as ::fabrik::Component>::component;
    })
}
