use proc_macro::TokenStream;
use quote::{quote, ToTokens};
use std::env::var_os;
use syn::parse::Parse;

mod attr_parsing;
mod component;
mod import;

/// Registers an inherent `impl` block as a component.
///
/// Associated functions marked with `#[factory]` or `#[factory(priority = N)]` build dependencies.
/// The component itself can be marked with `#[component(configuration)]`, so that each of its factories
/// provides its own dependency, or with `#[component(factory, priority = N)]`, so that it's built with its only constructor.
///
/// ```ignore
/// struct Engine;
///
/// #[component]
/// impl Engine {
///     #[factory(priority = 1)]
///     fn new() -> Self {
///         Self
///     }
/// }
/// ```
#[proc_macro_attribute]
pub fn component(attr: TokenStream, item: TokenStream) -> TokenStream {
    expand_with(attr, item, component::expand)
}

/// Registers a `static` item of type `Import<T>` as an import.
///
/// The module the item is declared in is its owner, use `#[import(owner = "path")]` to override it.
///
/// ```ignore
/// #[import]
/// static ENGINE: Import<Engine> = Import::new();
/// ```
#[proc_macro_attribute]
pub fn import(attr: TokenStream, item: TokenStream) -> TokenStream {
    expand_with(attr, item, import::expand)
}

fn expand_with<F, A, I, K>(attr: TokenStream, input: TokenStream, f: F) -> TokenStream
where
    F: FnOnce(A, I) -> syn::Result<K>,
    A: Parse,
    I: Parse,
    K: ToTokens,
{
    expand(syn::parse(attr).and_then(|args| syn::parse(input).and_then(|item| f(args, item))))
}

fn expand<T>(result: syn::Result<T>) -> TokenStream
where
    T: ToTokens,
{
    match result {
        Ok(tokens) => {
            let tokens = (quote! { #tokens }).into();
            if var_os("MACROS_DEBUG").is_some() {
                eprintln!("{tokens}");
            }
            tokens
        }
        Err(err) => err.into_compile_error().into(),
    }
}
