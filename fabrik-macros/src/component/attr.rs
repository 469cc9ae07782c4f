use syn::{
    parse::{Parse, ParseStream},
    Attribute, Expr, Token,
};

use crate::attr_parsing::{combine_attribute, parse_assignment_attribute, parse_attrs, parse_flag_attribute, Combine};

pub(crate) mod kw {
    syn::custom_keyword!(configuration);
    syn::custom_keyword!(factory);
    syn::custom_keyword!(priority);
}

/// Arguments of `#[component(...)]`
pub(crate) struct ComponentArgs {
    pub(super) configuration: Option<kw::configuration>,
    pub(super) factory: Option<kw::factory>,
    pub(super) priority: Option<(kw::priority, Expr)>,
}

impl Parse for ComponentArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut configuration = None;
        let mut factory = None;
        let mut priority = None;

        while !input.is_empty() {
            let lh = input.lookahead1();
            if lh.peek(kw::configuration) {
                parse_flag_attribute(input, &mut configuration)?;
            } else if lh.peek(kw::factory) {
                parse_flag_attribute(input, &mut factory)?;
            } else if lh.peek(kw::priority) {
                parse_assignment_attribute(input, &mut priority)?;
            } else {
                return Err(lh.error());
            }

            if !input.is_empty() {
                input.parse::<Token![,]>()?;
            }
        }

        if let (Some(configuration), Some(_)) = (&configuration, &factory) {
            return Err(syn::Error::new_spanned(
                configuration,
                "configuration component can't be a factory itself, mark its associated functions with `#[factory]` instead",
            ));
        }
        if let (Some((kw, _)), None) = (&priority, &factory) {
            return Err(syn::Error::new_spanned(kw, "`priority` requires `factory`"));
        }

        Ok(Self {
            configuration,
            factory,
            priority,
        })
    }
}

/// Arguments of `#[factory(...)]` on an associated function
pub(crate) struct FactoryArgs {
    pub(super) priority: Option<(kw::priority, Expr)>,
}

impl Parse for FactoryArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut priority = None;

        while !input.is_empty() {
            let lh = input.lookahead1();
            if lh.peek(kw::priority) {
                parse_assignment_attribute(input, &mut priority)?;
            } else {
                return Err(lh.error());
            }

            if !input.is_empty() {
                input.parse::<Token![,]>()?;
            }
        }

        Ok(Self { priority })
    }
}

impl Combine for FactoryArgs {
    fn combine(mut self, other: Self) -> syn::Result<Self> {
        combine_attribute(&mut self.priority, other.priority)?;
        Ok(self)
    }
}

pub(crate) fn parse_factory_attrs(attrs: &[Attribute]) -> Option<syn::Result<FactoryArgs>> {
    parse_attrs("factory", attrs).map(|result| result.map_err(|(err, attr)| syn::Error::new_spanned(attr, err)))
}
