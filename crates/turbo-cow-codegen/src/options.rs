use syn::{
    Attribute, Ident, Meta, Result, Token, Visibility,
    parse::{Parse, ParseStream},
};

/// Visibility of the generated constructor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InitVisibility {
    /// Same visibility as the type.
    #[default]
    Inherit,
    /// `pub(crate)`, regardless of the type's visibility.
    Internal,
    /// `pub`, regardless of the type's visibility.
    Public,
}

/// The arguments of the type-level tag: `#[value(serde, new_vis = pub(crate))]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValueOptions {
    /// Requests both serialization capabilities.
    pub serde: bool,
    pub init_visibility: InitVisibility,
}

impl ValueOptions {
    /// Reads the options of a `#[value]`, `#[value(...)]` or `#[turbo_cow::value(...)]` attribute.
    pub fn from_attribute(attr: &Attribute) -> Result<Self> {
        match &attr.meta {
            Meta::Path(_) => Ok(ValueOptions::default()),
            Meta::List(_) => attr.parse_args(),
            Meta::NameValue(meta) => Err(syn::Error::new_spanned(
                meta,
                "expected `#[value]` or `#[value(...)]`",
            )),
        }
    }
}

impl Parse for ValueOptions {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut options = ValueOptions::default();
        let mut seen_new_vis = false;
        while !input.is_empty() {
            let ident: Ident = input.parse()?;
            match ident.to_string().as_str() {
                "serde" => options.serde = true,
                "new_vis" => {
                    if seen_new_vis {
                        return Err(syn::Error::new_spanned(ident, "duplicate `new_vis` option"));
                    }
                    seen_new_vis = true;
                    input.parse::<Token![=]>()?;
                    let vis: Visibility = input.parse()?;
                    options.init_visibility = match vis {
                        Visibility::Public(_) => InitVisibility::Public,
                        Visibility::Restricted(_) | Visibility::Inherited => {
                            InitVisibility::Internal
                        }
                    };
                }
                _ => {
                    return Err(syn::Error::new_spanned(
                        ident,
                        "unexpected token, expected: \"serde\" or \"new_vis\"",
                    ));
                }
            }
            if input.is_empty() {
                break;
            }
            input.parse::<Token![,]>()?;
        }
        Ok(options)
    }
}
