use proc_macro2::Span;
use quote::{ToTokens, format_ident};
use syn::{
    Attribute, Expr, Meta, Token, Type, Visibility, ext::IdentExt, punctuated::Punctuated,
};

use crate::diagnostic::{Diagnostic, DiagnosticKind};

/// How a stored field may be written through the generated API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mutability {
    /// `#[exclusive]`: readable and writable. Writes go through the write barrier.
    ExclusiveWrite,
    /// `#[shared]`: readable only.
    SharedRead,
}

impl Mutability {
    pub fn tag(self) -> &'static str {
        match self {
            Mutability::ExclusiveWrite => "exclusive",
            Mutability::SharedRead => "shared",
        }
    }

    fn from_attribute(attr: &Attribute) -> Option<Self> {
        let ident = attr.path().get_ident()?;
        if ident == "exclusive" {
            Some(Mutability::ExclusiveWrite)
        } else if ident == "shared" {
            Some(Mutability::SharedRead)
        } else {
            None
        }
    }
}

/// A tagged stored field of a value declaration.
#[derive(Debug, Clone)]
pub struct FieldInfo {
    pub vis: Visibility,
    pub field_name: syn::Ident,
    /// PascalCase name of the field's coding key variant.
    pub key_variant: syn::Ident,
    pub field_type: Type,
    pub mutability: Mutability,
    /// The `default = <expr>` of a `#[shared]` field.
    pub default: Option<Expr>,
    /// `#[doc]` attributes, forwarded to the getter.
    pub docs: Vec<Attribute>,
    /// Lint attributes (`#[allow]`, `#[expect]`, `#[warn]`, `#[deny]`, `#[forbid]`), forwarded to
    /// the storage field.
    pub attrs: Vec<Attribute>,
}

impl FieldInfo {
    pub fn is_exclusive(&self) -> bool {
        self.mutability == Mutability::ExclusiveWrite
    }

    /// Fields with a default are filled in by the constructor instead of being parameters.
    pub fn is_constructor_param(&self) -> bool {
        self.default.is_none()
    }

    /// The serialization key and description label: the field name without a raw prefix.
    pub fn key(&self) -> String {
        self.field_name.unraw().to_string()
    }

    /// `set_{field}`
    pub fn setter_ident(&self) -> syn::Ident {
        self.prefixed_ident("set")
    }

    /// `{field}_mut`
    pub fn mut_ident(&self) -> syn::Ident {
        self.suffixed_ident("mut")
    }

    /// Associated function evaluating the field's default.
    pub fn default_fn_ident(&self) -> syn::Ident {
        format_ident!("__default_{}", self.key())
    }

    /// Local variable holding the field's value while decoding.
    pub fn local_ident(&self) -> syn::Ident {
        format_ident!("__field_{}", self.key())
    }

    fn prefixed_ident(&self, prefix: &str) -> syn::Ident {
        syn::Ident::new(&format!("{}_{}", prefix, self.key()), Span::call_site())
    }

    fn suffixed_ident(&self, suffix: &str) -> syn::Ident {
        syn::Ident::new(&format!("{}_{}", self.key(), suffix), Span::call_site())
    }
}

/// Reads the mutability tag of one named field.
///
/// Returns `Ok(None)` for fields that carry no tag.
pub fn parse_field(field: &syn::Field) -> Result<Option<FieldInfo>, Diagnostic> {
    let Some(field_name) = field.ident.clone() else {
        return Err(Diagnostic::structural(field, "expected a named field"));
    };

    let mut tag: Option<(Mutability, &Attribute)> = None;
    let mut default = None;
    let mut docs = Vec::new();
    let mut attrs = Vec::new();
    let mut unsupported = None;

    for attr in &field.attrs {
        let Some(mutability) = Mutability::from_attribute(attr) else {
            if attr.path().is_ident("doc") {
                docs.push(attr.clone());
            } else if is_lint_attribute(attr) {
                attrs.push(attr.clone());
            } else if unsupported.is_none() {
                unsupported = Some(attr);
            }
            continue;
        };

        if let Some((existing, _)) = tag {
            if existing == mutability {
                return Err(Diagnostic::tag_usage(
                    attr,
                    format!(
                        "duplicate #[{}] tag on field `{}`",
                        mutability.tag(),
                        field_name.unraw()
                    ),
                ));
            }
            return Err(Diagnostic::property_kind(
                attr,
                format!(
                    "field `{}` is tagged both #[exclusive] and #[shared]; a stored field has \
                     exactly one mutability",
                    field_name.unraw()
                ),
            ));
        }
        tag = Some((mutability, attr));
        default = parse_tag_arguments(attr)?;
    }

    let Some((mutability, tag_attr)) = tag else {
        return Ok(None);
    };

    if let Some(attr) = unsupported {
        return Err(Diagnostic::tag_usage(
            attr,
            format!(
                "unsupported attribute `#[{}]` on field `{}`; tagged fields only accept doc \
                 comments and lint attributes",
                attr.path().to_token_stream(),
                field_name.unraw()
            ),
        ));
    }

    if is_phantom_data(&field.ty) {
        return Err(Diagnostic::property_kind(
            tag_attr,
            format!(
                "#[{}] requires a stored field, but `{}` is a `PhantomData` marker",
                mutability.tag(),
                field_name.unraw()
            ),
        ));
    }

    if mutability == Mutability::ExclusiveWrite
        && let Some(expr) = &default
    {
        return Err(Diagnostic::tag_usage(
            expr,
            "`default` is only supported on #[shared] fields; #[exclusive] fields are always \
             constructor parameters",
        ));
    }

    let key_variant = key_variant_ident(&field_name);

    Ok(Some(FieldInfo {
        vis: field.vis.clone(),
        field_name,
        key_variant,
        field_type: field.ty.clone(),
        mutability,
        default,
        docs,
        attrs,
    }))
}

/// Parses `#[shared]`, `#[shared(default = <expr>)]` and friends. Returns the default expression.
fn parse_tag_arguments(attr: &Attribute) -> Result<Option<Expr>, Diagnostic> {
    let list = match &attr.meta {
        Meta::Path(_) => return Ok(None),
        Meta::List(list) => list,
        Meta::NameValue(meta) => {
            return Err(Diagnostic::tag_usage(
                meta,
                "expected `#[tag]` or `#[tag(default = <expr>)]`",
            ));
        }
    };

    let nested = list
        .parse_args_with(Punctuated::<Meta, Token![,]>::parse_terminated)
        .map_err(|e| Diagnostic::from_syn(DiagnosticKind::TagUsageError, e))?;

    let mut default = None;
    for meta in nested {
        match meta {
            Meta::NameValue(nv) if nv.path.is_ident("default") => {
                if default.is_some() {
                    return Err(Diagnostic::tag_usage(&nv, "duplicate `default` argument"));
                }
                default = Some(nv.value);
            }
            other => {
                return Err(Diagnostic::tag_usage(
                    &other,
                    "unknown tag argument, expected `default = <expr>`",
                ));
            }
        }
    }
    Ok(default)
}

fn is_lint_attribute(attr: &Attribute) -> bool {
    ["allow", "expect", "warn", "deny", "forbid"]
        .iter()
        .any(|lint| attr.path().is_ident(lint))
}

fn is_phantom_data(ty: &Type) -> bool {
    match ty {
        Type::Path(type_path) => type_path
            .path
            .segments
            .last()
            .is_some_and(|segment| segment.ident == "PhantomData"),
        Type::Group(group) => is_phantom_data(&group.elem),
        Type::Paren(paren) => is_phantom_data(&paren.elem),
        _ => false,
    }
}

fn key_variant_ident(field_name: &syn::Ident) -> syn::Ident {
    let mut name = to_pascal_case(&field_name.unraw().to_string());
    // `self_` would become the keyword `Self`.
    if !name.starts_with(|c: char| c.is_alphabetic()) || name == "Self" {
        name.insert_str(0, "Field");
    }
    syn::Ident::new(&name, field_name.span())
}

fn capitalize(s: &str) -> String {
    let mut c = s.chars();
    match c.next() {
        None => String::new(),
        Some(f) => f.to_uppercase().collect::<String>() + c.as_str(),
    }
}

/// Convert snake_case to PascalCase (e.g., "first_name" -> "FirstName")
pub fn to_pascal_case(s: &str) -> String {
    s.split('_').map(capitalize).collect::<String>()
}
