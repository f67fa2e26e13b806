use proc_macro2::{Span, TokenStream};
use syn::spanned::Spanned;

/// The domain every diagnostic id belongs to.
pub const DIAGNOSTIC_DOMAIN: &str = "turbo_cow";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// The annotation was applied to something that isn't a single-level struct with named fields.
    StructuralError,
    /// A mutability tag was applied to a field that doesn't store a value.
    PropertyKindError,
    /// A type option or a field tag argument is malformed or not allowed in that position.
    TagUsageError,
}

impl DiagnosticKind {
    pub fn id(self) -> &'static str {
        match self {
            DiagnosticKind::StructuralError => "structural",
            DiagnosticKind::PropertyKindError => "property-kind",
            DiagnosticKind::TagUsageError => "tag-usage",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Error => "error",
        }
    }
}

/// A fatal problem with one declaration. Expansion of that declaration stops and the diagnostic is
/// the only output.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct Diagnostic {
    kind: DiagnosticKind,
    message: String,
    span: Span,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, span: Span, message: impl Into<String>) -> Self {
        Diagnostic {
            kind,
            message: message.into(),
            span,
        }
    }

    pub fn structural(node: &impl Spanned, message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::StructuralError, node.span(), message)
    }

    pub fn property_kind(node: &impl Spanned, message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::PropertyKindError, node.span(), message)
    }

    pub fn tag_usage(node: &impl Spanned, message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::TagUsageError, node.span(), message)
    }

    /// Wraps a parse error, keeping its span.
    pub fn from_syn(kind: DiagnosticKind, error: syn::Error) -> Self {
        Self::new(kind, error.span(), error.to_string())
    }

    pub fn kind(&self) -> DiagnosticKind {
        self.kind
    }

    pub fn domain(&self) -> &'static str {
        DIAGNOSTIC_DOMAIN
    }

    pub fn id(&self) -> &'static str {
        self.kind.id()
    }

    pub fn severity(&self) -> Severity {
        Severity::Error
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn to_compile_error(&self) -> TokenStream {
        syn::Error::new(
            self.span,
            format!("[{}::{}] {}", self.domain(), self.id(), self.message),
        )
        .to_compile_error()
    }
}
