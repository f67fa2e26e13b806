use indexmap::IndexSet;
use syn::{Attribute, Path, Token, parse_quote, punctuated::Punctuated};

use crate::diagnostic::{Diagnostic, DiagnosticKind};

/// A standard behavior a value type can ask the macro to synthesize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Capability {
    /// `Debug`
    Description,
    /// `PartialEq`
    Equality,
    /// `Eq`
    TotalEquality,
    /// `Hash`
    Hashing,
    /// `Deserialize`
    Decode,
    /// `Serialize`
    Encode,
}

impl Capability {
    pub const ALL: [Capability; 6] = [
        Capability::Description,
        Capability::Equality,
        Capability::TotalEquality,
        Capability::Hashing,
        Capability::Decode,
        Capability::Encode,
    ];

    /// Maps the last segment of a derive path to a capability.
    pub fn from_derive(name: &str) -> Option<Self> {
        Some(match name {
            "Debug" => Capability::Description,
            "PartialEq" => Capability::Equality,
            "Eq" => Capability::TotalEquality,
            "Hash" => Capability::Hashing,
            "Deserialize" => Capability::Decode,
            "Serialize" => Capability::Encode,
            _ => return None,
        })
    }

    pub fn trait_name(self) -> &'static str {
        match self {
            Capability::Description => "Debug",
            Capability::Equality => "PartialEq",
            Capability::TotalEquality => "Eq",
            Capability::Hashing => "Hash",
            Capability::Decode => "Deserialize",
            Capability::Encode => "Serialize",
        }
    }

    /// Capabilities whose trait has another one as a supertrait.
    fn implies(self) -> Option<Capability> {
        match self {
            Capability::TotalEquality | Capability::Hashing => Some(Capability::Equality),
            _ => None,
        }
    }
}

/// An ordered set of capabilities. Iteration follows insertion order, which keeps generated output
/// stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapabilitySet {
    capabilities: IndexSet<Capability>,
}

impl CapabilitySet {
    pub fn insert(&mut self, capability: Capability) {
        if self.capabilities.insert(capability)
            && let Some(implied) = capability.implies()
        {
            self.insert(implied);
        }
    }

    /// The combined encode and decode capability.
    pub fn insert_serialization(&mut self) {
        self.insert(Capability::Decode);
        self.insert(Capability::Encode);
    }

    pub fn contains(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    pub fn is_empty(&self) -> bool {
        self.capabilities.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
        self.capabilities.iter().copied()
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        let mut set = CapabilitySet::default();
        for capability in iter {
            set.insert(capability);
        }
        set
    }
}

/// Splits the `#[derive(...)]` lists of a declaration into requested capabilities and the derives
/// that pass through untouched.
///
/// `Clone` is dropped: the generated type has its own `Clone` that shares storage.
pub fn extract_capabilities(
    attrs: Vec<Attribute>,
) -> Result<(CapabilitySet, Vec<Attribute>), Diagnostic> {
    let mut capabilities = CapabilitySet::default();
    let mut kept_attrs = Vec::with_capacity(attrs.len());

    for attr in attrs {
        if !attr.path().is_ident("derive") {
            kept_attrs.push(attr);
            continue;
        }

        let paths = attr
            .parse_args_with(Punctuated::<Path, Token![,]>::parse_terminated)
            .map_err(|e| Diagnostic::from_syn(DiagnosticKind::TagUsageError, e))?;

        let mut passthrough = Vec::new();
        for path in paths {
            let Some(name) = path.segments.last().map(|segment| segment.ident.to_string()) else {
                continue;
            };
            if let Some(capability) = Capability::from_derive(&name) {
                capabilities.insert(capability);
            } else if name != "Clone" {
                passthrough.push(path);
            }
        }

        if !passthrough.is_empty() {
            kept_attrs.push(parse_quote!(#[derive(#(#passthrough),*)]));
        }
    }

    Ok((capabilities, kept_attrs))
}
