use std::path::Path;

use proc_macro2::Span;
use quote::ToTokens;
use serde::Serialize;
use turbo_cow_codegen::{Capability, CapabilitySet, Declaration, Diagnostic, FieldInfo};

use crate::expand::{Expansion, Form};

#[derive(Serialize)]
pub struct FileReport {
    file: String,
    declarations: Vec<DeclarationReport>,
}

impl FileReport {
    pub fn new(file: &Path, expansions: &[Expansion]) -> Self {
        FileReport {
            file: file.display().to_string(),
            declarations: expansions.iter().map(DeclarationReport::new).collect(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "lowercase")]
enum FormReport {
    Attribute,
    Declare,
}

#[derive(Serialize)]
struct Location {
    line: usize,
    /// 1-based.
    column: usize,
}

impl From<Span> for Location {
    fn from(span: Span) -> Self {
        let start = span.start();
        Location {
            line: start.line,
            column: start.column + 1,
        }
    }
}

#[derive(Serialize)]
struct DeclarationReport {
    name: String,
    form: FormReport,
    location: Location,
    #[serde(skip_serializing_if = "Option::is_none")]
    analysis: Option<AnalysisReport>,
    diagnostics: Vec<DiagnosticReport>,
}

impl DeclarationReport {
    fn new(expansion: &Expansion) -> Self {
        let (analysis, diagnostics) = match &expansion.result {
            Ok(declaration) => (Some(AnalysisReport::new(declaration)), Vec::new()),
            Err(diagnostic) => (None, vec![DiagnosticReport::new(diagnostic)]),
        };
        DeclarationReport {
            name: expansion.name.clone(),
            form: match expansion.form {
                Form::Attribute => FormReport::Attribute,
                Form::Declare => FormReport::Declare,
            },
            location: expansion.span.into(),
            analysis,
            diagnostics,
        }
    }
}

#[derive(Serialize)]
struct AnalysisReport {
    fields: Vec<FieldReport>,
    skipped_fields: Vec<String>,
    requested: Vec<&'static str>,
    synthesized: Vec<&'static str>,
    suppressed: Vec<&'static str>,
    coding_key: Option<String>,
    warnings: Vec<String>,
}

impl AnalysisReport {
    fn new(declaration: &Declaration) -> Self {
        let mut warnings = Vec::new();
        if declaration.hash_relies_on_manual_equality() {
            warnings.push(
                "Hash is synthesized over every stored field but PartialEq is hand-written; \
                 values the manual PartialEq considers equal may hash differently"
                    .to_string(),
            );
        }
        AnalysisReport {
            fields: declaration.fields.iter().map(FieldReport::new).collect(),
            skipped_fields: declaration
                .skipped_fields
                .iter()
                .map(ToString::to_string)
                .collect(),
            requested: trait_names(&declaration.requested),
            synthesized: trait_names(&declaration.synthesized),
            suppressed: declaration
                .suppressed
                .iter()
                .map(|capability| capability.trait_name())
                .collect(),
            coding_key: declaration
                .needs_coding_key()
                .then(|| declaration.coding_key_ident().to_string()),
            warnings,
        }
    }
}

fn trait_names(capabilities: &CapabilitySet) -> Vec<&'static str> {
    capabilities.iter().map(Capability::trait_name).collect()
}

#[derive(Serialize)]
struct FieldReport {
    name: String,
    #[serde(rename = "type")]
    ty: String,
    mutability: &'static str,
    has_default: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    default: Option<String>,
}

impl FieldReport {
    fn new(field: &FieldInfo) -> Self {
        FieldReport {
            name: field.key(),
            ty: field.field_type.to_token_stream().to_string(),
            mutability: field.mutability.tag(),
            has_default: field.default.is_some(),
            default: field
                .default
                .as_ref()
                .map(|expr| expr.to_token_stream().to_string()),
        }
    }
}

#[derive(Serialize)]
struct DiagnosticReport {
    domain: &'static str,
    id: &'static str,
    severity: &'static str,
    message: String,
    location: Location,
}

impl DiagnosticReport {
    fn new(diagnostic: &Diagnostic) -> Self {
        DiagnosticReport {
            domain: diagnostic.domain(),
            id: diagnostic.id(),
            severity: diagnostic.severity().as_str(),
            message: diagnostic.message().to_string(),
            location: diagnostic.span().into(),
        }
    }
}
