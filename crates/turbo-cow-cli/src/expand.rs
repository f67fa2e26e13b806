use std::{fs, path::PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, ValueEnum};
use proc_macro2::{Span, TokenStream};
use syn::{Item, ItemMacro, spanned::Spanned};
use turbo_cow_codegen::{
    Declaration, DeclarationBlock, Diagnostic, DiagnosticKind, analyze_block, analyze_item,
    synthesize,
};

use crate::report::FileReport;

#[derive(Args)]
pub struct Expand {
    /// The Rust source file to scan for `#[value]` structs and `declare!` blocks.
    file: PathBuf,
    /// What to print to stdout.
    #[arg(long, value_enum, default_value_t = Emit::Tokens)]
    emit: Emit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Emit {
    /// The generated code of every declaration.
    Tokens,
    /// A JSON summary of every declaration: fields, capabilities and diagnostics.
    Report,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Form {
    Attribute,
    Declare,
}

/// The outcome of expanding one declaration.
pub struct Expansion {
    pub name: String,
    pub form: Form,
    pub span: Span,
    pub result: Result<Declaration, Diagnostic>,
}

impl Expansion {
    /// The generated code, or the diagnostic as a `compile_error!` invocation.
    pub fn tokens(&self) -> TokenStream {
        match &self.result {
            Ok(declaration) => synthesize(declaration),
            Err(diagnostic) => diagnostic.to_compile_error(),
        }
    }
}

pub fn run(args: Expand) -> Result<()> {
    let source = fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    let file = syn::parse_file(&source)
        .with_context(|| format!("failed to parse {}", args.file.display()))?;

    let expansions = expand_file(&file);
    tracing::info!(
        file = %args.file.display(),
        declarations = expansions.len(),
        "expanded"
    );

    match args.emit {
        Emit::Tokens => {
            for expansion in &expansions {
                println!("// {}", expansion.name);
                println!("{}", expansion.tokens());
            }
        }
        Emit::Report => {
            let report = FileReport::new(&args.file, &expansions);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    let failures = expansions
        .iter()
        .filter(|expansion| expansion.result.is_err())
        .count();
    if failures > 0 {
        bail!(
            "{failures} of {} declarations in {} failed to expand",
            expansions.len(),
            args.file.display()
        );
    }
    Ok(())
}

/// Expands every declaration in `file`, including those in inline modules. A failing declaration
/// doesn't affect the others.
pub fn expand_file(file: &syn::File) -> Vec<Expansion> {
    let mut expansions = Vec::new();
    collect_items(&file.items, &mut expansions);
    expansions
}

fn collect_items(items: &[Item], expansions: &mut Vec<Expansion>) {
    for item in items {
        match item {
            Item::Macro(item) if is_declare_macro(item) => {
                expansions.push(expand_declare(item));
            }
            Item::Mod(item) => {
                if let Some((_, items)) = &item.content {
                    collect_items(items, expansions);
                }
            }
            item => {
                if let Some(expansion) = expand_attribute(item) {
                    expansions.push(expansion);
                }
            }
        }
    }
}

fn expand_attribute(item: &Item) -> Option<Expansion> {
    let (name, span) = match item {
        Item::Struct(item) => (item.ident.to_string(), item.ident.span()),
        Item::Enum(item) => (item.ident.to_string(), item.ident.span()),
        Item::Union(item) => (item.ident.to_string(), item.ident.span()),
        Item::Trait(item) => (item.ident.to_string(), item.ident.span()),
        Item::Type(item) => (item.ident.to_string(), item.ident.span()),
        Item::Fn(item) => (item.sig.ident.to_string(), item.sig.ident.span()),
        other => ("item".to_string(), other.span()),
    };
    let _span = tracing::debug_span!("declaration", name = %name).entered();

    let result = analyze_item(item.clone())?;
    log_result(&result);
    Some(Expansion {
        name,
        form: Form::Attribute,
        span,
        result,
    })
}

fn is_declare_macro(item: &ItemMacro) -> bool {
    item.mac
        .path
        .segments
        .last()
        .is_some_and(|segment| segment.ident == "declare")
}

fn expand_declare(item: &ItemMacro) -> Expansion {
    let span = item.mac.path.span();
    let result = syn::parse2::<DeclarationBlock>(item.mac.tokens.clone())
        .map_err(|e| Diagnostic::from_syn(DiagnosticKind::StructuralError, e))
        .and_then(analyze_block)
        .map(|(declaration, _)| declaration);
    let name = match &result {
        Ok(declaration) => declaration.ident.to_string(),
        Err(_) => "declare!".to_string(),
    };
    let _span = tracing::debug_span!("declaration", name = %name).entered();
    log_result(&result);
    Expansion {
        name,
        form: Form::Declare,
        span,
        result,
    }
}

fn log_result(result: &Result<Declaration, Diagnostic>) {
    match result {
        Ok(declaration) => tracing::debug!(
            fields = declaration.fields.len(),
            skipped = declaration.skipped_fields.len(),
            "analyzed"
        ),
        Err(diagnostic) => tracing::warn!(
            id = diagnostic.id(),
            message = diagnostic.message(),
            "declaration failed"
        ),
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn expand(source: &str) -> Vec<Expansion> {
        expand_file(&syn::parse_file(source).unwrap())
    }

    #[test]
    fn test_finds_attribute_and_declare_forms() {
        let expansions = expand(
            r#"
            #[turbo_cow::value]
            pub struct Person {
                #[exclusive]
                name: String,
            }

            struct Unrelated;

            mod nested {
                turbo_cow::declare! {
                    #[value(serde)]
                    struct Tag { #[shared] name: String }
                }
            }
            "#,
        );
        let names: Vec<&str> = expansions.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["Person", "Tag"]);
        assert_eq!(expansions[0].form, Form::Attribute);
        assert_eq!(expansions[1].form, Form::Declare);
        assert!(expansions.iter().all(|e| e.result.is_ok()));
    }

    #[rstest]
    #[case::attribute("#[value] struct Id { #[shared] id: u64 }", Form::Attribute)]
    #[case::qualified_attribute(
        "#[turbo_cow::value] struct Id { #[shared] id: u64 }",
        Form::Attribute
    )]
    #[case::declare("declare! { #[value] struct Id { #[shared] id: u64 } }", Form::Declare)]
    #[case::qualified_declare(
        "turbo_cow::declare! { #[turbo_cow::value] struct Id { #[shared] id: u64 } }",
        Form::Declare
    )]
    fn test_recognized_forms(#[case] source: &str, #[case] form: Form) {
        let expansions = expand(source);
        assert_eq!(expansions.len(), 1);
        assert_eq!(expansions[0].name, "Id");
        assert_eq!(expansions[0].form, form);
        assert!(expansions[0].result.is_ok());
    }

    #[test]
    fn test_failures_are_independent() {
        let expansions = expand(
            r#"
            #[value]
            struct Broken {
                #[exclusive]
                #[shared]
                name: String,
            }

            #[value]
            struct Fine {
                #[shared]
                id: u64,
            }

            #[value]
            enum Shape { Circle }
            "#,
        );
        assert_eq!(expansions.len(), 3);
        let diagnostic = expansions[0].result.as_ref().err().unwrap();
        assert_eq!(diagnostic.kind(), DiagnosticKind::PropertyKindError);
        assert!(expansions[1].result.is_ok());
        assert!(expansions[1].tokens().to_string().contains("struct FineStorage"));
        assert_eq!(expansions[2].name, "Shape");
        assert!(expansions[2].tokens().to_string().contains("compile_error"));
    }

    #[test]
    fn test_malformed_declare_block() {
        let expansions = expand("declare! { struct Missing { #[shared] id: u64 } }");
        assert_eq!(expansions.len(), 1);
        assert_eq!(expansions[0].name, "declare!");
        let diagnostic = expansions[0].result.as_ref().err().unwrap();
        assert_eq!(diagnostic.kind(), DiagnosticKind::StructuralError);
    }
}
