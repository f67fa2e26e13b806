//! Analysis and code synthesis behind `#[turbo_cow::value]` and `turbo_cow::declare!`.
//!
//! Kept separate from the proc-macro crate so the same expansion runs in the `turbo-cow` CLI and in
//! plain unit tests.

mod analyze;
mod capability;
mod diagnostic;
mod field;
mod options;
mod signature;
mod synth;

use proc_macro2::TokenStream;
use quote::quote;

pub use crate::{
    analyze::{
        Declaration, DeclarationBlock, ManualMembers, analyze, analyze_attribute, analyze_block,
        analyze_item, is_value_attribute,
    },
    capability::{Capability, CapabilitySet},
    diagnostic::{DIAGNOSTIC_DOMAIN, Diagnostic, DiagnosticKind, Severity},
    field::{FieldInfo, Mutability},
    options::{InitVisibility, ValueOptions},
    signature::{Effects, MemberSignature, Receiver},
    synth::synthesize,
};

/// Expands `#[value(<args>)]` applied to `item`. On failure the output is the diagnostic alone.
pub fn expand_value(args: TokenStream, item: TokenStream) -> TokenStream {
    match analyze_attribute(args, item) {
        Ok(declaration) => synthesize(&declaration),
        Err(diagnostic) => diagnostic.to_compile_error(),
    }
}

/// Expands `declare! { ... }`: the synthesized code followed by the companion items.
pub fn expand_declare(input: TokenStream) -> TokenStream {
    let block = match syn::parse2::<DeclarationBlock>(input) {
        Ok(block) => block,
        Err(err) => return err.to_compile_error(),
    };
    match analyze_block(block) {
        Ok((declaration, companions)) => {
            let generated = synthesize(&declaration);
            quote! {
                #generated
                #(#companions)*
            }
        }
        Err(diagnostic) => diagnostic.to_compile_error(),
    }
}
