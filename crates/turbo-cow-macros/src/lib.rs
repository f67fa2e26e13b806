//! Procedural macros for `turbo-cow`. Use them through the `turbo_cow` crate, which re-exports
//! them and provides the runtime types the generated code refers to.

use proc_macro::TokenStream;

/// Turns a struct with named fields into a copy-on-write value type.
///
/// See the `turbo_cow` crate documentation for the field tags and the capabilities read from the
/// `#[derive(...)]` list.
#[proc_macro_attribute]
pub fn value(args: TokenStream, input: TokenStream) -> TokenStream {
    turbo_cow_codegen::expand_value(args.into(), input.into()).into()
}

/// Declares a copy-on-write value type together with hand-written impls.
///
/// The block holds exactly one `#[value]` struct. Members written in the block that match what a
/// requested capability would generate replace the generated version.
#[proc_macro]
pub fn declare(input: TokenStream) -> TokenStream {
    turbo_cow_codegen::expand_declare(input.into()).into()
}
