//! Code synthesis for an analyzed [`Declaration`].
//!
//! Generated code refers to the runtime crate as `turbo_cow`, so users depend on it directly.

mod accessor;
mod description;
mod equality;
mod hashing;
mod identity;
mod initializer;
mod serialization;
mod storage;

use proc_macro2::TokenStream;
use quote::quote;
use syn::{WhereClause, parse_quote};

use crate::analyze::Declaration;

/// Generates the complete expansion of a declaration. Output order is fixed: the storage type, the
/// value type, then each member group.
pub fn synthesize(declaration: &Declaration) -> TokenStream {
    let _span = tracing::debug_span!("synthesize", ty = %declaration.ident).entered();

    if declaration.hash_relies_on_manual_equality() {
        tracing::debug!(
            "synthesizing Hash over every stored field next to a hand-written PartialEq"
        );
    }

    let storage = storage::generate_storage(declaration);
    let value_type = generate_value_type(declaration);
    let identity = identity::generate_identity(declaration);
    let initializer = initializer::generate_initializer(declaration);
    let accessors = accessor::generate_accessors(declaration);
    let description = description::generate_description(declaration);
    let equality = equality::generate_equality(declaration);
    let hashing = hashing::generate_hashing(declaration);
    let serialization = serialization::generate_serialization(declaration);

    quote! {
        #storage
        #value_type
        #identity
        #initializer
        #accessors
        #description
        #equality
        #hashing
        #serialization
    }
}

/// The public type: a single handle to shared storage, cloned by sharing.
fn generate_value_type(declaration: &Declaration) -> TokenStream {
    let Declaration {
        attrs,
        vis,
        ident,
        generics,
        ..
    } = declaration;
    let storage_ident = declaration.storage_ident();
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    quote! {
        #(#attrs)*
        #vis struct #ident #generics #where_clause {
            storage: turbo_cow::CowStorage<#storage_ident #ty_generics>,
        }

        #[automatically_derived]
        impl #impl_generics ::core::clone::Clone for #ident #ty_generics #where_clause {
            #[inline]
            fn clone(&self) -> Self {
                #ident {
                    storage: ::core::clone::Clone::clone(&self.storage),
                }
            }
        }
    }
}

/// The declaration's where clause, plus `FieldType: bound` for every stored field when the type
/// has type parameters.
fn where_clause_with_field_bounds(
    declaration: &Declaration,
    bound: TokenStream,
) -> Option<WhereClause> {
    let mut where_clause = declaration.generics.where_clause.clone();
    if !declaration.has_type_params() || declaration.fields.is_empty() {
        return where_clause;
    }
    let predicates = &mut where_clause
        .get_or_insert_with(|| parse_quote!(where))
        .predicates;
    for field in &declaration.fields {
        let ty = &field.field_type;
        predicates.push(parse_quote!(#ty: #bound));
    }
    where_clause
}

#[cfg(test)]
mod tests {
    use quote::quote;

    use super::*;
    use crate::analyze::analyze_attribute;

    fn expand(args: TokenStream, item: TokenStream) -> String {
        let declaration = analyze_attribute(args, item).unwrap();
        synthesize(&declaration).to_string()
    }

    #[test]
    fn test_output_is_deterministic() {
        let item = quote! {
            #[derive(Debug, PartialEq, Eq, Hash)]
            pub struct Person {
                #[shared] pub id: String,
                #[exclusive] pub name: String,
            }
        };
        let first = expand(quote!(serde), item.clone());
        let second = expand(quote!(serde), item);
        assert_eq!(first, second);
    }

    #[test]
    fn test_value_type_wraps_storage() {
        let output = expand(quote!(), quote!(pub struct Id { #[shared] raw: u64 }));
        let expected = quote! {
            pub struct Id {
                storage: turbo_cow::CowStorage<IdStorage>,
            }
        }
        .to_string();
        assert!(output.contains(&expected), "{output}");
        assert!(output.contains("impl :: core :: clone :: Clone for Id"), "{output}");
    }

    #[test]
    fn test_field_bounds_only_for_type_params() {
        let declaration =
            analyze_attribute(quote!(), quote!(struct Id<'a> { #[shared] raw: &'a str }))
                .unwrap();
        assert!(where_clause_with_field_bounds(&declaration, quote!(Clone)).is_none());

        let declaration = analyze_attribute(
            quote!(),
            quote!(struct Wrapper<T> where T: Default { #[shared] items: Vec<T> }),
        )
        .unwrap();
        let where_clause = where_clause_with_field_bounds(&declaration, quote!(Clone)).unwrap();
        let expected: WhereClause = parse_quote!(where T: Default, Vec<T>: Clone);
        assert_eq!(where_clause, expected);
    }
}
