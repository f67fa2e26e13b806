use proc_macro2::TokenStream;
use quote::quote;

use super::where_clause_with_field_bounds;
use crate::{analyze::Declaration, capability::Capability};

/// `PartialEq` with an identity fast path, and the `Eq` marker.
pub(super) fn generate_equality(declaration: &Declaration) -> TokenStream {
    let partial_eq = declaration
        .synthesizes(Capability::Equality)
        .then(|| generate_partial_eq(declaration));
    let eq = declaration
        .synthesizes(Capability::TotalEquality)
        .then(|| generate_eq(declaration));
    quote! {
        #partial_eq
        #eq
    }
}

fn generate_partial_eq(declaration: &Declaration) -> TokenStream {
    let Declaration {
        ident, generics, ..
    } = declaration;
    let (impl_generics, ty_generics, _) = generics.split_for_impl();
    let where_clause =
        where_clause_with_field_bounds(declaration, quote!(::core::cmp::PartialEq));

    let mut comparisons = declaration.fields.iter().map(|field| {
        let name = &field.field_name;
        quote! { (*self.storage).#name == (*other.storage).#name }
    });
    let fields_equal = match comparisons.next() {
        Some(first) => quote! { #first #(&& #comparisons)* },
        None => quote! { true },
    };

    quote! {
        #[automatically_derived]
        impl #impl_generics ::core::cmp::PartialEq for #ident #ty_generics #where_clause {
            fn eq(&self, other: &Self) -> bool {
                if turbo_cow::CowStorage::ptr_eq(&self.storage, &other.storage) {
                    return true;
                }
                #fields_equal
            }
        }
    }
}

fn generate_eq(declaration: &Declaration) -> TokenStream {
    let Declaration {
        ident, generics, ..
    } = declaration;
    let (impl_generics, ty_generics, _) = generics.split_for_impl();
    let where_clause = where_clause_with_field_bounds(declaration, quote!(::core::cmp::Eq));

    quote! {
        #[automatically_derived]
        impl #impl_generics ::core::cmp::Eq for #ident #ty_generics #where_clause {}
    }
}

#[cfg(test)]
mod tests {
    use quote::quote;

    use crate::{analyze::analyze_attribute, synth::synthesize};

    #[test]
    fn test_compares_fields_after_identity() {
        let declaration = analyze_attribute(
            quote!(),
            quote! {
                #[derive(PartialEq)]
                struct Point { #[exclusive] x: i32, #[exclusive] y: i32 }
            },
        )
        .unwrap();
        let output = synthesize(&declaration).to_string();
        let expected = quote! {
            fn eq(&self, other: &Self) -> bool {
                if turbo_cow::CowStorage::ptr_eq(&self.storage, &other.storage) {
                    return true;
                }
                (*self.storage).x == (*other.storage).x && (*self.storage).y == (*other.storage).y
            }
        }
        .to_string();
        assert!(output.contains(&expected), "{output}");
        assert!(!output.contains(":: core :: cmp :: Eq for"), "{output}");
    }

    #[test]
    fn test_no_fields_are_equal() {
        let declaration = analyze_attribute(
            quote!(),
            quote!(#[derive(PartialEq, Eq)] struct Unit {}),
        )
        .unwrap();
        let output = synthesize(&declaration).to_string();
        assert!(output.contains("return true ; } true }"), "{output}");
        assert!(output.contains("impl :: core :: cmp :: Eq for Unit { }"), "{output}");
    }
}
