use proc_macro2::TokenStream;
use quote::quote;

use super::where_clause_with_field_bounds;
use crate::{analyze::Declaration, capability::Capability};

/// `Hash` over every stored field in declaration order.
///
/// Consistent with the synthesized `PartialEq`, which compares the same fields. A hand-written
/// `PartialEq` that ignores a field breaks that.
pub(super) fn generate_hashing(declaration: &Declaration) -> Option<TokenStream> {
    if !declaration.synthesizes(Capability::Hashing) {
        return None;
    }
    let Declaration {
        ident, generics, ..
    } = declaration;
    let (impl_generics, ty_generics, _) = generics.split_for_impl();
    let where_clause = where_clause_with_field_bounds(declaration, quote!(::core::hash::Hash));

    let hash_fields = declaration.fields.iter().map(|field| {
        let name = &field.field_name;
        quote! { ::core::hash::Hash::hash(&(*self.storage).#name, __state); }
    });

    Some(quote! {
        #[automatically_derived]
        impl #impl_generics ::core::hash::Hash for #ident #ty_generics #where_clause {
            fn hash<__H: ::core::hash::Hasher>(&self, __state: &mut __H) {
                #(#hash_fields)*
            }
        }
    })
}
