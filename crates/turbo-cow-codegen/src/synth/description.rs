use proc_macro2::TokenStream;
use quote::quote;
use syn::ext::IdentExt;

use super::where_clause_with_field_bounds;
use crate::{analyze::Declaration, capability::Capability};

/// `Debug` rendering as `Type(field: value, ...)`, listing stored fields in declaration order.
pub(super) fn generate_description(declaration: &Declaration) -> Option<TokenStream> {
    if !declaration.synthesizes(Capability::Description) {
        return None;
    }
    let Declaration {
        ident, generics, ..
    } = declaration;
    let (impl_generics, ty_generics, _) = generics.split_for_impl();
    let where_clause = where_clause_with_field_bounds(declaration, quote!(::core::fmt::Debug));
    let type_name = ident.unraw().to_string();

    let entries = declaration.fields.iter().map(|field| {
        let key = field.key();
        let name = &field.field_name;
        quote! { (#key, &(*self.storage).#name as &dyn ::core::fmt::Debug) }
    });

    Some(quote! {
        #[automatically_derived]
        impl #impl_generics ::core::fmt::Debug for #ident #ty_generics #where_clause {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                turbo_cow::macro_helpers::write_description(f, #type_name, &[#(#entries),*])
            }
        }
    })
}
