use proc_macro2::TokenStream;
use quote::quote;
use syn::{GenericParam, Generics};

use super::where_clause_with_field_bounds;
use crate::analyze::Declaration;

/// The private `{Type}Storage` struct: every tagged field, a memberwise constructor and a
/// field-by-field `Clone`.
pub(super) fn generate_storage(declaration: &Declaration) -> TokenStream {
    let storage_ident = declaration.storage_ident();
    let generics = &declaration.generics;
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let fields = declaration.fields.iter().map(|field| {
        let attrs = &field.attrs;
        let name = &field.field_name;
        let ty = &field.field_type;
        quote! {
            #(#attrs)*
            #name: #ty
        }
    });
    let params = declaration.fields.iter().map(|field| {
        let name = &field.field_name;
        let ty = &field.field_type;
        quote! { #name: #ty }
    });
    let names: Vec<_> = declaration
        .fields
        .iter()
        .map(|field| &field.field_name)
        .collect();

    let marker = phantom_marker(generics);
    let marker_field = marker.as_ref().map(|marker| quote! { __marker: #marker, });
    let marker_init = marker
        .as_ref()
        .map(|_| quote! { __marker: ::core::marker::PhantomData, });

    let clone_where = where_clause_with_field_bounds(declaration, quote!(::core::clone::Clone));

    quote! {
        #[doc(hidden)]
        struct #storage_ident #generics #where_clause {
            #(#fields,)*
            #marker_field
        }

        impl #impl_generics #storage_ident #ty_generics #where_clause {
            #[allow(clippy::too_many_arguments)]
            #[inline]
            fn new(#(#params),*) -> Self {
                #storage_ident {
                    #(#names,)*
                    #marker_init
                }
            }
        }

        #[automatically_derived]
        impl #impl_generics ::core::clone::Clone for #storage_ident #ty_generics #clone_where {
            fn clone(&self) -> Self {
                #storage_ident {
                    #(#names: ::core::clone::Clone::clone(&self.#names),)*
                    #marker_init
                }
            }
        }
    }
}

/// Keeps every generic parameter used even when no stored field mentions it.
fn phantom_marker(generics: &Generics) -> Option<TokenStream> {
    let used: Vec<TokenStream> = generics
        .params
        .iter()
        .filter_map(|param| match param {
            GenericParam::Lifetime(param) => {
                let lifetime = &param.lifetime;
                Some(quote! { &#lifetime () })
            }
            GenericParam::Type(param) => {
                let ident = &param.ident;
                Some(quote! { #ident })
            }
            GenericParam::Const(_) => None,
        })
        .collect();
    if used.is_empty() {
        return None;
    }
    Some(quote! { ::core::marker::PhantomData<fn() -> (#(#used,)*)> })
}
