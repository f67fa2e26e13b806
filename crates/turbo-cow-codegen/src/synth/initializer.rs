use proc_macro2::TokenStream;
use quote::quote;

use crate::analyze::Declaration;

/// `new`: one parameter per stored field in declaration order, except `#[shared]` fields with a
/// default, which are initialized from their default expression.
///
/// Each default is evaluated in its own `__default_{field}` associated function, so it can't see
/// the constructor's parameters.
pub(super) fn generate_initializer(declaration: &Declaration) -> TokenStream {
    let Declaration {
        ident, generics, ..
    } = declaration;
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();
    let vis = declaration.constructor_vis();
    let storage_ident = declaration.storage_ident();

    let params = declaration
        .fields
        .iter()
        .filter(|field| field.is_constructor_param())
        .map(|field| {
            let name = &field.field_name;
            let ty = &field.field_type;
            quote! { #name: #ty }
        });
    let args = declaration.fields.iter().map(|field| {
        if field.default.is_some() {
            let default_fn = field.default_fn_ident();
            quote! { Self::#default_fn() }
        } else {
            let name = &field.field_name;
            quote! { #name }
        }
    });
    let default_fns = declaration.fields.iter().filter_map(|field| {
        let default = field.default.as_ref()?;
        let default_fn = field.default_fn_ident();
        let ty = &field.field_type;
        Some(quote! {
            #[doc(hidden)]
            #[inline]
            fn #default_fn() -> #ty {
                #default
            }
        })
    });
    let doc = format!(
        " Creates a new `{}` with its own storage.",
        syn::ext::IdentExt::unraw(ident)
    );

    quote! {
        #[allow(dead_code)]
        impl #impl_generics #ident #ty_generics #where_clause {
            #(#default_fns)*

            #[doc = #doc]
            #[allow(clippy::too_many_arguments, clippy::new_without_default)]
            #vis fn new(#(#params),*) -> Self {
                #ident {
                    storage: turbo_cow::CowStorage::new(#storage_ident::new(#(#args),*)),
                }
            }
        }
    }
}
