use proc_macro2::TokenStream;
use quote::quote;

use crate::analyze::Declaration;

pub(super) fn generate_identity(declaration: &Declaration) -> TokenStream {
    let Declaration {
        vis,
        ident,
        generics,
        ..
    } = declaration;
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    quote! {
        #[allow(dead_code)]
        impl #impl_generics #ident #ty_generics #where_clause {
            /// Returns `true` if `self` and `other` share the same storage.
            ///
            /// Equal field values are not enough: a value is identical only to its copies, until
            /// either side is written to.
            #[inline]
            #vis fn is_identical(&self, other: &Self) -> bool {
                turbo_cow::CowStorage::ptr_eq(&self.storage, &other.storage)
            }
        }

        #[automatically_derived]
        impl #impl_generics turbo_cow::CowValue for #ident #ty_generics #where_clause {
            #[inline]
            fn is_identical(&self, other: &Self) -> bool {
                turbo_cow::CowStorage::ptr_eq(&self.storage, &other.storage)
            }
        }
    }
}
