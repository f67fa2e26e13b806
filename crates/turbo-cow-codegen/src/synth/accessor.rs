use proc_macro2::TokenStream;
use quote::quote;

use super::where_clause_with_field_bounds;
use crate::{analyze::Declaration, field::FieldInfo};

/// A getter for every stored field, plus `set_{field}` and `{field}_mut` for `#[exclusive]`
/// fields. Accessors have the field's visibility.
pub(super) fn generate_accessors(declaration: &Declaration) -> TokenStream {
    let Declaration {
        ident, generics, ..
    } = declaration;
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let getters = declaration.fields.iter().map(generate_getter);

    let exclusive: Vec<&FieldInfo> = declaration
        .fields
        .iter()
        .filter(|field| field.is_exclusive())
        .collect();
    let writers = if exclusive.is_empty() {
        None
    } else {
        let writers = exclusive.into_iter().map(generate_writers);
        // Writing may clone the storage.
        let writer_where =
            where_clause_with_field_bounds(declaration, quote!(::core::clone::Clone));
        Some(quote! {
            #[allow(dead_code)]
            impl #impl_generics #ident #ty_generics #writer_where {
                #(#writers)*
            }
        })
    };

    quote! {
        #[allow(dead_code)]
        impl #impl_generics #ident #ty_generics #where_clause {
            #(#getters)*
        }

        #writers
    }
}

fn generate_getter(field: &FieldInfo) -> TokenStream {
    let FieldInfo {
        vis,
        field_name,
        field_type,
        docs,
        ..
    } = field;
    quote! {
        #(#docs)*
        #[inline]
        #vis fn #field_name(&self) -> &#field_type {
            &(*self.storage).#field_name
        }
    }
}

fn generate_writers(field: &FieldInfo) -> TokenStream {
    let FieldInfo {
        vis,
        field_name,
        field_type,
        ..
    } = field;
    let setter = field.setter_ident();
    let mut_ident = field.mut_ident();
    let set_doc = format!(
        " Sets `{}`. Clones the storage first if another copy shares it.",
        field.key()
    );
    let mut_doc = format!(
        " Returns a mutable reference to `{}`. Clones the storage first if another copy shares \
         it.",
        field.key()
    );

    quote! {
        #[doc = #set_doc]
        #[inline]
        #vis fn #setter(&mut self, value: #field_type) {
            turbo_cow::CowStorage::make_unique(&mut self.storage).#field_name = value;
        }

        #[doc = #mut_doc]
        #[inline]
        #vis fn #mut_ident(&mut self) -> &mut #field_type {
            &mut turbo_cow::CowStorage::make_unique(&mut self.storage).#field_name
        }
    }
}
