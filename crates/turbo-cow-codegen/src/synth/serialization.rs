use proc_macro2::{Literal, TokenStream};
use quote::quote;
use syn::{ext::IdentExt, parse_quote};

use super::where_clause_with_field_bounds;
use crate::{analyze::Declaration, capability::Capability, field::FieldInfo};

/// The coding key enum, `Serialize` and `Deserialize`. Encoding writes a struct keyed by field
/// name in declaration order. Decoding accepts a keyed container or a sequence, ignores unknown
/// keys and rejects missing or repeated ones.
pub(super) fn generate_serialization(declaration: &Declaration) -> TokenStream {
    let coding_key = declaration
        .emits_coding_key()
        .then(|| generate_coding_key(declaration));
    let encode = declaration
        .synthesizes(Capability::Encode)
        .then(|| generate_encode(declaration));
    let decode = declaration
        .synthesizes(Capability::Decode)
        .then(|| generate_decode(declaration));
    quote! {
        #coding_key
        #encode
        #decode
    }
}

fn generate_coding_key(declaration: &Declaration) -> TokenStream {
    let key_ident = declaration.coding_key_ident();
    let vis = &declaration.vis;
    let variants: Vec<_> = declaration
        .fields
        .iter()
        .map(|field| &field.key_variant)
        .collect();
    let keys: Vec<String> = declaration.fields.iter().map(FieldInfo::key).collect();
    let doc = format!(
        " Serialization keys of [`{}`], in field declaration order.",
        declaration.ident.unraw()
    );

    let (as_str_body, from_key_body) = if variants.is_empty() {
        (
            quote! { match self {} },
            quote! {
                let _ = key;
                ::core::option::Option::None
            },
        )
    } else {
        (
            quote! {
                match self {
                    #(#key_ident::#variants => #keys,)*
                }
            },
            quote! {
                match key {
                    #(#keys => ::core::option::Option::Some(#key_ident::#variants),)*
                    _ => ::core::option::Option::None,
                }
            },
        )
    };

    quote! {
        #[doc = #doc]
        #[derive(
            ::core::clone::Clone,
            ::core::marker::Copy,
            ::core::fmt::Debug,
            ::core::cmp::PartialEq,
            ::core::cmp::Eq,
            ::core::hash::Hash,
        )]
        #vis enum #key_ident {
            #(#variants,)*
        }

        #[automatically_derived]
        impl turbo_cow::CodingKey for #key_ident {
            const KEYS: &'static [&'static str] = &[#(#keys),*];

            fn as_str(self) -> &'static str {
                #as_str_body
            }

            fn from_key(key: &str) -> ::core::option::Option<Self> {
                #from_key_body
            }
        }
    }
}

fn generate_encode(declaration: &Declaration) -> TokenStream {
    let Declaration {
        ident, generics, ..
    } = declaration;
    let (impl_generics, ty_generics, _) = generics.split_for_impl();
    let where_clause = where_clause_with_field_bounds(
        declaration,
        quote!(turbo_cow::macro_helpers::serde::Serialize),
    );
    let key_ident = declaration.coding_key_ident();
    let type_name = ident.unraw().to_string();
    let len = declaration.fields.len();

    let serialize_fields = declaration.fields.iter().map(|field| {
        let name = &field.field_name;
        let variant = &field.key_variant;
        quote! {
            __state.serialize_field(
                turbo_cow::CodingKey::as_str(#key_ident::#variant),
                &(*self.storage).#name,
            )?;
        }
    });

    quote! {
        #[automatically_derived]
        impl #impl_generics turbo_cow::macro_helpers::serde::Serialize for #ident #ty_generics
        #where_clause
        {
            fn serialize<__S>(
                &self,
                __serializer: __S,
            ) -> ::core::result::Result<__S::Ok, __S::Error>
            where
                __S: turbo_cow::macro_helpers::serde::Serializer,
            {
                use turbo_cow::macro_helpers::serde::ser::SerializeStruct as _;

                let mut __state = __serializer.serialize_struct(#type_name, #len)?;
                #(#serialize_fields)*
                __state.end()
            }
        }
    }
}

fn generate_decode(declaration: &Declaration) -> TokenStream {
    let Declaration {
        ident, generics, ..
    } = declaration;
    let serde = quote!(turbo_cow::macro_helpers::serde);
    let (_, ty_generics, plain_where_clause) = generics.split_for_impl();

    let mut de_generics = generics.clone();
    de_generics.params.insert(0, parse_quote!('de));
    let (de_impl_generics, _, _) = de_generics.split_for_impl();
    let where_clause =
        where_clause_with_field_bounds(declaration, quote!(#serde::Deserialize<'de>));

    let key_ident = declaration.coding_key_ident();
    let storage_ident = declaration.storage_ident();
    let type_name = ident.unraw().to_string();
    let expecting = format!("struct {type_name}");

    let locals: Vec<_> = declaration
        .fields
        .iter()
        .map(FieldInfo::local_ident)
        .collect();
    let types: Vec<_> = declaration
        .fields
        .iter()
        .map(|field| &field.field_type)
        .collect();
    let variants: Vec<_> = declaration
        .fields
        .iter()
        .map(|field| &field.key_variant)
        .collect();
    let indices = (0..declaration.fields.len()).map(Literal::usize_unsuffixed);

    let construct = quote! {
        #ident {
            storage: turbo_cow::CowStorage::new(#storage_ident::new(#(#locals),*)),
        }
    };

    quote! {
        #[automatically_derived]
        impl #de_impl_generics #serde::Deserialize<'de> for #ident #ty_generics #where_clause {
            fn deserialize<__D>(__deserializer: __D) -> ::core::result::Result<Self, __D::Error>
            where
                __D: #serde::Deserializer<'de>,
            {
                struct __Visitor #generics (::core::marker::PhantomData<fn() -> #ident #ty_generics>)
                #plain_where_clause;

                #[allow(unused_mut)]
                impl #de_impl_generics #serde::de::Visitor<'de> for __Visitor #ty_generics
                #where_clause
                {
                    type Value = #ident #ty_generics;

                    fn expecting(
                        &self,
                        __formatter: &mut ::core::fmt::Formatter<'_>,
                    ) -> ::core::fmt::Result {
                        __formatter.write_str(#expecting)
                    }

                    fn visit_seq<__A>(
                        self,
                        mut __seq: __A,
                    ) -> ::core::result::Result<Self::Value, __A::Error>
                    where
                        __A: #serde::de::SeqAccess<'de>,
                    {
                        #(
                            let #locals = match __seq.next_element::<#types>()? {
                                ::core::option::Option::Some(__value) => __value,
                                ::core::option::Option::None => {
                                    return ::core::result::Result::Err(
                                        #serde::de::Error::invalid_length(#indices, &self),
                                    );
                                }
                            };
                        )*
                        ::core::result::Result::Ok(#construct)
                    }

                    fn visit_map<__A>(
                        self,
                        mut __map: __A,
                    ) -> ::core::result::Result<Self::Value, __A::Error>
                    where
                        __A: #serde::de::MapAccess<'de>,
                    {
                        #(
                            let mut #locals: ::core::option::Option<#types> =
                                ::core::option::Option::None;
                        )*
                        while let ::core::option::Option::Some(__key) =
                            __map.next_key::<turbo_cow::macro_helpers::FieldKey<#key_ident>>()?
                        {
                            match __key {
                                #(
                                    turbo_cow::macro_helpers::FieldKey::Known(
                                        #key_ident::#variants,
                                    ) => {
                                        if #locals.is_some() {
                                            return ::core::result::Result::Err(
                                                <__A::Error as #serde::de::Error>::duplicate_field(
                                                    turbo_cow::CodingKey::as_str(
                                                        #key_ident::#variants,
                                                    ),
                                                ),
                                            );
                                        }
                                        #locals = ::core::option::Option::Some(
                                            __map.next_value::<#types>()?,
                                        );
                                    }
                                )*
                                #[allow(unreachable_patterns)]
                                _ => {
                                    let _ = __map.next_value::<#serde::de::IgnoredAny>()?;
                                }
                            }
                        }
                        #(
                            let #locals = match #locals {
                                ::core::option::Option::Some(__value) => __value,
                                ::core::option::Option::None => {
                                    return ::core::result::Result::Err(
                                        <__A::Error as #serde::de::Error>::missing_field(
                                            turbo_cow::CodingKey::as_str(#key_ident::#variants),
                                        ),
                                    );
                                }
                            };
                        )*
                        ::core::result::Result::Ok(#construct)
                    }
                }

                __deserializer.deserialize_struct(
                    #type_name,
                    <#key_ident as turbo_cow::CodingKey>::KEYS,
                    __Visitor(::core::marker::PhantomData),
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use quote::quote;

    use crate::{analyze::analyze_attribute, synth::synthesize};

    fn expand(args: proc_macro2::TokenStream, item: proc_macro2::TokenStream) -> String {
        synthesize(&analyze_attribute(args, item).unwrap()).to_string()
    }

    #[test]
    fn test_coding_key_enum() {
        let output = expand(
            quote!(serde),
            quote!(pub struct Person { #[shared] id: String, #[exclusive] first_name: String }),
        );
        assert!(
            output.contains("pub enum PersonCodingKey { Id , FirstName , }"),
            "{output}"
        );
        assert!(
            output.contains(r#"const KEYS : & 'static [& 'static str] = & ["id" , "first_name"] ;"#),
            "{output}"
        );
    }

    #[test]
    fn test_encode_only() {
        let output = expand(
            quote!(),
            quote!(#[derive(serde::Serialize)] struct Point { #[exclusive] x: i32 }),
        );
        assert!(output.contains("serialize_struct (\"Point\" , 1usize)"), "{output}");
        assert!(output.contains("enum PointCodingKey"), "{output}");
        assert!(!output.contains("Deserialize"), "{output}");
    }

    #[test]
    fn test_decode_generics_get_de_lifetime_first() {
        let output = expand(
            quote!(),
            quote!(#[derive(Deserialize)] struct Wrapper<'a, T> { #[shared] value: &'a T }),
        );
        assert!(output.contains("impl < 'de , 'a , T >"), "{output}");
        assert!(
            output.contains("& 'a T : turbo_cow :: macro_helpers :: serde :: Deserialize < 'de >"),
            "{output}"
        );
    }

    #[test]
    fn test_raw_identifiers_use_plain_keys() {
        let output = expand(
            quote!(serde),
            quote!(struct Token { #[shared] r#type: String }),
        );
        assert!(output.contains("\"type\""), "{output}");
        assert!(output.contains("__field_type"), "{output}");
        assert!(!output.contains("r#type\""), "{output}");
    }
}
