use proc_macro2::TokenStream;
use quote::quote;
use syn::{DataEnum, DeriveInput, Fields};

use crate::attrs::parse_container_attrs;

/// Variant enums delegate to their active arm; every arm wraps one record.
pub fn generate_variant_impl(input: &DeriveInput, data: &DataEnum) -> syn::Result<TokenStream> {
    let enum_name = &input.ident;

    if !parse_container_attrs(&input.attrs)?.is_empty() {
        return Err(syn::Error::new_spanned(
            enum_name,
            "container attributes belong on the variant records, not on the enum",
        ));
    }
    if data.variants.is_empty() {
        return Err(syn::Error::new_spanned(
            enum_name,
            "Record enums need at least one variant",
        ));
    }

    let mut idents = Vec::new();
    for variant in &data.variants {
        match &variant.fields {
            Fields::Unnamed(fields) if fields.unnamed.len() == 1 => idents.push(&variant.ident),
            _ => {
                return Err(syn::Error::new_spanned(
                    variant,
                    "Record enum variants must be newtype (single unnamed field)",
                ))
            }
        }
    }

    let meta_arms = idents.iter().map(|ident| {
        quote! { Self::#ident(inner) => ::logconf::Record::meta(inner), }
    });
    let fields_arms = idents.iter().map(|ident| {
        quote! { Self::#ident(inner) => ::logconf::Record::fields(inner), }
    });

    Ok(quote! {
        impl ::logconf::Record for #enum_name {
            fn meta(&self) -> &'static ::logconf::RecordMeta {
                match self {
                    #(#meta_arms)*
                }
            }

            fn fields(&self) -> ::std::vec::Vec<::logconf::FieldDescriptor<'_>> {
                match self {
                    #(#fields_arms)*
                }
            }
        }

        impl ::logconf::FieldType for #enum_name {
            const SHAPE: ::logconf::Shape = ::logconf::Shape::Variant;

            fn field_value(&self) -> ::std::option::Option<::logconf::FieldValue<'_>> {
                ::std::option::Option::Some(::logconf::FieldValue::Variant(self))
            }
        }
    })
}
