use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{DataStruct, DeriveInput, Fields};

use crate::attrs::{parse_container_attrs, parse_field_tag, ContainerAttrs};

struct FieldEntry {
    ident: syn::Ident,
    name: String,
    tag: String,
}

pub fn generate_record_impl(input: &DeriveInput, data: &DataStruct) -> syn::Result<TokenStream> {
    let struct_name = &input.ident;
    let container = parse_container_attrs(&input.attrs)?;

    let fields: Vec<FieldEntry> = match &data.fields {
        Fields::Named(named) => named
            .named
            .iter()
            .map(|field| {
                let ident = field
                    .ident
                    .clone()
                    .ok_or_else(|| syn::Error::new_spanned(field, "expected a named field"))?;
                let name = ident.to_string().trim_start_matches("r#").to_string();
                Ok(FieldEntry {
                    ident,
                    name,
                    tag: parse_field_tag(&field.attrs)?,
                })
            })
            .collect::<syn::Result<_>>()?,
        Fields::Unit => Vec::new(),
        Fields::Unnamed(_) => {
            return Err(syn::Error::new_spanned(
                struct_name,
                "Record requires named fields",
            ))
        }
    };

    let meta = meta_tokens(&struct_name.to_string(), &container);
    let descriptors = fields.iter().map(|field| {
        let ident = &field.ident;
        let name = &field.name;
        let tag = &field.tag;
        quote! {
            ::logconf::FieldDescriptor::of(#name, #tag, &self.#ident)
        }
    });

    Ok(quote! {
        impl ::logconf::Record for #struct_name {
            fn meta(&self) -> &'static ::logconf::RecordMeta {
                static META: ::logconf::RecordMeta = #meta;
                &META
            }

            fn fields(&self) -> ::std::vec::Vec<::logconf::FieldDescriptor<'_>> {
                ::std::vec![#(#descriptors),*]
            }
        }

        impl ::logconf::FieldType for #struct_name {
            const SHAPE: ::logconf::Shape = ::logconf::Shape::Record;

            fn field_value(&self) -> ::std::option::Option<::logconf::FieldValue<'_>> {
                ::std::option::Option::Some(::logconf::FieldValue::Record(self))
            }
        }
    })
}

fn meta_tokens(type_name: &str, container: &ContainerAttrs) -> TokenStream {
    let name = optional_str(container.name.as_deref());
    let plugin = optional_str(container.plugin.as_deref());
    let argument = optional_str(container.argument.as_deref());
    let anonymous = container.anonymous;
    let rename_all = match container.rename_all {
        Some(strategy) => {
            let variant = format_ident!("{}", strategy.variant_ident());
            quote! { ::std::option::Option::Some(::logconf::KeyCase::#variant) }
        }
        None => quote! { ::std::option::Option::None },
    };

    quote! {
        ::logconf::RecordMeta {
            type_name: #type_name,
            name: #name,
            plugin: #plugin,
            argument: #argument,
            anonymous: #anonymous,
            rename_all: #rename_all,
        }
    }
}

fn optional_str(value: Option<&str>) -> TokenStream {
    match value {
        Some(value) => quote! { ::std::option::Option::Some(#value) },
        None => quote! { ::std::option::Option::None },
    }
}
