mod attrs;
mod record_gen;
mod variant_gen;

use proc_macro::TokenStream;
use syn::{parse_macro_input, Data, DeriveInput};

use record_gen::generate_record_impl;
use variant_gen::generate_variant_impl;

/// Derive `logconf::Record` and `logconf::FieldType`.
///
/// Structs become records; their fields are listed in declaration order with
/// the annotation given by `#[conf(tag = "...")]`. Enums of newtype variants
/// become variant fields that delegate to the wrapped record.
#[proc_macro_derive(Record, attributes(conf))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match derive_record_impl(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn derive_record_impl(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Record cannot be derived for generic types",
        ));
    }

    match &input.data {
        Data::Struct(data) => generate_record_impl(input, data),
        Data::Enum(data) => generate_variant_impl(input, data),
        Data::Union(_) => Err(syn::Error::new_spanned(
            &input.ident,
            "Record cannot be derived for unions",
        )),
    }
}
