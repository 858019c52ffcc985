//! Expansion of `#[derive(Params)]`.

use proc_macro2::TokenStream;
use quote::quote;
use syn::DeriveInput;

use crate::parse::ParamsInput;

/// Expands the derive into a `BindParams` impl.
///
/// `fields()` lists every field, annotated or not, so validation failures on
/// unannotated fields can still be reported under their Rust name.
/// `bind_field` only has arms for annotated fields; each arm goes through
/// `assign`, which requires the field type to implement `FromParam`.
pub fn expand_params(input: TokenStream) -> syn::Result<TokenStream> {
    let input: DeriveInput = syn::parse2(input)?;
    let parsed = ParamsInput::from_derive(&input)?;

    let ident = &parsed.ident;
    let krate = &parsed.krate;
    let (impl_generics, ty_generics, where_clause) = parsed.generics.split_for_impl();

    let field_tags = parsed.fields.iter().map(|field| {
        let name = &field.name;
        match &field.tag {
            Some(tag) => quote! { #krate::FieldTag::new(#name, ::core::option::Option::Some(#tag)) },
            None => quote! { #krate::FieldTag::new(#name, ::core::option::Option::None) },
        }
    });

    let bind_arms = parsed
        .fields
        .iter()
        .filter(|field| field.tag.is_some())
        .map(|field| {
            let name = &field.name;
            let member = &field.ident;
            quote! {
                #name => #krate::assign(&mut self.#member, #name, resolved),
            }
        });

    Ok(quote! {
        #[automatically_derived]
        impl #impl_generics #krate::BindParams for #ident #ty_generics #where_clause {
            fn fields() -> &'static [#krate::FieldTag] {
                const FIELDS: &[#krate::FieldTag] = &[#(#field_tags),*];
                FIELDS
            }

            fn bind_field(
                &mut self,
                field: &str,
                resolved: &#krate::ResolvedParam,
            ) -> ::core::result::Result<(), #krate::BindError> {
                match field {
                    #(#bind_arms)*
                    _ => ::core::result::Result::Ok(()),
                }
            }
        }
    })
}
