//! Parsing of `#[derive(Params)]` input.
//!
//! Field attribute: `#[param("source=key,...")]`. The annotation text is
//! kept verbatim; its pairs are interpreted at runtime so that malformed
//! pairs degrade the same way whether the impl is derived or hand-written.
//!
//! Container attribute: `#[params(crate = "path::to::extract")]` overrides
//! the path of the runtime crate, which defaults to `::tessera_extract`.

use syn::{
    ext::IdentExt, spanned::Spanned, Data, DeriveInput, Fields, Generics, Ident, LitStr, Path,
};

/// A validated derive input.
#[derive(Debug)]
pub struct ParamsInput {
    /// Struct name.
    pub ident: Ident,
    /// Struct generics.
    pub generics: Generics,
    /// Named fields in declaration order.
    pub fields: Vec<ParamField>,
    /// Path of the runtime crate.
    pub krate: Path,
}

/// One named field.
#[derive(Debug)]
pub struct ParamField {
    /// Field identifier as written.
    pub ident: Ident,
    /// Field name with any `r#` prefix removed.
    pub name: String,
    /// The `#[param("...")]` annotation, if any.
    pub tag: Option<LitStr>,
}

impl ParamsInput {
    /// Validates the derive input.
    ///
    /// Only structs with named fields (or no fields) can hold parameters.
    pub fn from_derive(input: &DeriveInput) -> syn::Result<Self> {
        let data = match &input.data {
            Data::Struct(data) => data,
            Data::Enum(data) => {
                return Err(syn::Error::new(
                    data.enum_token.span(),
                    "Params can only be derived for structs with named fields, not enums",
                ))
            }
            Data::Union(data) => {
                return Err(syn::Error::new(
                    data.union_token.span(),
                    "Params can only be derived for structs with named fields, not unions",
                ))
            }
        };

        let fields = match &data.fields {
            Fields::Named(named) => named
                .named
                .iter()
                .map(parse_field)
                .collect::<syn::Result<Vec<_>>>()?,
            Fields::Unit => Vec::new(),
            Fields::Unnamed(unnamed) => {
                return Err(syn::Error::new(
                    unnamed.span(),
                    "Params can only be derived for structs with named fields, not tuple structs",
                ))
            }
        };

        Ok(Self {
            ident: input.ident.clone(),
            generics: input.generics.clone(),
            fields,
            krate: parse_crate_path(input)?,
        })
    }
}

fn parse_field(field: &syn::Field) -> syn::Result<ParamField> {
    let ident = field
        .ident
        .clone()
        .ok_or_else(|| syn::Error::new(field.span(), "expected a named field"))?;

    let mut tag: Option<LitStr> = None;
    for attr in field.attrs.iter().filter(|a| a.path().is_ident("param")) {
        if tag.is_some() {
            return Err(syn::Error::new(
                attr.span(),
                "duplicate #[param] attribute; list every source in one annotation",
            ));
        }
        let lit: LitStr = attr.parse_args().map_err(|e| {
            syn::Error::new(
                e.span(),
                "expected #[param(\"source=key,...\")] with a string literal",
            )
        })?;
        tag = Some(lit);
    }

    Ok(ParamField {
        name: ident.unraw().to_string(),
        ident,
        tag,
    })
}

fn parse_crate_path(input: &DeriveInput) -> syn::Result<Path> {
    let mut krate: Path = syn::parse_quote!(::tessera_extract);

    for attr in input.attrs.iter().filter(|a| a.path().is_ident("params")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("crate") {
                let lit: LitStr = meta.value()?.parse()?;
                krate = lit.parse()?;
                Ok(())
            } else {
                Err(meta.error("unsupported params attribute, expected `crate = \"...\"`"))
            }
        })?;
    }

    Ok(krate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quote::quote;

    fn parse(tokens: proc_macro2::TokenStream) -> syn::Result<ParamsInput> {
        let input: DeriveInput = syn::parse2(tokens).unwrap();
        ParamsInput::from_derive(&input)
    }

    #[test]
    fn test_parse_named_fields() {
        let parsed = parse(quote! {
            struct ListUsers {
                #[param("query=page,default=1")]
                page: u32,
                r#type: Option<String>,
            }
        })
        .unwrap();

        assert_eq!(parsed.ident, "ListUsers");
        assert_eq!(parsed.fields.len(), 2);
        assert_eq!(parsed.fields[0].name, "page");
        assert_eq!(
            parsed.fields[0].tag.as_ref().map(LitStr::value).as_deref(),
            Some("query=page,default=1")
        );
        assert_eq!(parsed.fields[1].name, "type");
        assert!(parsed.fields[1].tag.is_none());
    }

    #[test]
    fn test_crate_override() {
        let parsed = parse(quote! {
            #[params(crate = "tessera::extract")]
            struct Q {}
        })
        .unwrap();
        let krate = &parsed.krate;
        assert_eq!(quote!(#krate).to_string(), "tessera :: extract");
    }

    #[test]
    fn test_rejects_non_structs() {
        let err = parse(quote! { enum Q { A, B } }).unwrap_err();
        assert!(err.to_string().contains("not enums"));

        let err = parse(quote! { struct Q(u32); }).unwrap_err();
        assert!(err.to_string().contains("not tuple structs"));
    }

    #[test]
    fn test_rejects_bad_annotations() {
        let err = parse(quote! {
            struct Q {
                #[param(query = "page")]
                page: u32,
            }
        })
        .unwrap_err();
        assert!(err.to_string().contains("string literal"));

        let err = parse(quote! {
            struct Q {
                #[param("query=a")]
                #[param("query=b")]
                page: u32,
            }
        })
        .unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }
}
