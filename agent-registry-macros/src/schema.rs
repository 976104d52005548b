//! Expansion of `#[derive(ParamSchema)]`.

use proc_macro2::TokenStream;
use quote::quote;
use syn::ext::IdentExt;
use syn::spanned::Spanned;
use syn::{Data, DeriveInput, Fields, Path, WherePredicate};

use crate::attrs;

pub(crate) fn expand(input: DeriveInput) -> syn::Result<TokenStream> {
    let krate = crate_path(&input)?.unwrap_or_else(attrs::default_crate_path);

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            other => {
                return Err(syn::Error::new(
                    other.span(),
                    "ParamSchema can only be derived for structs with named fields",
                ));
            }
        },
        Data::Enum(data) => {
            return Err(syn::Error::new(
                data.enum_token.span(),
                "ParamSchema cannot be derived for enums",
            ));
        }
        Data::Union(data) => {
            return Err(syn::Error::new(
                data.union_token.span(),
                "ParamSchema cannot be derived for unions",
            ));
        }
    };

    let mut specs = Vec::with_capacity(fields.len());
    let mut bounds: Vec<WherePredicate> = Vec::new();
    for field in fields {
        let Some(ident) = &field.ident else {
            continue;
        };
        let name = ident.unraw().to_string();
        let ty = &field.ty;
        let description = match attrs::param_description(&field.attrs)? {
            Some(description) => Some(description),
            None => attrs::doc_string(&field.attrs),
        };
        let with_description = description.map(|d| quote!(.with_description(#d)));
        specs.push(quote! {
            #krate::ParameterSpec::of::<#ty>(#name) #with_description
        });
        if !input.generics.params.is_empty() {
            bounds.push(syn::parse_quote!(#ty: #krate::ParamSchema));
        }
    }

    let ident = &input.ident;
    let mut generics = input.generics.clone();
    if !bounds.is_empty() {
        generics.make_where_clause().predicates.extend(bounds);
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics #krate::ParamSchema for #ident #ty_generics #where_clause {
            fn param_type() -> #krate::ParamType {
                #krate::ParamType::object([#(#specs),*])
            }
        }
    })
}

fn crate_path(input: &DeriveInput) -> syn::Result<Option<Path>> {
    let mut krate = None;
    for attr in input
        .attrs
        .iter()
        .filter(|attr| attr.path().is_ident("param_schema"))
    {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("crate") {
                let value: syn::LitStr = meta.value()?.parse()?;
                krate = Some(attrs::parse_crate_path(&value)?);
                Ok(())
            } else {
                Err(meta.error("unsupported param_schema option; expected `crate`"))
            }
        })?;
    }
    Ok(krate)
}

#[cfg(test)]
mod tests {
    use syn::parse_quote;

    use super::*;

    #[test]
    fn named_fields_become_object_properties() {
        let input: DeriveInput = parse_quote! {
            struct Input {
                /// Text to echo back.
                prompt: String,
                #[param(description = "Repeat count")]
                r#times: Option<u32>,
            }
        };
        let expanded = expand(input).expect("expansion").to_string();
        assert!(expanded.contains("impl :: agent_registry :: ParamSchema for Input"));
        assert!(expanded.contains("of :: < String > (\"prompt\") . with_description (\"Text to echo back.\")"));
        assert!(expanded.contains("of :: < Option < u32 > > (\"times\") . with_description (\"Repeat count\")"));
    }

    #[test]
    fn generic_structs_bound_their_field_types() {
        let input: DeriveInput = parse_quote! {
            #[param_schema(crate = "crate::registry")]
            struct Page<T> { items: Vec<T> }
        };
        let expanded = expand(input).expect("expansion").to_string();
        assert!(expanded.contains("Vec < T > : crate :: registry :: ParamSchema"));
    }

    #[test]
    fn rejects_non_struct_shapes() {
        let tuple: DeriveInput = parse_quote!(struct Pair(i64, i64););
        assert!(expand(tuple).is_err());
        let unit: DeriveInput = parse_quote!(enum Mode { Fast, Slow });
        let err = expand(unit).expect_err("enum");
        assert!(err.to_string().contains("enums"));
    }
}
