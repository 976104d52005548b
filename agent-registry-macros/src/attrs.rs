//! Attribute helpers shared by the agent macros.

use syn::{Attribute, Expr, ExprLit, Lit, LitStr, Meta, Path};

pub(crate) fn default_crate_path() -> Path {
    syn::parse_quote!(::agent_registry)
}

/// Joins `///` lines into a single string with the common indentation
/// removed.
pub(crate) fn doc_string(attrs: &[Attribute]) -> Option<String> {
    let lines: Vec<String> = attrs
        .iter()
        .filter(|attr| attr.path().is_ident("doc"))
        .filter_map(|attr| match &attr.meta {
            Meta::NameValue(nv) => match &nv.value {
                Expr::Lit(ExprLit {
                    lit: Lit::Str(text),
                    ..
                }) => Some(text.value()),
                _ => None,
            },
            _ => None,
        })
        .flat_map(|chunk| chunk.split('\n').map(str::to_owned).collect::<Vec<_>>())
        .collect();

    let indent = lines
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);

    let joined = lines
        .iter()
        .map(|line| line.get(indent..).unwrap_or("").trim_end())
        .collect::<Vec<_>>()
        .join("\n");
    let trimmed = joined.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

/// Removes `#[param(...)]` attributes, returning the description they carry.
pub(crate) fn take_param_description(attrs: &mut Vec<Attribute>) -> syn::Result<Option<String>> {
    let mut description = None;
    let mut error: Option<syn::Error> = None;

    attrs.retain(|attr| {
        if !attr.path().is_ident("param") {
            return true;
        }
        let parsed = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("description") {
                let value: LitStr = meta.value()?.parse()?;
                description = Some(value.value());
                Ok(())
            } else {
                Err(meta.error("unsupported param option; expected `description`"))
            }
        });
        if let Err(err) = parsed {
            match error.as_mut() {
                Some(existing) => existing.combine(err),
                None => error = Some(err),
            }
        }
        false
    });

    match error {
        Some(err) => Err(err),
        None => Ok(description),
    }
}

/// Reads `#[param(description = "...")]` without removing it.
pub(crate) fn param_description(attrs: &[Attribute]) -> syn::Result<Option<String>> {
    let mut attrs = attrs.to_vec();
    take_param_description(&mut attrs)
}

pub(crate) fn parse_crate_path(value: &LitStr) -> syn::Result<Path> {
    value.parse::<Path>().map_err(|_| {
        syn::Error::new(
            value.span(),
            "expected a crate path such as `my_crate::agent_registry`",
        )
    })
}

#[cfg(test)]
mod tests {
    use syn::parse_quote;

    use super::*;

    #[test]
    fn doc_lines_are_dedented_and_joined() {
        let attrs: Vec<Attribute> = vec![
            parse_quote!(#[doc = " Adds two numbers."]),
            parse_quote!(#[doc = ""]),
            parse_quote!(#[doc = "   Overflow wraps."]),
            parse_quote!(#[inline]),
        ];
        assert_eq!(
            doc_string(&attrs).as_deref(),
            Some("Adds two numbers.\n\n  Overflow wraps.")
        );
    }

    #[test]
    fn missing_docs_yield_none() {
        let attrs: Vec<Attribute> = vec![parse_quote!(#[doc = "   "]), parse_quote!(#[must_use])];
        assert_eq!(doc_string(&attrs), None);
    }

    #[test]
    fn param_attribute_is_stripped() {
        let mut attrs: Vec<Attribute> = vec![
            parse_quote!(#[param(description = "left operand")]),
            parse_quote!(#[allow(unused)]),
        ];
        let description = take_param_description(&mut attrs).expect("parse");
        assert_eq!(description.as_deref(), Some("left operand"));
        assert_eq!(attrs.len(), 1);
    }

    #[test]
    fn unknown_param_option_is_rejected() {
        let mut attrs: Vec<Attribute> = vec![parse_quote!(#[param(default = 3)])];
        assert!(take_param_description(&mut attrs).is_err());
    }
}
