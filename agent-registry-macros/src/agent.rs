//! Expansion of the `#[agent]` attribute.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::ext::IdentExt;
use syn::meta::ParseNestedMeta;
use syn::spanned::Spanned;
use syn::{FnArg, ItemFn, LitStr, Pat, Path, ReturnType, Type};

use crate::attrs;

#[derive(Default)]
pub(crate) struct AgentOptions {
    name: Option<LitStr>,
    description: Option<LitStr>,
    collect: bool,
    fallible: bool,
    krate: Option<Path>,
}

impl AgentOptions {
    pub(crate) fn parse(&mut self, meta: &ParseNestedMeta<'_>) -> syn::Result<()> {
        if meta.path.is_ident("name") {
            self.name = Some(meta.value()?.parse()?);
        } else if meta.path.is_ident("description") {
            self.description = Some(meta.value()?.parse()?);
        } else if meta.path.is_ident("collect") {
            self.collect = true;
        } else if meta.path.is_ident("fallible") {
            self.fallible = true;
        } else if meta.path.is_ident("crate") {
            let value: LitStr = meta.value()?.parse()?;
            self.krate = Some(attrs::parse_crate_path(&value)?);
        } else {
            return Err(meta.error(
                "unsupported agent option; expected `name`, `description`, `collect`, `fallible`, or `crate`",
            ));
        }
        Ok(())
    }
}

enum Input {
    Argument { name: String, ty: Type, description: Option<String> },
    Context,
    ContextRef,
}

enum Output {
    Value,
    Fallible,
}

pub(crate) fn expand(options: AgentOptions, mut function: ItemFn) -> syn::Result<TokenStream> {
    check_signature(&function)?;

    let krate = options.krate.unwrap_or_else(attrs::default_crate_path);
    let fn_ident = function.sig.ident.clone();
    let spec_ident = format_ident!("{}_agent", fn_ident.unraw());
    let vis = function.vis.clone();
    let is_async = function.sig.asyncness.is_some();

    let mut inputs = Vec::with_capacity(function.sig.inputs.len());
    for arg in &mut function.sig.inputs {
        let pat_type = match arg {
            FnArg::Typed(pat_type) => pat_type,
            FnArg::Receiver(receiver) => {
                return Err(syn::Error::new(
                    receiver.span(),
                    "agent functions cannot take `self`",
                ));
            }
        };
        let description = attrs::take_param_description(&mut pat_type.attrs)?;
        inputs.push(classify_input(&pat_type.pat, &pat_type.ty, description)?);
    }
    let output = if options.fallible {
        Output::Fallible
    } else {
        classify_output(&function.sig.output)
    };

    let name = options
        .name
        .map_or_else(|| fn_ident.unraw().to_string(), |name| name.value());
    let doc = options
        .description
        .map(|description| description.value())
        .or_else(|| attrs::doc_string(&function.attrs));

    let mut bindings = Vec::new();
    let mut call_args = Vec::new();
    let mut declarations = Vec::new();
    for (idx, input) in inputs.iter().enumerate() {
        match input {
            Input::Argument { name, ty, description } => {
                let binding = format_ident!("__arg{}", idx);
                bindings.push(quote! {
                    let #binding: #ty = match __arguments.take(#name) {
                        ::core::result::Result::Ok(value) => value,
                        ::core::result::Result::Err(err) => {
                            return ::core::result::Result::Err(#krate::CallError::from(err));
                        }
                    };
                });
                call_args.push(quote!(#binding));
                declarations.push(match description {
                    Some(description) => {
                        quote!(.param_described::<#ty>(#name, #description))
                    }
                    None => quote!(.param::<#ty>(#name)),
                });
            }
            Input::Context => call_args.push(quote!(::core::clone::Clone::clone(&__context))),
            Input::ContextRef => call_args.push(quote!(&__context)),
        }
    }

    let call = if is_async {
        quote!(#fn_ident(#(#call_args),*).await)
    } else {
        quote!(#fn_ident(#(#call_args),*))
    };
    let convert = match output {
        Output::Value => quote!(#krate::__private::output_value(__output)),
        Output::Fallible => quote!(#krate::__private::output_result(__output)),
    };
    let with_doc = doc.map(|doc| quote!(.with_doc(#doc)));
    let spec_doc = format!("Registry description of the `{name}` agent, generated by `#[agent]`.");
    let submit = options.collect.then(|| {
        quote! {
            #krate::__private::inventory::submit! {
                #krate::AgentDefinition::new(#spec_ident)
            }
        }
    });

    Ok(quote! {
        #function

        #[doc = #spec_doc]
        #vis fn #spec_ident() -> #krate::FunctionSpec {
            #krate::FunctionSpec::from_handler(
                |__arguments: #krate::Arguments,
                 __context: #krate::AgentContext|
                 -> #krate::AgentFuture {
                    ::std::boxed::Box::pin(async move {
                        #[allow(unused_mut)]
                        let mut __arguments = __arguments;
                        #(#bindings)*
                        let __output = #call;
                        #convert
                    })
                },
            )
            .with_name(#name)
            #with_doc
            #(#declarations)*
        }

        #submit
    })
}

fn check_signature(function: &ItemFn) -> syn::Result<()> {
    let sig = &function.sig;
    if !sig.generics.params.is_empty() || sig.generics.where_clause.is_some() {
        return Err(syn::Error::new(
            sig.generics.span(),
            "agent functions cannot be generic",
        ));
    }
    if let Some(token) = &sig.unsafety {
        return Err(syn::Error::new(token.span(), "agent functions cannot be unsafe"));
    }
    if let Some(variadic) = &sig.variadic {
        return Err(syn::Error::new(
            variadic.span(),
            "agent functions cannot be variadic",
        ));
    }
    Ok(())
}

fn classify_input(pat: &Pat, ty: &Type, description: Option<String>) -> syn::Result<Input> {
    if let Type::Reference(reference) = ty {
        if is_context(&reference.elem) && reference.mutability.is_none() {
            return Ok(Input::ContextRef);
        }
        return Err(syn::Error::new(
            ty.span(),
            "agent parameters must be owned types; only `&AgentContext` may be borrowed",
        ));
    }
    if is_context(ty) {
        return Ok(Input::Context);
    }
    if matches!(ty, Type::ImplTrait(_) | Type::Infer(_)) {
        return Err(syn::Error::new(
            ty.span(),
            "agent parameters need a concrete type so a schema can be derived",
        ));
    }

    let Pat::Ident(ident) = pat else {
        return Err(syn::Error::new(
            pat.span(),
            "agent parameters must be plain identifiers",
        ));
    };
    if ident.by_ref.is_some() || ident.subpat.is_some() {
        return Err(syn::Error::new(
            pat.span(),
            "agent parameters must be plain identifiers",
        ));
    }

    Ok(Input::Argument {
        name: ident.ident.unraw().to_string(),
        ty: ty.clone(),
        description,
    })
}

fn is_context(ty: &Type) -> bool {
    match ty {
        Type::Path(path) if path.qself.is_none() => path
            .path
            .segments
            .last()
            .is_some_and(|segment| segment.ident == "AgentContext" && segment.arguments.is_empty()),
        Type::Paren(inner) => is_context(&inner.elem),
        Type::Group(inner) => is_context(&inner.elem),
        _ => false,
    }
}

fn classify_output(output: &ReturnType) -> Output {
    match output {
        ReturnType::Type(_, ty) => match ty.as_ref() {
            Type::Path(path)
                if path
                    .path
                    .segments
                    .last()
                    .is_some_and(|segment| segment.ident == "Result") =>
            {
                Output::Fallible
            }
            _ => Output::Value,
        },
        ReturnType::Default => Output::Value,
    }
}
