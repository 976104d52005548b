//! Procedural macros for agent registration.
//!
//! `#[agent]` reads a function signature and emits a companion constructor
//! returning the function's registry description. `#[derive(ParamSchema)]`
//! lets structs with named fields be used as structured agent parameters.
//! Both expand to paths under `::agent_registry`; pass `crate = "..."` when the
//! registry is reached through a re-export.

#![warn(missing_docs, clippy::pedantic)]

mod agent;
mod attrs;
mod schema;

use proc_macro::TokenStream;
use syn::{DeriveInput, ItemFn, parse_macro_input};

/// Turns a function into a registrable agent.
///
/// For `fn add(a: i64, b: i64) -> i64` the attribute keeps `add` unchanged
/// and emits `fn add_agent() -> FunctionSpec`. Each parameter becomes a
/// declared argument typed by its [`ParamSchema`] implementation; a parameter
/// of type `AgentContext` or `&AgentContext` receives the invocation context
/// instead. Functions may be `async` and may return `Result`, in which case
/// the error becomes an execution failure.
///
/// Options:
///
/// - `name = "..."` overrides the declared name (defaults to the function name).
/// - `description = "..."` overrides the doc comment.
/// - `collect` submits the function for `AgentRegistry::add_collected`.
/// - `fallible` treats the return type as a `Result`. Fallible returns are
///   recognized by a last path segment named `Result`; a type alias such as
///   `type Outcome<T> = Result<T, MyError>` needs this option, otherwise the
///   value is serialized as `{"Ok": ...}` / `{"Err": ...}`.
/// - `crate = "..."` sets the path to the registry crate.
///
/// Parameters accept `#[param(description = "...")]`.
///
/// [`ParamSchema`]: derive@ParamSchema
#[proc_macro_attribute]
pub fn agent(attr: TokenStream, item: TokenStream) -> TokenStream {
    let mut options = agent::AgentOptions::default();
    let parser = syn::meta::parser(|meta| options.parse(&meta));
    parse_macro_input!(attr with parser);
    let function = parse_macro_input!(item as ItemFn);

    agent::expand(options, function)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// Derives `ParamSchema` for a struct with named fields.
///
/// The struct is described as an object whose properties are its fields.
/// `Option` fields are optional; every other field is required. Field
/// descriptions come from `#[param(description = "...")]` or the field's doc
/// comment.
#[proc_macro_derive(ParamSchema, attributes(param_schema, param))]
pub fn derive_param_schema(item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    schema::expand(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
