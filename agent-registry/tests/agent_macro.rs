use std::collections::HashMap;

use agent_registry::{
    AgentContext, AgentError, AgentRegistry, ParamSchema, ParamType, ValidationError, agent,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Adds two integers.
#[agent]
fn add(a: i64, b: i64) -> i64 {
    a + b
}

/// Adds two integers after yielding.
#[agent(name = "add_async")]
async fn add_later(a: i64, b: i64) -> i64 {
    tokio::task::yield_now().await;
    a + b
}

#[derive(Debug, Deserialize, ParamSchema)]
struct Input {
    /// Text to echo.
    prompt: String,
    #[param(description = "Optional labels")]
    tags: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
struct Output {
    response: String,
}

/// Echo incoming payload
#[agent(name = "Echoagent")]
fn echo(input: Input) -> Output {
    let tags = input.tags.unwrap_or_default();
    Output {
        response: if tags.is_empty() {
            input.prompt
        } else {
            format!("{} [{}]", input.prompt, tags.join(","))
        },
    }
}

#[agent(description = "Looks up a word count")]
fn count(#[param(description = "Word counts by word")] counts: HashMap<String, u64>, word: String) -> u64 {
    counts.get(&word).copied().unwrap_or(0)
}

#[agent]
fn parse_port(text: String) -> Result<u16, std::num::ParseIntError> {
    text.parse()
}

/// Checks a value against a schema of its own.
#[agent]
fn inner_check(x: i64) -> Result<i64, ValidationError> {
    ParamType::Integer.coerce("inner", json!("zzz")).map(|_| x)
}

#[agent]
fn narrow(x: u8) -> u8 {
    x
}

#[agent]
async fn late_failure(after_ms: u64) -> Result<(), std::io::Error> {
    tokio::time::sleep(std::time::Duration::from_millis(after_ms)).await;
    Err(std::io::Error::other("gone"))
}

struct Caller(&'static str);

#[agent]
fn whoami(ctx: &AgentContext) -> Option<String> {
    ctx.downcast_ref::<Caller>().map(|caller| caller.0.to_owned())
}

#[agent]
fn nothing() {}

#[agent(collect)]
fn collected_double(value: i64) -> i64 {
    value * 2
}

fn registry() -> AgentRegistry {
    let registry = AgentRegistry::default();
    registry.add(add_agent(), None, None).unwrap();
    registry.add(add_later_agent(), None, None).unwrap();
    registry.add(echo_agent(), None, None).unwrap();
    registry.add(count_agent(), None, None).unwrap();
    registry.add(parse_port_agent(), None, None).unwrap();
    registry.add(whoami_agent(), None, None).unwrap();
    registry.add(nothing_agent(), None, None).unwrap();
    registry.add(inner_check_agent(), None, None).unwrap();
    registry.add(narrow_agent(), None, None).unwrap();
    registry.add(late_failure_agent(), None, None).unwrap();
    registry
}

#[test]
fn schema_reflects_signature() {
    let registry = registry();
    let template = registry.get("add").expect("add registered");

    assert_eq!(template.description(), "Adds two integers.");
    let names: Vec<_> = template.parameters().parameters().iter().map(|p| p.name()).collect();
    assert_eq!(names, ["a", "b"]);
    assert!(template.parameters().parameters().iter().all(|p| p.is_required()));
    assert_eq!(
        template.parameters().to_json_schema(),
        json!({
            "title": "add",
            "type": "object",
            "properties": {
                "a": { "title": "A", "type": "integer" },
                "b": { "title": "B", "type": "integer" }
            },
            "required": ["a", "b"]
        })
    );
}

#[test]
fn structured_parameters_describe_their_fields() {
    let registry = registry();
    let template = registry.get("Echoagent").expect("echo registered");
    assert_eq!(template.description(), "Echo incoming payload");

    let ParamType::Object(fields) = template.parameters().get("input").expect("input").ty() else {
        panic!("input should be an object parameter");
    };
    assert_eq!(fields[0].name(), "prompt");
    assert_eq!(fields[0].description(), Some("Text to echo."));
    assert!(fields[0].is_required());
    assert_eq!(fields[1].name(), "tags");
    assert_eq!(fields[1].description(), Some("Optional labels"));
    assert!(!fields[1].is_required());
    assert_eq!(Input::param_type(), ParamType::object(fields.clone()));
}

#[test]
fn explicit_description_and_param_docs_are_used() {
    let registry = registry();
    let template = registry.get("count").expect("count registered");
    assert_eq!(template.description(), "Looks up a word count");
    let counts = template.parameters().get("counts").expect("counts");
    assert_eq!(counts.description(), Some("Word counts by word"));
    assert_eq!(counts.ty(), &ParamType::map(ParamType::Integer));
}

#[tokio::test]
async fn string_arguments_are_coerced() {
    let registry = registry();
    let sum = registry.invoke("add", json!({ "a": "5", "b": 2 })).await.unwrap();
    assert_eq!(sum, json!(7));

    let err = registry
        .invoke("add", json!({ "a": "abc", "b": 2 }))
        .await
        .expect_err("non-numeric string");
    let validation = err.validation().expect("validation error");
    assert_eq!(validation.failures().len(), 1);
    assert_eq!(validation.failures()[0].path(), "a");
}

#[tokio::test]
async fn sync_and_async_agents_behave_the_same() {
    let registry = registry();
    for name in ["add", "add_async"] {
        let output = registry.invoke(name, json!({ "a": 40, "b": "2" })).await.unwrap();
        assert_eq!(output, json!(42), "{name}");

        let err = registry
            .invoke(name, json!({ "a": 1 }))
            .await
            .expect_err("missing argument");
        let validation = err.validation().expect("validation error");
        assert_eq!(validation.failures()[0].path(), "b", "{name}");
        assert_eq!(validation.failures()[0].reason(), "missing required argument");
    }
}

#[tokio::test]
async fn nested_fields_are_validated_and_coerced() {
    let registry = registry();
    let output = registry
        .invoke(
            "Echoagent",
            json!({ "input": { "prompt": "hi", "tags": ["a", "b"], "ignored": true } }),
        )
        .await
        .unwrap();
    assert_eq!(output, json!({ "response": "hi [a,b]" }));

    let err = registry
        .invoke("Echoagent", json!({ "input": { "prompt": 3, "tags": [1] } }))
        .await
        .expect_err("wrong nested types");
    let validation = err.validation().expect("validation error");
    assert!(validation.failure("input.prompt").is_some());
    assert!(validation.failure("input.tags[0]").is_some());
}

#[tokio::test]
async fn returned_errors_become_execution_failures() {
    let registry = registry();
    assert_eq!(
        registry.invoke("parse_port", json!({ "text": "8080" })).await.unwrap(),
        json!(8080)
    );

    let err = registry
        .invoke("parse_port", json!({ "text": "http" }))
        .await
        .expect_err("not a port");
    match err {
        AgentError::Execution { agent, source } => {
            assert_eq!(agent, "parse_port");
            assert!(source.downcast_ref::<std::num::ParseIntError>().is_some());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn context_reaches_agents_that_ask_for_it() {
    let registry = registry();
    let template = registry.get("whoami").expect("whoami registered");
    assert!(template.parameters().is_empty());

    let anonymous = registry.invoke("whoami", Value::Null).await.unwrap();
    assert_eq!(anonymous, Value::Null);

    let named = registry
        .invoke_with_context("whoami", json!({}), AgentContext::new(Caller("ops")))
        .await
        .unwrap();
    assert_eq!(named, json!("ops"));
}

#[tokio::test]
async fn unit_returns_null() {
    let registry = registry();
    assert_eq!(registry.invoke("nothing", Value::Null).await.unwrap(), Value::Null);
}

#[tokio::test]
async fn collected_agents_register_on_request() {
    let registry = AgentRegistry::default();
    assert!(!registry.contains("collected_double"));

    let added = registry.add_collected().unwrap();
    assert!(added.iter().any(|template| template.name() == "collected_double"));
    assert_eq!(
        registry.invoke("collected_double", json!({ "value": "21" })).await.unwrap(),
        json!(42)
    );
}

#[tokio::test]
async fn validation_errors_from_the_body_are_execution_failures() {
    let registry = registry();
    let err = registry
        .invoke("inner_check", json!({ "x": 1 }))
        .await
        .expect_err("body rejects its own value");
    assert!(err.validation().is_none());
    let AgentError::Execution { agent, source } = err else {
        panic!("expected an execution error");
    };
    assert_eq!(agent, "inner_check");
    assert!(source.downcast_ref::<ValidationError>().is_some());
}

#[tokio::test]
async fn rust_type_bounds_are_checked_before_the_call() {
    let registry = registry();
    assert_eq!(registry.invoke("narrow", json!({ "x": "255" })).await.unwrap(), json!(255));

    let err = registry
        .invoke("narrow", json!({ "x": 256 }))
        .await
        .expect_err("out of range for u8");
    let validation = err.validation().expect("validation error");
    assert_eq!(validation.failures()[0].path(), "x");
    assert_eq!(validation.failures()[0].expected(), "u8");
}

#[tokio::test]
async fn async_failures_after_await_carry_their_cause() {
    let registry = registry();
    let err = registry
        .invoke("late_failure", json!({ "after_ms": "5" }))
        .await
        .expect_err("failure");
    let AgentError::Execution { source, .. } = err else {
        panic!("expected an execution error");
    };
    assert_eq!(
        source.downcast_ref::<std::io::Error>().map(ToString::to_string).as_deref(),
        Some("gone")
    );
}
