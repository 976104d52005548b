//! Registers a handful of agents and dispatches them from the command line.
//!
//! ```text
//! cargo run -p echo-agent -- list
//! cargo run -p echo-agent -- invoke add --args '{"a": "2", "b": 3}'
//! cargo run -p echo-agent -- invoke Echoagent --args '{"input": {"prompt": "hi"}}'
//! ```

use std::time::Duration;

use agent_config::RegistryConfig;
use agent_registry::{AgentContext, AgentRegistry, Arguments, BoxError, FunctionSpec, ParamSchema, agent};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "echo-agent", about = "Register and invoke demo agents")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the descriptor of every registered agent.
    List,
    /// Invoke an agent by name.
    Invoke {
        /// Registered agent name.
        name: String,
        /// JSON object of arguments.
        #[arg(long, default_value = "{}")]
        args: String,
        /// Operator name made available to agents through their context.
        #[arg(long, default_value = "cli")]
        operator: String,
    },
}

/// Request accepted by the echo agent.
#[derive(Debug, Deserialize, ParamSchema)]
struct Input {
    /// Text to send back.
    prompt: String,
    #[param(description = "How many times to repeat the prompt (at most 16)")]
    repeat: Option<u32>,
}

#[derive(Debug, Serialize)]
struct Output {
    response: String,
}

struct Operator(String);

const MAX_REPEAT: u32 = 16;

/// Echoes the prompt back, optionally repeated.
#[agent(name = "Echoagent")]
fn echo(input: Input) -> Output {
    let repeat = input.repeat.unwrap_or(1).clamp(1, MAX_REPEAT) as usize;
    Output {
        response: vec![input.prompt; repeat].join(" "),
    }
}

/// Adds two integers.
#[agent]
fn add(a: i64, b: i64) -> i64 {
    a + b
}

/// Greets someone after a short delay.
#[agent]
async fn greet(name: String, ctx: &AgentContext) -> String {
    tokio::time::sleep(Duration::from_millis(10)).await;
    match ctx.downcast_ref::<Operator>() {
        Some(Operator(operator)) => format!("Hello, {name}! (from {operator})"),
        None => format!("Hello, {name}!"),
    }
}

/// Divides two numbers, failing on a zero divisor.
#[agent(collect)]
fn divide(numerator: f64, denominator: f64) -> Result<f64, String> {
    if denominator == 0.0 {
        return Err("division by zero".to_owned());
    }
    Ok(numerator / denominator)
}

fn build_registry() -> Result<AgentRegistry> {
    let config = RegistryConfig::from_env()?;
    let registry = AgentRegistry::with_config(&config);

    registry.add(echo_agent(), None, None)?;
    registry.add(add_agent(), None, None)?;
    registry.add(greet_agent(), None, None)?;
    registry.add(
        FunctionSpec::sync(|mut args: Arguments, _: AgentContext| {
            let text: String = args.take("text")?;
            Ok::<_, BoxError>(text.to_uppercase())
        })
        .param::<String>("text"),
        Some("shout"),
        Some("Upper-cases the given text."),
    )?;
    registry.add_collected()?;

    Ok(registry)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let registry = build_registry()?;
    info!(agents = registry.len(), "registry ready");

    match cli.command {
        Command::List => {
            let descriptors = registry.descriptors();
            println!("{}", serde_json::to_string_pretty(&descriptors)?);
        }
        Command::Invoke {
            name,
            args,
            operator,
        } => {
            let arguments: Value =
                serde_json::from_str(&args).context("--args must be valid JSON")?;
            let context = AgentContext::new(Operator(operator));
            let output = registry
                .invoke_with_context(&name, arguments, context)
                .await
                .with_context(|| format!("invoking `{name}`"))?;
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
