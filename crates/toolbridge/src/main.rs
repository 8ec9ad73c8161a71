// SPDX-FileCopyrightText: 2026 Toolbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Toolbridge - delegate host tools to a native agent core.
//!
//! This is the command-line front end. It builds an agent on the in-process
//! loopback core with the built-in tools registered, so every call travels
//! through the same C-ABI trampolines a native core would use.

mod builtin;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde_json::{Value, json};
use toolbridge_agent::{AgentFacade, AgentHandle, AgentOptions, LoopbackCore, ToolSpec};
use toolbridge_config::ToolbridgeConfig;
use toolbridge_core::BridgeError;
use tracing::debug;

/// Toolbridge - delegate host tools to a native agent core.
#[derive(Parser, Debug)]
#[command(name = "toolbridge", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the default locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// List the registered tools and their parameter schemas.
    Tools {
        /// Print registration records as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Call one tool through its trampoline and print the output envelope.
    Invoke {
        /// Tool name.
        tool: String,
        /// JSON object of arguments.
        #[arg(default_value = "{}")]
        arguments: String,
    },
    /// Print the effective configuration.
    Config,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => toolbridge_config::load_and_validate_path(path),
        None => toolbridge_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            toolbridge_config::render_errors(&errors);
            return ExitCode::FAILURE;
        }
    };
    init_tracing(&config.agent.log_level);
    debug!(agent = config.agent.name.as_str(), "configuration loaded");

    let result = match cli.command {
        Commands::Tools { json } => list_tools(&config, json).await,
        Commands::Invoke { tool, arguments } => invoke(&config, &tool, &arguments).await,
        Commands::Config => print_config(&config),
    };
    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn loopback_agent(config: &ToolbridgeConfig) -> Result<AgentHandle, BridgeError> {
    let facade = AgentFacade::from_config(Arc::new(LoopbackCore::new()), config);
    let tools = builtin::builtin_tools()
        .into_iter()
        .map(ToolSpec::from)
        .collect();
    facade
        .create_agent_with(AgentOptions::from_config(&config.agent), tools)
        .await
}

async fn list_tools(config: &ToolbridgeConfig, as_json: bool) -> Result<ExitCode, BridgeError> {
    let agent = loopback_agent(config).await?;
    if as_json {
        let records: Vec<Value> = agent
            .tools()
            .iter()
            .map(|tool| {
                json!({
                    "name": tool.name(),
                    "version": tool.version(),
                    "author": tool.author(),
                    "description": tool.description(),
                    "parameters": tool.parameters(),
                })
            })
            .collect();
        let text = serde_json::to_string_pretty(&records)
            .map_err(|e| BridgeError::Internal(e.to_string()))?;
        println!("{text}");
    } else {
        for tool in agent.tools() {
            println!("{} {} ({})", tool.name(), tool.version(), tool.author());
            if !tool.description().is_empty() {
                println!("    {}", tool.description());
            }
            println!("    parameters: {}", tool.parameters());
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Exit code 2 marks an error envelope, as opposed to a bridge failure.
async fn invoke(
    config: &ToolbridgeConfig,
    tool: &str,
    arguments: &str,
) -> Result<ExitCode, BridgeError> {
    let mut agent = loopback_agent(config).await?;
    debug!(tool, arguments, "invoking tool");
    let (reply, failed) = call_once(&mut agent, tool, arguments).await?;
    println!("{reply}");
    Ok(if failed {
        ExitCode::from(2)
    } else {
        ExitCode::SUCCESS
    })
}

/// Runs one call and reports whether the binding answered with an error
/// envelope. A successful result may itself contain an `error` key, so the
/// reply text alone cannot tell.
async fn call_once(
    agent: &mut AgentHandle,
    tool: &str,
    arguments: &str,
) -> Result<(String, bool), BridgeError> {
    let failures = |agent: &AgentHandle| {
        agent
            .tool_stats()
            .into_iter()
            .find(|(name, _)| *name == tool)
            .map_or(0, |(_, stats)| stats.failures)
    };
    let before = failures(&*agent);
    let reply = agent.prompt(&format!("{tool} {arguments}")).await?;
    Ok((reply, failures(&*agent) > before))
}

fn print_config(config: &ToolbridgeConfig) -> Result<ExitCode, BridgeError> {
    let text = toml::to_string_pretty(config).map_err(|e| BridgeError::Internal(e.to_string()))?;
    print!("{text}");
    Ok(ExitCode::SUCCESS)
}

/// Initialize the tracing subscriber with an env filter.
///
/// `RUST_LOG` wins when set. Logs go to stderr so tool output on stdout
/// stays machine-readable.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("toolbridge={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
