// SPDX-License-Identifier: MIT OR Apache-2.0
//! `modelflow` - wire spreadsheet models together and derive an execution order.
//!
//! Each spreadsheet declares its input and output variables on `INPUTS` and
//! `OUTPUTS` sheets. A session loads models, wires outputs into inputs and
//! keeps every model's execution rank up to date.

mod commands;
mod config;
mod console;
mod file_watcher;
mod report;
mod session;

use anyhow::Context;
use clap::{Parser, Subcommand};
use config::SessionConfig;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "modelflow", version, about)]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Print the variables a spreadsheet declares
    Inspect {
        /// Spreadsheet to read
        file: PathBuf,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Start an interactive wiring session on stdin
    Session {
        /// Config file (defaults to ./modelflow.ron when present)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Re-ingest models when their files change
        #[arg(long)]
        watch: bool,
        /// Wire same-named variables to and from each newly loaded model
        #[arg(long)]
        auto_wire: bool,
    },
}

fn init_tracing(default_filter: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn inspect(file: &std::path::Path, json: bool) -> anyhow::Result<bool> {
    let result = modelflow_ingest::ingest_path(file);
    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}", result.filename);
        if let Some(error) = &result.error {
            println!("  error:   {error}");
        }
        println!("  inputs:  {}", result.inputs.join(", "));
        println!("  outputs: {}", result.outputs.join(", "));
    }
    Ok(result.is_ok())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        CliCommand::Inspect { file, json } => {
            init_tracing(&SessionConfig::default().log_filter);
            if !inspect(&file, json)? {
                std::process::exit(1);
            }
        }
        CliCommand::Session {
            config,
            watch,
            auto_wire,
        } => {
            let mut config =
                SessionConfig::load(config.as_deref()).context("failed to load configuration")?;
            config.watch |= watch;
            config.auto_wire |= auto_wire;
            init_tracing(&config.log_filter);
            tracing::info!("Starting modelflow v{}", env!("CARGO_PKG_VERSION"));
            console::run(config).await?;
        }
    }

    Ok(())
}
