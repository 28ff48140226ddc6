mod bootstrap_helpers;
mod cli_args;
mod startup_config;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use unfurl_discussions_runtime::{UnfurlOutcome, UnfurlRuntime};

use crate::bootstrap_helpers::init_tracing;
use crate::cli_args::Cli;
use crate::startup_config::build_runtime_config;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!("unfurl run failed: {error:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = build_runtime_config(cli)?;
    let runtime = UnfurlRuntime::new(config)?;
    let outcome = runtime.run().await?;
    if let UnfurlOutcome::DryRun { body, .. } = &outcome {
        println!("{body}");
    }
    tracing::info!(outcome = outcome.label(), "unfurl run finished");
    Ok(())
}
