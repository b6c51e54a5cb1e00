//! Parley CLI entry point.
//!
//! Binary name: `parley`
//!
//! Parses CLI arguments, loads config and the model registry, then
//! dispatches to the command handler.

mod cli;
mod prompt;
mod state;
mod tools;

use clap::Parser;
use clap_complete::generate;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,parley=debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "parley", &mut std::io::stdout());
        return Ok(());
    }

    let state = AppState::init().await?;

    match cli.command {
        Commands::Chat(args) => {
            cli::chat::run_chat(&state, args, cli.json, cli.quiet).await?;
        }
        Commands::Models { provider } => {
            cli::models::list_models(&state, provider.as_deref(), cli.json).await?;
        }
        Commands::ModelInfo { model } => {
            cli::models::model_info(&state, &model, cli.json)?;
        }
        Commands::Provider { command } => {
            cli::provider::handle_provider_command(command, &state, cli.json).await?;
        }
        Commands::Completions { .. } => unreachable!("handled above"),
    }

    Ok(())
}
