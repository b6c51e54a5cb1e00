//! CLI command definitions for the `parley` binary.

pub mod chat;
pub mod models;
pub mod provider;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Talk to any OpenAI-compatible LLM backend, with tools.
#[derive(Parser)]
#[command(name = "parley", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ask a question, or start an interactive session when no prompt is given.
    Chat(chat::ChatArgs),

    /// List the models a backend serves.
    Models {
        /// Backend to query (defaults to the resolved provider).
        #[arg(short, long)]
        provider: Option<String>,
    },

    /// Show registry details (context, pricing, features) for a model.
    ModelInfo {
        /// Model id, optionally prefixed with a provider (`groq:llama3-70b-8192`).
        model: String,
    },

    /// Inspect configured backends.
    #[command(alias = "providers")]
    Provider {
        #[command(subcommand)]
        command: provider::ProviderCommand,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}
