//! Provider CLI commands: list and check.
//!
//! Availability is presence of the backend's API key variable. A check
//! sends a one-token request to the configured endpoint.

use std::io::Write;

use anyhow::Result;
use clap::Subcommand;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use serde::Serialize;

use parley_core::llm::provider::LlmProvider;
use parley_infra::llm::test_provider_connection;
use parley_types::provider::ProviderKind;

use crate::state::AppState;

#[derive(Subcommand, Debug)]
pub enum ProviderCommand {
    /// List every supported backend with its credential status.
    List,

    /// Verify a backend is reachable and accepts its credential.
    Check {
        /// Backend to check (defaults to the resolved provider).
        #[arg(short, long)]
        provider: Option<String>,

        /// Model to use for the check request.
        #[arg(short, long)]
        model: Option<String>,
    },
}

pub async fn handle_provider_command(
    cmd: ProviderCommand,
    state: &AppState,
    json: bool,
) -> Result<()> {
    match cmd {
        ProviderCommand::List => provider_list(state, json),
        ProviderCommand::Check { provider, model } => {
            provider_check(state, provider.as_deref(), model.as_deref(), json).await
        }
    }
}

#[derive(Debug, Serialize)]
struct ProviderRow {
    provider: ProviderKind,
    name: &'static str,
    env_var: Option<&'static str>,
    available: bool,
    selected: bool,
    default_model: &'static str,
    base_url: String,
}

fn provider_rows(state: &AppState) -> Vec<ProviderRow> {
    let selected = state
        .resolver
        .determine_provider(None, state.last_used_provider())
        .ok();

    ProviderKind::SCAN_ORDER
        .into_iter()
        .map(|kind| ProviderRow {
            provider: kind,
            name: kind.display_name(),
            env_var: kind.env_var(),
            available: state.resolver.is_available(kind),
            selected: selected == Some(kind),
            default_model: kind.default_model(),
            base_url: state.config.base_url_for(kind).to_string(),
        })
        .collect()
}

fn provider_list(state: &AppState, json: bool) -> Result<()> {
    let rows = provider_rows(state);

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("").fg(Color::White),
        Cell::new("Provider").fg(Color::White),
        Cell::new("API Key").fg(Color::White),
        Cell::new("Status").fg(Color::White),
        Cell::new("Default Model").fg(Color::White),
        Cell::new("Base URL").fg(Color::White),
    ]);

    for row in &rows {
        let marker = if row.selected {
            Cell::new("*").fg(Color::Green)
        } else {
            Cell::new("")
        };
        let status = if row.available {
            Cell::new("available").fg(Color::Green)
        } else {
            Cell::new("no key").fg(Color::Yellow)
        };
        table.add_row(vec![
            marker,
            Cell::new(row.name).fg(Color::Cyan),
            Cell::new(row.env_var.unwrap_or("-")),
            status,
            Cell::new(row.default_model),
            Cell::new(&row.base_url).fg(Color::DarkGrey),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    println!(
        "  {} marks the provider used when none is given. Override with {} or {}.",
        style("*").green().bold(),
        style("--provider").cyan(),
        style("PARLEY_PROVIDER").cyan()
    );
    println!();
    Ok(())
}

async fn provider_check(
    state: &AppState,
    provider: Option<&str>,
    model: Option<&str>,
    json: bool,
) -> Result<()> {
    let selection = state.select_model(provider, model)?;
    let backend = state.build_provider(&selection)?;

    if !json {
        print!(
            "  Checking {} ({}) ... ",
            style(backend.kind().display_name()).bold(),
            style(backend.model()).dim()
        );
        std::io::stdout().flush()?;
    }

    match test_provider_connection(&backend).await {
        Ok(()) => {
            if json {
                let body = serde_json::json!({
                    "provider": backend.kind(),
                    "model": backend.model(),
                    "connected": true,
                });
                println!("{}", serde_json::to_string_pretty(&body)?);
            } else {
                println!("{}", style("connected").green().bold());
            }
            Ok(())
        }
        Err(e) => {
            if json {
                let body = serde_json::json!({
                    "provider": backend.kind(),
                    "model": backend.model(),
                    "connected": false,
                    "message": e.to_string(),
                });
                println!("{}", serde_json::to_string_pretty(&body)?);
                return Ok(());
            }
            println!("{}", style("FAILED").red().bold());
            Err(e.into())
        }
    }
}
