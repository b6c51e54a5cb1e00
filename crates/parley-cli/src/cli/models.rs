//! `parley models` and `parley model-info`.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use parley_core::llm::provider::LlmProvider;
use parley_types::model::{ModelConfig, ModelDetails};
use parley_types::provider::ProviderKind;

use crate::state::AppState;

/// List the models the resolved (or named) backend serves.
pub async fn list_models(state: &AppState, provider: Option<&str>, json: bool) -> Result<()> {
    let selection = state.select_model(provider, None)?;
    let backend = state.build_provider(&selection)?;
    let models = backend.list_models().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&models)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} {}",
        style(backend.kind().display_name()).bold(),
        style(format!("({} models)", models.len())).dim()
    );
    println!();
    println!("{}", models_table(&models));
    println!();
    Ok(())
}

fn models_table(models: &[ModelDetails]) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Model").fg(Color::White),
        Cell::new("Context").fg(Color::White),
        Cell::new("Features").fg(Color::White),
        Cell::new("Default").fg(Color::White),
    ]);

    for model in models {
        let context = model
            .context_length
            .map(|c| c.to_string())
            .unwrap_or_else(|| "-".to_string());
        let features = if model.features.is_empty() {
            "-".to_string()
        } else {
            model.features.join(", ")
        };
        let default = if model.is_default {
            Cell::new("yes").fg(Color::Green)
        } else {
            Cell::new("")
        };
        table.add_row(vec![
            Cell::new(&model.id).fg(Color::Cyan),
            Cell::new(context),
            Cell::new(features),
            default,
        ]);
    }
    table
}

/// Show what the registry knows about `reference`.
///
/// A leading `provider:` is stripped when it names a known backend.
pub fn model_info(state: &AppState, reference: &str, json: bool) -> Result<()> {
    let model_id = match reference.split_once(':') {
        Some((prefix, rest)) if prefix.parse::<ProviderKind>().is_ok() => rest,
        _ => reference,
    };
    let config = state.registry.get_model_config(model_id)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    println!();
    let title = if config.name.is_empty() {
        model_id
    } else {
        config.name.as_str()
    };
    println!("  {}", style(title).bold());
    println!();
    for (label, value) in info_rows(model_id, &config) {
        println!("  {:<16} {}", style(label).dim(), value);
    }
    println!();
    Ok(())
}

fn info_rows(model_id: &str, config: &ModelConfig) -> Vec<(&'static str, String)> {
    let list = |items: &[String]| {
        if items.is_empty() {
            "-".to_string()
        } else {
            items.join(", ")
        }
    };
    vec![
        ("Model", model_id.to_string()),
        ("Provider", config.provider.clone()),
        ("Context", format!("{} tokens", config.context_length)),
        ("Input", format!("${:.2} / 1M tokens", config.input_cost)),
        ("Output", format!("${:.2} / 1M tokens", config.output_cost)),
        ("Features", list(&config.features)),
        ("Tags", list(&config.tags)),
    ]
}
