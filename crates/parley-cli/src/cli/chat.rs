//! `parley chat`: one-shot questions and the interactive session loop.

use std::time::Duration;

use anyhow::Result;
use clap::Args;
use console::style;
use dialoguer::Input;

use parley_core::llm::box_provider::BoxLlmProvider;
use parley_core::llm::pricing::format_cost;
use parley_core::llm::provider::LlmProvider;
use parley_core::orchestrator::{
    InteractiveOrchestrator, OrchestrationOutcome, OrchestratorConfig,
};
use parley_types::llm::Message;

use crate::prompt::TerminalContextHandler;
use crate::state::AppState;
use crate::tools::LocalToolExecutor;

const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant working in the user's \
    current directory. Use read_file to inspect files and run_shell_command to run commands \
    when that helps you answer. Use ask_user when you need clarification.";

#[derive(Args, Debug)]
pub struct ChatArgs {
    /// Question to ask. Starts an interactive session when omitted.
    pub prompt: Option<String>,

    /// Backend to use (openai, deepinfra, ollama, ...).
    #[arg(short, long)]
    pub provider: Option<String>,

    /// Model id, optionally as `provider:model`.
    #[arg(short, long)]
    pub model: Option<String>,

    /// Replace the default system prompt.
    #[arg(long)]
    pub system: Option<String>,

    /// Maximum provider requests per question.
    #[arg(long)]
    pub max_turns: Option<u32>,

    /// Wall-clock budget per question in seconds (0 disables it).
    #[arg(long)]
    pub timeout: Option<u64>,

    #[arg(long)]
    pub temperature: Option<f64>,

    /// Reasoning effort hint for reasoning models (low, medium, high).
    #[arg(long)]
    pub reasoning_effort: Option<String>,

    /// Run shell commands without asking first.
    #[arg(short, long)]
    pub yes: bool,

    /// Print the model's reasoning when the backend returns it.
    #[arg(long)]
    pub show_reasoning: bool,
}

type Orchestrator =
    InteractiveOrchestrator<BoxLlmProvider, LocalToolExecutor, TerminalContextHandler<LocalToolExecutor>>;

fn build_orchestrator(
    state: &AppState,
    args: &ChatArgs,
    provider: BoxLlmProvider,
    quiet: bool,
) -> Orchestrator {
    let timeout_secs = args
        .timeout
        .unwrap_or(state.config.orchestration_timeout_secs);
    let config = OrchestratorConfig {
        max_turns: args
            .max_turns
            .unwrap_or(state.config.orchestration_max_attempts),
        timeout: (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs)),
        model: provider.model().to_string(),
        max_tokens: None,
        temperature: args.temperature,
        reasoning_effort: args.reasoning_effort.clone(),
    };
    let tools = LocalToolExecutor::new()
        .with_confirmation(!args.yes)
        .with_announcements(!quiet);
    let context = TerminalContextHandler::new(tools.clone());
    InteractiveOrchestrator::new(provider, tools, context, config)
}

/// Run `parley chat`.
pub async fn run_chat(state: &AppState, args: ChatArgs, json: bool, quiet: bool) -> Result<()> {
    let selection = state.select_model(args.provider.as_deref(), args.model.as_deref())?;
    let provider = state.build_provider(&selection)?;
    let kind = provider.kind();
    tracing::info!(provider = %kind, model = %selection.model, "starting chat");

    let orchestrator = build_orchestrator(state, &args, provider, quiet);
    let system = args
        .system
        .clone()
        .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string());
    let mut history = vec![Message::system(system)];

    if let Some(prompt) = args.prompt.as_deref() {
        history.push(Message::user(prompt));
        let outcome = orchestrator.run(history).await?;
        state.remember_provider(kind).await;
        print_outcome(&orchestrator, &outcome, json, args.show_reasoning)?;
        return Ok(());
    }

    if !json {
        println!();
        println!(
            "  {} {} {}",
            style("parley").cyan().bold(),
            style(kind.display_name()).bold(),
            style(&selection.model).dim()
        );
        println!(
            "  {}",
            style("Type a question, or 'exit' to quit.").dim()
        );
    }

    let mut remembered = false;
    while let Some(line) = read_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if matches!(line, "exit" | "quit" | "/exit" | "/quit") {
            break;
        }

        history.push(Message::user(line));
        match orchestrator.run(history.clone()).await {
            Ok(outcome) => {
                if !remembered {
                    state.remember_provider(kind).await;
                    remembered = true;
                }
                print_outcome(&orchestrator, &outcome, json, args.show_reasoning)?;
                history = outcome.messages;
                history.push(Message::assistant(outcome.content));
            }
            Err(e) => {
                tracing::warn!(error = %e, "orchestration failed");
                eprintln!("  {} {}", style("!").red().bold(), e);
                history.pop();
            }
        }
    }

    Ok(())
}

/// Next line from the user, or `None` on end of input.
async fn read_line() -> Result<Option<String>> {
    let read = tokio::task::spawn_blocking(|| {
        Input::<String>::new()
            .with_prompt(">")
            .allow_empty(true)
            .interact_text()
    })
    .await?;

    match read {
        Ok(line) => Ok(Some(line)),
        Err(dialoguer::Error::IO(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn print_outcome(
    orchestrator: &Orchestrator,
    outcome: &OrchestrationOutcome,
    json: bool,
    show_reasoning: bool,
) -> Result<()> {
    let provider = orchestrator.provider();

    if json {
        let body = serde_json::json!({
            "provider": provider.kind().as_str(),
            "model": orchestrator.config().model,
            "content": outcome.content,
            "reasoning": outcome.reasoning,
            "turns": outcome.turns,
            "usage": outcome.usage,
        });
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    if show_reasoning && let Some(reasoning) = outcome.reasoning.as_deref() {
        println!();
        println!("{}", style(reasoning).dim().italic());
    }

    println!();
    println!("{}", outcome.content);
    println!();
    println!("  {}", style(summary_line(outcome)).dim());
    Ok(())
}

fn summary_line(outcome: &OrchestrationOutcome) -> String {
    let turns = match outcome.turns {
        1 => "1 turn".to_string(),
        n => format!("{n} turns"),
    };
    let mut line = format!("{turns} | {} tokens", outcome.usage.total_tokens);
    if let Some(cost) = outcome.usage.estimated_cost {
        line.push_str(" | ");
        line.push_str(&format_cost(cost));
    }
    line
}
