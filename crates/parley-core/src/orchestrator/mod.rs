//! Interactive tool-use orchestration.
//!
//! `InteractiveOrchestrator` drives a bounded, strictly sequential loop:
//! send the history plus the tool declarations, classify the reply with
//! [`parse::detect_intent`], run any requested tools or context lookups,
//! append one synthetic message with the results, and repeat until the
//! model answers in plain content or the turn budget runs out.

pub mod collaborators;
pub mod parse;
pub mod tools;

use std::time::Duration;

use tokio::time::Instant;
use tracing::{Instrument, debug, info, info_span, warn};

use parley_types::llm::{ChatRequest, ChatResponse, LlmError, Message, RequestOptions, Usage};
use parley_types::tool::{ContextRequest, ToolDeclaration, ToolInvocation};

use crate::llm::provider::LlmProvider;

use collaborators::{ContextHandler, ToolExecutor};
use parse::{DetectedIntent, ParsedToolCall, detect_intent};

/// Turn budget used when none is configured.
pub const DEFAULT_MAX_TURNS: u32 = 8;

/// Errors that end an orchestration session.
#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    /// The backend request failed or exceeded the session deadline.
    #[error("request failed: {0}")]
    Request(#[from] LlmError),

    /// The model kept asking for tools and never produced an answer.
    #[error("turn budget exhausted after {max_turns} turns without a final answer")]
    TurnBudgetExhausted { max_turns: u32 },

    #[error("context handler failed: {0}")]
    ContextHandler(String),
}

/// Per-session settings.
#[derive(Debug, Clone, PartialEq)]
pub struct OrchestratorConfig {
    pub max_turns: u32,
    /// Wall-clock budget for the whole session. Every provider call is
    /// cancelled when it runs past the resulting deadline.
    pub timeout: Option<Duration>,
    /// Empty means the provider's active model.
    pub model: String,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f64>,
    pub reasoning_effort: Option<String>,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_turns: DEFAULT_MAX_TURNS,
            timeout: None,
            model: String::new(),
            max_tokens: None,
            temperature: None,
            reasoning_effort: None,
        }
    }
}

/// Result of a session that ended with a final answer.
#[derive(Debug, Clone)]
pub struct OrchestrationOutcome {
    pub content: String,
    pub reasoning: Option<String>,
    /// Number of provider requests made, including the final one.
    pub turns: u32,
    /// Usage summed over every turn.
    pub usage: Usage,
    /// Full history as sent on the final turn.
    pub messages: Vec<Message>,
}

enum TurnOutcome {
    Continue,
    Done {
        content: String,
        reasoning: Option<String>,
    },
}

struct Session {
    messages: Vec<Message>,
    usage: Usage,
}

/// Drives the tool-use loop against one provider.
pub struct InteractiveOrchestrator<P, T, H> {
    provider: P,
    tools: T,
    context: H,
    config: OrchestratorConfig,
    declarations: Vec<ToolDeclaration>,
}

impl<P, T, H> InteractiveOrchestrator<P, T, H>
where
    P: LlmProvider,
    T: ToolExecutor,
    H: ContextHandler,
{
    pub fn new(provider: P, tools: T, context: H, mut config: OrchestratorConfig) -> Self {
        if config.max_turns == 0 {
            config.max_turns = DEFAULT_MAX_TURNS;
        }
        Self {
            provider,
            tools,
            context,
            config,
            declarations: tools::tool_declarations(),
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn tool_executor(&self) -> &T {
        &self.tools
    }

    pub fn context_handler(&self) -> &H {
        &self.context
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Run the loop starting from `messages` until a final answer.
    pub async fn run(&self, messages: Vec<Message>) -> Result<OrchestrationOutcome, OrchestratorError> {
        let deadline = self.config.timeout.map(|t| Instant::now() + t);
        let model = if self.config.model.is_empty() {
            self.provider.model().to_string()
        } else {
            self.config.model.clone()
        };
        let max_turns = self.config.max_turns;

        let mut session = Session {
            messages,
            usage: Usage::default(),
        };

        for turn in 1..=max_turns {
            let span = info_span!(
                "orchestrator.turn",
                turn,
                max_turns,
                provider = self.provider.name(),
                model = %model,
            );

            match self.run_turn(&model, deadline, &mut session).instrument(span).await? {
                TurnOutcome::Continue => continue,
                TurnOutcome::Done { content, reasoning } => {
                    info!(turns = turn, total_tokens = session.usage.total_tokens, "orchestration finished");
                    return Ok(OrchestrationOutcome {
                        content,
                        reasoning,
                        turns: turn,
                        usage: session.usage,
                        messages: session.messages,
                    });
                }
            }
        }

        warn!(max_turns, "turn budget exhausted without a final answer");
        Err(OrchestratorError::TurnBudgetExhausted { max_turns })
    }

    async fn run_turn(
        &self,
        model: &str,
        deadline: Option<Instant>,
        session: &mut Session,
    ) -> Result<TurnOutcome, OrchestratorError> {
        let request = ChatRequest {
            model: model.to_string(),
            messages: session.messages.clone(),
            tools: self.declarations.clone(),
            options: RequestOptions {
                temperature: self.config.temperature,
                max_tokens: self.config.max_tokens,
                stream: false,
                reasoning_effort: self.config.reasoning_effort.clone(),
            },
        };

        let response = self.send(&request, deadline).await?;

        let mut usage = response.usage.clone();
        if usage.estimated_cost.is_none() {
            usage.estimated_cost = self.provider.estimate_cost(&usage);
        }
        session.usage.accumulate(&usage);

        let choice = response
            .into_first_choice()
            .ok_or(OrchestratorError::Request(LlmError::EmptyResponse))?;

        match detect_intent(&choice.message) {
            DetectedIntent::ToolCalls(calls) => {
                debug!(count = calls.len(), "executing tool calls");
                let lines = self.execute_calls(calls).await;
                session.messages.push(Message::system(format!(
                    "Tool execution results:\n{}",
                    lines.join("\n")
                )));
                Ok(TurnOutcome::Continue)
            }
            DetectedIntent::ContextRequests(requests) => {
                debug!(count = requests.len(), "handling context requests");
                let info = self
                    .context
                    .handle(&requests)
                    .await
                    .map_err(|e| OrchestratorError::ContextHandler(e.to_string()))?;
                session
                    .messages
                    .push(Message::user(format!("Context information:\n{info}")));
                Ok(TurnOutcome::Continue)
            }
            DetectedIntent::FinalAnswer(content) => Ok(TurnOutcome::Done {
                content,
                reasoning: choice.message.reasoning_content,
            }),
        }
    }

    async fn send(
        &self,
        request: &ChatRequest,
        deadline: Option<Instant>,
    ) -> Result<ChatResponse, OrchestratorError> {
        let result = match deadline {
            Some(deadline) => {
                match tokio::time::timeout_at(deadline, self.provider.chat(request)).await {
                    Ok(result) => result,
                    Err(_) => {
                        warn!("provider call cancelled at orchestration deadline");
                        Err(LlmError::Timeout)
                    }
                }
            }
            None => self.provider.chat(request).await,
        };
        result.map_err(OrchestratorError::Request)
    }

    /// Run calls one at a time in order; one result line per call.
    async fn execute_calls(&self, calls: Vec<ParsedToolCall>) -> Vec<String> {
        let mut lines = Vec::with_capacity(calls.len());
        for call in calls {
            let line = match call {
                ParsedToolCall::Failed { tool, error } => {
                    debug!(tool = %tool, error = %error, "tool call could not be parsed");
                    format!("Tool {tool} failed: {error}")
                }
                ParsedToolCall::Ready { id, invocation } => {
                    let name = invocation.tool_name();
                    let result = match &invocation {
                        ToolInvocation::AskUser { question } => {
                            self.context
                                .handle(&[ContextRequest::user_input(question.as_str())])
                                .await
                        }
                        other => self.tools.execute(other).await,
                    };
                    match result {
                        Ok(output) => {
                            debug!(tool = %name, call_id = %id, "tool call succeeded");
                            format!("Tool {name} result: {output}")
                        }
                        Err(error) => {
                            debug!(tool = %name, call_id = %id, error = %error, "tool call failed");
                            format!("Tool {name} failed: {error}")
                        }
                    }
                }
            };
            lines.push(line);
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use parley_types::error::ToolError;
    use parley_types::llm::{Choice, FinishReason, MessageRole, ProviderFeatures, ResponseMessage};
    use parley_types::model::ModelDetails;
    use parley_types::provider::ProviderKind;
    use parley_types::tool::ToolCall;

    use super::*;

    // -----------------------------------------------------------------------
    // Scripted collaborators
    // -----------------------------------------------------------------------

    struct ScriptedProvider {
        script: Mutex<VecDeque<Result<ChatResponse, LlmError>>>,
        /// Served once the script runs out.
        repeat: Option<ChatResponse>,
        delay: Option<Duration>,
        requests: Mutex<Vec<ChatRequest>>,
    }

    impl ScriptedProvider {
        fn new(script: Vec<Result<ChatResponse, LlmError>>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                repeat: None,
                delay: None,
                requests: Mutex::new(Vec::new()),
            }
        }

        fn repeating(response: ChatResponse) -> Self {
            Self {
                repeat: Some(response),
                ..Self::new(Vec::new())
            }
        }

        fn requests(&self) -> Vec<ChatRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl LlmProvider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        fn kind(&self) -> ProviderKind {
            ProviderKind::Ollama
        }

        fn features(&self) -> ProviderFeatures {
            ProviderFeatures {
                tools: true,
                ..ProviderFeatures::default()
            }
        }

        fn model(&self) -> &str {
            "scripted-model"
        }

        fn set_model(&mut self, _model: &str) -> Result<(), LlmError> {
            Ok(())
        }

        async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, LlmError> {
            self.requests.lock().unwrap().push(request.clone());
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            let next = self.script.lock().unwrap().pop_front();
            match next {
                Some(result) => result,
                None => self.repeat.clone().ok_or(LlmError::EmptyResponse),
            }
        }

        async fn check_connection(&self) -> Result<(), LlmError> {
            Ok(())
        }

        async fn list_models(&self) -> Result<Vec<ModelDetails>, LlmError> {
            Ok(Vec::new())
        }

        fn context_limit(&self) -> u32 {
            32_000
        }

        fn estimate_cost(&self, usage: &Usage) -> Option<f64> {
            Some(usage.total_tokens as f64 * 0.001)
        }
    }

    #[derive(Default)]
    struct RecordingExecutor {
        calls: Mutex<Vec<ToolInvocation>>,
        fail_shell: bool,
    }

    impl ToolExecutor for RecordingExecutor {
        async fn execute(&self, invocation: &ToolInvocation) -> Result<String, ToolError> {
            self.calls.lock().unwrap().push(invocation.clone());
            match invocation {
                ToolInvocation::RunShellCommand { .. } if self.fail_shell => {
                    Err(ToolError::execution("run_shell_command", "exit status 1"))
                }
                ToolInvocation::RunShellCommand { command } => Ok(format!("ran {command}")),
                ToolInvocation::ReadFile { file_path, .. } => Ok(format!("contents of {file_path}")),
                ToolInvocation::AskUser { .. } => panic!("ask_user must not reach the executor"),
            }
        }
    }

    #[derive(Default)]
    struct RecordingHandler {
        batches: Mutex<Vec<Vec<ContextRequest>>>,
        fail: bool,
    }

    impl RecordingHandler {
        fn batches(&self) -> Vec<Vec<ContextRequest>> {
            self.batches.lock().unwrap().clone()
        }
    }

    impl ContextHandler for RecordingHandler {
        async fn handle(&self, requests: &[ContextRequest]) -> Result<String, ToolError> {
            self.batches.lock().unwrap().push(requests.to_vec());
            if self.fail {
                return Err(ToolError::execution("ask_user", "no terminal attached"));
            }
            Ok("use staging".to_string())
        }
    }

    // -----------------------------------------------------------------------
    // Response builders
    // -----------------------------------------------------------------------

    fn response(message: ResponseMessage, total_tokens: u32) -> ChatResponse {
        ChatResponse {
            id: "resp".to_string(),
            model: "scripted-model".to_string(),
            choices: vec![Choice {
                index: 0,
                message,
                finish_reason: Some(FinishReason::Stop),
            }],
            usage: Usage {
                prompt_tokens: total_tokens / 2,
                completion_tokens: total_tokens - total_tokens / 2,
                total_tokens,
                estimated_cost: None,
            },
        }
    }

    fn text(content: &str) -> ChatResponse {
        response(
            ResponseMessage {
                role: MessageRole::Assistant,
                content: content.to_string(),
                reasoning_content: None,
                tool_calls: Vec::new(),
            },
            10,
        )
    }

    fn calls(calls: Vec<ToolCall>) -> ChatResponse {
        response(
            ResponseMessage {
                role: MessageRole::Assistant,
                content: String::new(),
                reasoning_content: None,
                tool_calls: calls,
            },
            10,
        )
    }

    fn initial() -> Vec<Message> {
        vec![
            Message::system("You are a helpful assistant."),
            Message::user("Deploy the app."),
        ]
    }

    fn orchestrator(
        provider: ScriptedProvider,
        config: OrchestratorConfig,
    ) -> InteractiveOrchestrator<ScriptedProvider, RecordingExecutor, RecordingHandler> {
        InteractiveOrchestrator::new(
            provider,
            RecordingExecutor::default(),
            RecordingHandler::default(),
            config,
        )
    }

    // -----------------------------------------------------------------------
    // Tests
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn plain_content_on_first_turn() {
        let orch = orchestrator(
            ScriptedProvider::new(vec![Ok(text("All done."))]),
            OrchestratorConfig::default(),
        );

        let outcome = orch.run(initial()).await.unwrap();

        assert_eq!(outcome.content, "All done.");
        assert_eq!(outcome.turns, 1);
        assert!(orch.tool_executor().calls.lock().unwrap().is_empty());
        assert!(orch.context_handler().batches().is_empty());

        let requests = orch.provider().requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].model, "scripted-model");
        assert_eq!(requests[0].tools.len(), 3);
    }

    #[tokio::test]
    async fn ask_user_then_answer() {
        let orch = orchestrator(
            ScriptedProvider::new(vec![
                Ok(calls(vec![ToolCall::new(
                    "c1",
                    "ask_user",
                    r#"{"question":"Which environment?"}"#,
                )])),
                Ok(text("Deployed to staging.")),
            ]),
            OrchestratorConfig::default(),
        );

        let outcome = orch.run(initial()).await.unwrap();

        assert_eq!(outcome.content, "Deployed to staging.");
        assert_eq!(outcome.turns, 2);
        assert_eq!(
            orch.context_handler().batches(),
            vec![vec![ContextRequest::user_input("Which environment?")]]
        );

        let requests = orch.provider().requests();
        assert_eq!(requests.len(), 2);
        let second = &requests[1].messages;
        assert_eq!(second.len(), initial().len() + 1);
        let synthetic = &second[second.len() - 1];
        assert_eq!(synthetic.role, MessageRole::System);
        assert_eq!(
            synthetic.content,
            "Tool execution results:\nTool ask_user result: use staging"
        );
    }

    #[tokio::test]
    async fn tool_call_every_turn_exhausts_budget() {
        let provider = ScriptedProvider::repeating(calls(vec![ToolCall::new(
            "c",
            "run_shell_command",
            r#"{"command":"make"}"#,
        )]));
        let orch = orchestrator(provider, OrchestratorConfig::default());

        let err = orch.run(initial()).await.unwrap_err();

        assert!(matches!(err, OrchestratorError::TurnBudgetExhausted { max_turns: 8 }));
        assert_eq!(orch.provider().requests().len(), 8);
        assert_eq!(orch.tool_executor().calls.lock().unwrap().len(), 8);
    }

    #[tokio::test]
    async fn custom_turn_budget() {
        let provider = ScriptedProvider::repeating(calls(vec![ToolCall::new(
            "c",
            "read_file",
            r#"{"file_path":"README.md"}"#,
        )]));
        let config = OrchestratorConfig {
            max_turns: 3,
            ..OrchestratorConfig::default()
        };
        let orch = orchestrator(provider, config);

        let err = orch.run(initial()).await.unwrap_err();

        assert!(matches!(err, OrchestratorError::TurnBudgetExhausted { max_turns: 3 }));
        assert_eq!(orch.provider().requests().len(), 3);
    }

    #[tokio::test]
    async fn zero_turn_budget_uses_default() {
        let orch = orchestrator(
            ScriptedProvider::new(vec![]),
            OrchestratorConfig {
                max_turns: 0,
                ..OrchestratorConfig::default()
            },
        );
        assert_eq!(orch.config().max_turns, DEFAULT_MAX_TURNS);
    }

    #[tokio::test]
    async fn tools_run_in_order_with_failures_reported() {
        let provider = ScriptedProvider::new(vec![
            Ok(calls(vec![
                ToolCall::new("a", "read_file", r#"{"file_path":"Cargo.toml"}"#),
                ToolCall::new("b", "run_shell_command", r#"{"command":"cargo test"}"#),
                ToolCall::new("c", "read_file", r#"{"wrong":"x"}"#),
            ])),
            Ok(text("done")),
        ]);
        let orch = InteractiveOrchestrator::new(
            provider,
            RecordingExecutor {
                fail_shell: true,
                ..RecordingExecutor::default()
            },
            RecordingHandler::default(),
            OrchestratorConfig::default(),
        );

        orch.run(initial()).await.unwrap();

        let executed = orch.tool_executor().calls.lock().unwrap().clone();
        assert_eq!(
            executed,
            vec![
                ToolInvocation::ReadFile {
                    file_path: "Cargo.toml".to_string(),
                    start_line: None,
                    end_line: None,
                },
                ToolInvocation::RunShellCommand {
                    command: "cargo test".to_string()
                },
            ]
        );

        let requests = orch.provider().requests();
        let summary = &requests[1].messages.last().unwrap().content;
        let lines: Vec<&str> = summary.lines().collect();
        assert_eq!(lines[0], "Tool execution results:");
        assert_eq!(lines[1], "Tool read_file result: contents of Cargo.toml");
        assert_eq!(lines[2], "Tool run_shell_command failed: exit status 1");
        assert!(lines[3].starts_with("Tool read_file failed: invalid read_file arguments"));
        assert_eq!(lines.len(), 4);
    }

    #[tokio::test]
    async fn ask_user_handler_failure_is_recoverable() {
        let provider = ScriptedProvider::new(vec![
            Ok(calls(vec![ToolCall::new("c1", "ask_user", r#"{"question":"?"}"#)])),
            Ok(text("proceeding without input")),
        ]);
        let orch = InteractiveOrchestrator::new(
            provider,
            RecordingExecutor::default(),
            RecordingHandler {
                fail: true,
                ..RecordingHandler::default()
            },
            OrchestratorConfig::default(),
        );

        let outcome = orch.run(initial()).await.unwrap();
        assert_eq!(outcome.content, "proceeding without input");

        let requests = orch.provider().requests();
        assert_eq!(
            requests[1].messages.last().unwrap().content,
            "Tool execution results:\nTool ask_user failed: no terminal attached"
        );
    }

    #[tokio::test]
    async fn legacy_context_requests_batch() {
        let payload = r#"{"context_requests":[{"type":"user_input","query":"Which region?"},{"type":"file","query":"deploy.yaml"}]}"#;
        let orch = orchestrator(
            ScriptedProvider::new(vec![Ok(text(payload)), Ok(text("ok"))]),
            OrchestratorConfig::default(),
        );

        let outcome = orch.run(initial()).await.unwrap();
        assert_eq!(outcome.content, "ok");

        let batches = orch.context_handler().batches();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].len(), 2);
        assert_eq!(batches[0][1].kind, "file");

        let last = outcome.messages.last().unwrap();
        assert_eq!(last.role, MessageRole::User);
        assert_eq!(last.content, "Context information:\nuse staging");
    }

    #[tokio::test]
    async fn legacy_context_handler_failure_is_fatal() {
        let payload = r#"{"context_requests":[{"type":"user_input","query":"?"}]}"#;
        let orch = InteractiveOrchestrator::new(
            ScriptedProvider::new(vec![Ok(text(payload))]),
            RecordingExecutor::default(),
            RecordingHandler {
                fail: true,
                ..RecordingHandler::default()
            },
            OrchestratorConfig::default(),
        );

        let err = orch.run(initial()).await.unwrap_err();
        assert!(matches!(err, OrchestratorError::ContextHandler(_)));
    }

    #[tokio::test]
    async fn request_failure_is_fatal_and_not_retried() {
        let orch = orchestrator(
            ScriptedProvider::new(vec![
                Err(LlmError::Provider {
                    message: "HTTP 500".to_string(),
                }),
                Ok(text("never reached")),
            ]),
            OrchestratorConfig::default(),
        );

        let err = orch.run(initial()).await.unwrap_err();

        assert!(matches!(err, OrchestratorError::Request(LlmError::Provider { .. })));
        assert_eq!(orch.provider().requests().len(), 1);
    }

    #[tokio::test]
    async fn empty_choices_is_request_failure() {
        let mut empty = text("");
        empty.choices.clear();
        let orch = orchestrator(
            ScriptedProvider::new(vec![Ok(empty)]),
            OrchestratorConfig::default(),
        );

        let err = orch.run(initial()).await.unwrap_err();
        assert!(matches!(err, OrchestratorError::Request(LlmError::EmptyResponse)));
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_cancels_slow_provider() {
        let mut provider = ScriptedProvider::new(vec![Ok(text("too late"))]);
        provider.delay = Some(Duration::from_secs(30));
        let orch = orchestrator(
            provider,
            OrchestratorConfig {
                timeout: Some(Duration::from_secs(5)),
                ..OrchestratorConfig::default()
            },
        );

        let err = orch.run(initial()).await.unwrap_err();
        assert!(matches!(err, OrchestratorError::Request(LlmError::Timeout)));
    }

    #[tokio::test]
    async fn usage_and_reasoning_are_reported() {
        let mut last = text("42");
        last.choices[0].message.reasoning_content = Some("thinking...".to_string());
        let orch = orchestrator(
            ScriptedProvider::new(vec![
                Ok(calls(vec![ToolCall::new("c", "read_file", r#"{"file_path":"x"}"#)])),
                Ok(last),
            ]),
            OrchestratorConfig {
                model: "override-model".to_string(),
                max_tokens: Some(2048),
                temperature: Some(0.2),
                ..OrchestratorConfig::default()
            },
        );

        let outcome = orch.run(initial()).await.unwrap();

        assert_eq!(outcome.reasoning.as_deref(), Some("thinking..."));
        assert_eq!(outcome.usage.total_tokens, 20);
        let cost = outcome.usage.estimated_cost.unwrap();
        assert!((cost - 0.02).abs() < 1e-9);

        let requests = orch.provider().requests();
        assert_eq!(requests[0].model, "override-model");
        assert_eq!(requests[0].options.max_tokens, Some(2048));
        assert_eq!(requests[0].options.temperature, Some(0.2));
    }

    #[tokio::test]
    async fn content_encoded_tool_call_is_executed() {
        let fenced = "Checking.\n```json\n{\"tool_calls\":[{\"id\":\"x\",\"type\":\"function\",\"function\":{\"name\":\"run_shell_command\",\"arguments\":\"{\\\"command\\\":\\\"ls\\\"}\"}}]}\n```";
        let orch = orchestrator(
            ScriptedProvider::new(vec![Ok(text(fenced)), Ok(text("listed"))]),
            OrchestratorConfig::default(),
        );

        let outcome = orch.run(initial()).await.unwrap();

        assert_eq!(outcome.content, "listed");
        assert_eq!(
            orch.tool_executor().calls.lock().unwrap().clone(),
            vec![ToolInvocation::RunShellCommand {
                command: "ls".to_string()
            }]
        );
    }
}
