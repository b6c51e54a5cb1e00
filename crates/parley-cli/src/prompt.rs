//! Terminal answers for `ask_user` and legacy context requests.
//!
//! Questions are prompted on stderr. Legacy `file` and `shell` requests go
//! through the same [`ToolExecutor`] the model's tool calls use, so shell
//! commands are confirmed the same way.

use console::style;
use dialoguer::Input;
use parley_core::orchestrator::collaborators::{ContextHandler, ToolExecutor};
use parley_types::error::ToolError;
use parley_types::tool::{ContextRequest, ToolInvocation, ToolName};

use crate::tools::{COMMAND_DECLINED, LocalToolExecutor};

const CONTEXT_REQUEST: &str = "context_request";

const KNOWN_KINDS: [&str; 5] = [
    ContextRequest::USER_INPUT,
    ContextRequest::USER_PROMPT,
    ContextRequest::FILE,
    ContextRequest::SHELL,
    ContextRequest::SEARCH,
];

/// Answers questions on the terminal and legacy `file`/`shell` requests
/// through `T`.
#[derive(Debug, Clone)]
pub struct TerminalContextHandler<T = LocalToolExecutor> {
    tools: T,
}

impl<T> TerminalContextHandler<T> {
    pub fn new(tools: T) -> Self {
        Self { tools }
    }
}

fn prompt_error(message: impl Into<String>) -> ToolError {
    ToolError::execution(ToolName::AskUser.as_str(), message)
}

/// Prompt for one answer. Fails without an attended terminal.
async fn ask(question: &str) -> Result<String, ToolError> {
    if !console::user_attended_stderr() {
        return Err(prompt_error("no interactive terminal to answer the question"));
    }

    eprintln!();
    eprintln!("  {} {}", style("?").yellow().bold(), style(question).bold());
    tokio::task::spawn_blocking(|| {
        Input::<String>::new()
            .with_prompt("Your answer")
            .allow_empty(true)
            .interact_text()
    })
    .await
    .map_err(|e| prompt_error(format!("prompt panicked: {e}")))?
    .map_err(|e| prompt_error(format!("failed to read answer: {e}")))
}

impl<T: ToolExecutor> TerminalContextHandler<T> {
    async fn respond(&self, request: &ContextRequest) -> Result<String, ToolError> {
        let query = request.query.as_str();
        match request.kind.as_str() {
            ContextRequest::USER_INPUT | ContextRequest::USER_PROMPT => {
                let answer = ask(query).await?;
                Ok(format!("The user responded: {answer}"))
            }
            ContextRequest::FILE => {
                let invocation = ToolInvocation::ReadFile {
                    file_path: query.to_string(),
                    start_line: None,
                    end_line: None,
                };
                let content = self.tools.execute(&invocation).await?;
                Ok(format!("Here is the content of the file `{query}`:\n\n{content}"))
            }
            ContextRequest::SHELL => {
                let invocation = ToolInvocation::RunShellCommand {
                    command: query.to_string(),
                };
                Ok(match self.tools.execute(&invocation).await {
                    Ok(output) => {
                        format!("The shell command `{query}` produced the following output:\n\n{output}")
                    }
                    Err(ToolError::Execution { message, .. }) if message == COMMAND_DECLINED => {
                        "User denied execution of shell command.".to_string()
                    }
                    Err(e) => format!("Shell command failed with error: {e}"),
                })
            }
            ContextRequest::SEARCH => Ok("Web search is not yet implemented.".to_string()),
            other => Err(unknown_kind(other)),
        }
    }
}

fn unknown_kind(kind: &str) -> ToolError {
    ToolError::execution(CONTEXT_REQUEST, format!("unknown context request type: {kind}"))
}

impl<T: ToolExecutor> ContextHandler for TerminalContextHandler<T> {
    /// A lone question (how `ask_user` arrives) yields the bare answer.
    /// Otherwise each request is answered in order and the responses are
    /// joined line by line. Unknown request types fail the whole batch
    /// before anything runs.
    async fn handle(&self, requests: &[ContextRequest]) -> Result<String, ToolError> {
        if let [request] = requests
            && request.is_question()
        {
            return ask(&request.query).await;
        }

        if let Some(unknown) = requests
            .iter()
            .find(|r| !KNOWN_KINDS.contains(&r.kind.as_str()))
        {
            return Err(unknown_kind(&unknown.kind));
        }

        let mut responses = Vec::with_capacity(requests.len());
        for request in requests {
            tracing::debug!(kind = %request.kind, "answering context request");
            responses.push(self.respond(request).await?);
        }
        Ok(responses.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    /// Records invocations; shell commands fail unless they are `echo ok`.
    #[derive(Default)]
    struct FakeTools {
        seen: Mutex<Vec<ToolInvocation>>,
    }

    impl ToolExecutor for FakeTools {
        async fn execute(&self, invocation: &ToolInvocation) -> Result<String, ToolError> {
            self.seen.lock().unwrap().push(invocation.clone());
            match invocation {
                ToolInvocation::ReadFile { file_path, .. } if file_path == "missing.txt" => {
                    Err(ToolError::execution("read_file", "file does not exist"))
                }
                ToolInvocation::ReadFile { .. } => Ok("line one\nline two".to_string()),
                ToolInvocation::RunShellCommand { command } if command == "echo ok" => Ok("ok".to_string()),
                ToolInvocation::RunShellCommand { command } if command == "rm -rf /" => {
                    Err(ToolError::execution("run_shell_command", COMMAND_DECLINED))
                }
                _ => Err(ToolError::execution("run_shell_command", "command failed: exit status: 1")),
            }
        }
    }

    fn request(kind: &str, query: &str) -> ContextRequest {
        ContextRequest {
            kind: kind.to_string(),
            query: query.to_string(),
        }
    }

    #[tokio::test]
    async fn test_empty_batch_needs_no_terminal() {
        let handler = TerminalContextHandler::new(FakeTools::default());
        let out = handler.handle(&[]).await.unwrap();
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_file_request_reads_through_tools() {
        let handler = TerminalContextHandler::new(FakeTools::default());
        let out = handler.handle(&[request("file", "notes.txt")]).await.unwrap();
        assert_eq!(out, "Here is the content of the file `notes.txt`:\n\nline one\nline two");
        assert_eq!(
            *handler.tools.seen.lock().unwrap(),
            vec![ToolInvocation::ReadFile {
                file_path: "notes.txt".to_string(),
                start_line: None,
                end_line: None,
            }]
        );
    }

    #[tokio::test]
    async fn test_unreadable_file_fails_the_batch() {
        let handler = TerminalContextHandler::new(FakeTools::default());
        let err = handler.handle(&[request("file", "missing.txt")]).await.unwrap_err();
        assert!(err.to_string().contains("file does not exist"));
    }

    #[tokio::test]
    async fn test_shell_request_outcomes_are_reported_inline() {
        let handler = TerminalContextHandler::new(FakeTools::default());
        let out = handler
            .handle(&[
                request("shell", "echo ok"),
                request("shell", "rm -rf /"),
                request("shell", "false"),
            ])
            .await
            .unwrap();
        let lines: Vec<&str> = out.split('\n').collect();
        assert_eq!(
            lines,
            vec![
                "The shell command `echo ok` produced the following output:",
                "",
                "ok",
                "User denied execution of shell command.",
                "Shell command failed with error: command failed: exit status: 1",
            ]
        );
        assert_eq!(handler.tools.seen.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_search_request_is_not_implemented() {
        let handler = TerminalContextHandler::new(FakeTools::default());
        let out = handler.handle(&[request("search", "rust 2024 edition")]).await.unwrap();
        assert_eq!(out, "Web search is not yet implemented.");
    }

    #[tokio::test]
    async fn test_unknown_kind_fails_before_running_anything() {
        let handler = TerminalContextHandler::new(FakeTools::default());
        let err = handler
            .handle(&[request("shell", "echo ok"), request("database", "SELECT 1")])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ToolError::Execution { ref tool, ref message }
                if tool == "context_request" && message == "unknown context request type: database"
        ));
        assert!(handler.tools.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_file_request_with_local_tools() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "max_turns = 8\n").unwrap();
        let query = path.to_string_lossy().to_string();

        let handler = TerminalContextHandler::new(LocalToolExecutor::new().with_announcements(false));
        let out = handler.handle(&[request("file", &query)]).await.unwrap();
        assert!(out.starts_with(&format!("Here is the content of the file `{query}`:")));
        assert!(out.contains("max_turns = 8"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_shell_request_with_local_tools() {
        let tools = LocalToolExecutor::new()
            .with_confirmation(false)
            .with_announcements(false);
        let handler = TerminalContextHandler::new(tools);
        let out = handler.handle(&[request("shell", "echo parley")]).await.unwrap();
        assert!(out.starts_with("The shell command `echo parley` produced the following output:"));
        assert!(out.contains("parley"));
    }
}
