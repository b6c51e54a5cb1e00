//! Injected side-effecting collaborators of the orchestrator.

use std::future::Future;

use parley_types::error::ToolError;
use parley_types::tool::{ContextRequest, ToolInvocation};

/// Runs `read_file` and `run_shell_command` invocations.
///
/// Never receives `ask_user`; that goes to the [`ContextHandler`].
pub trait ToolExecutor: Send + Sync {
    /// Execute one invocation and return its textual output.
    fn execute(
        &self,
        invocation: &ToolInvocation,
    ) -> impl Future<Output = Result<String, ToolError>> + Send;
}

/// Answers questions for the model: `ask_user` calls (as a single
/// `user_input` request) and legacy context-request batches.
pub trait ContextHandler: Send + Sync {
    fn handle(
        &self,
        requests: &[ContextRequest],
    ) -> impl Future<Output = Result<String, ToolError>> + Send;
}
