//! Host-native execution of the `read_file` and `run_shell_command` tools.
//!
//! Shell commands run through `sh -c` with a timeout. When confirmation is
//! enabled every command is shown to the user before it is spawned.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use console::style;
use dialoguer::Confirm;
use parley_core::orchestrator::collaborators::ToolExecutor;
use parley_types::error::ToolError;
use parley_types::tool::{ToolInvocation, ToolName};
use tokio::io::AsyncReadExt;

/// Whole-file reads stop after this many bytes. Line-range reads are not capped.
pub const MAX_READ_BYTES: u64 = 100 * 1024;

/// Error message for a shell command the user refused to run.
pub const COMMAND_DECLINED: &str = "command declined by user";

/// Timeout for a single shell command (60 seconds).
const SHELL_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct LocalToolExecutor {
    confirm_commands: bool,
    announce: bool,
    shell_timeout: Duration,
}

impl LocalToolExecutor {
    pub fn new() -> Self {
        Self {
            confirm_commands: true,
            announce: true,
            shell_timeout: Duration::from_secs(SHELL_TIMEOUT_SECS),
        }
    }

    /// Ask before spawning each shell command.
    pub fn with_confirmation(mut self, confirm: bool) -> Self {
        self.confirm_commands = confirm;
        self
    }

    /// Print a one-line notice to stderr for every tool run.
    pub fn with_announcements(mut self, announce: bool) -> Self {
        self.announce = announce;
        self
    }

    pub fn with_shell_timeout(mut self, timeout: Duration) -> Self {
        self.shell_timeout = timeout;
        self
    }

    fn announce(&self, action: &str, target: &str) {
        if self.announce {
            eprintln!("  {} {} {}", style(">").cyan().bold(), action, style(target).dim());
        }
    }

    async fn confirm(&self, command: &str) -> Result<(), ToolError> {
        if !self.confirm_commands {
            return Ok(());
        }

        let prompt = format!("Run `{command}`?");
        let approved = tokio::task::spawn_blocking(move || {
            Confirm::new().with_prompt(prompt).default(false).interact()
        })
        .await
        .map_err(|e| shell_error(format!("confirmation prompt panicked: {e}")))?
        .map_err(|e| shell_error(format!("cannot confirm command: {e}")))?;

        if approved {
            Ok(())
        } else {
            Err(shell_error(COMMAND_DECLINED))
        }
    }

    async fn run_shell_command(&self, command: &str) -> Result<String, ToolError> {
        if command.trim().is_empty() {
            return Err(shell_error("empty command"));
        }
        self.announce("running", command);
        self.confirm(command).await?;

        let child = tokio::process::Command::new("sh")
            .arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| shell_error(format!("failed to spawn shell: {e}")))?;

        let output = tokio::time::timeout(self.shell_timeout, child.wait_with_output())
            .await
            .map_err(|_| {
                shell_error(format!(
                    "command timed out after {}s",
                    self.shell_timeout.as_secs()
                ))
            })?
            .map_err(|e| shell_error(format!("failed to run command: {e}")))?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        tracing::debug!(command, status = %output.status, bytes = combined.len(), "shell command finished");

        if !output.status.success() {
            return Err(shell_error(format!(
                "command failed: {}\nOutput: {combined}",
                output.status
            )));
        }
        Ok(combined)
    }
}

impl Default for LocalToolExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolExecutor for LocalToolExecutor {
    async fn execute(&self, invocation: &ToolInvocation) -> Result<String, ToolError> {
        match invocation {
            ToolInvocation::ReadFile {
                file_path,
                start_line,
                end_line,
            } => {
                self.announce("reading", file_path);
                read_file(file_path, *start_line, *end_line).await
            }
            ToolInvocation::RunShellCommand { command } => self.run_shell_command(command).await,
            ToolInvocation::AskUser { .. } => Err(ToolError::execution(
                ToolName::AskUser.as_str(),
                "ask_user is answered by the context handler",
            )),
        }
    }
}

fn read_error(message: impl Into<String>) -> ToolError {
    ToolError::execution(ToolName::ReadFile.as_str(), message)
}

fn shell_error(message: impl Into<String>) -> ToolError {
    ToolError::execution(ToolName::RunShellCommand.as_str(), message)
}

/// Read a text file, optionally restricted to a 1-based inclusive line range.
///
/// A zero or missing bound means "from the first line" / "to the last line".
/// Whole-file reads of files over [`MAX_READ_BYTES`] return the first
/// 100KB followed by a truncation note.
pub async fn read_file(
    file_path: &str,
    start_line: Option<u32>,
    end_line: Option<u32>,
) -> Result<String, ToolError> {
    if file_path.trim().is_empty() {
        return Err(read_error("empty file path provided"));
    }
    let path = Path::new(file_path);

    let metadata = tokio::fs::metadata(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            read_error(format!("file does not exist: {}", path.display()))
        } else {
            read_error(format!("failed to access file {}: {e}", path.display()))
        }
    })?;
    if metadata.is_dir() {
        return Err(read_error(format!(
            "path is a directory, not a file: {}",
            path.display()
        )));
    }

    let start = start_line.unwrap_or(0);
    let end = end_line.unwrap_or(0);
    let ranged = start > 0 || end > 0;
    let truncated = !ranged && metadata.len() > MAX_READ_BYTES;

    let bytes = if truncated {
        let file = tokio::fs::File::open(path)
            .await
            .map_err(|e| read_error(format!("failed to open file {}: {e}", path.display())))?;
        let mut buf = Vec::with_capacity(MAX_READ_BYTES as usize);
        file.take(MAX_READ_BYTES)
            .read_to_end(&mut buf)
            .await
            .map_err(|e| read_error(format!("failed to read file {}: {e}", path.display())))?;
        buf
    } else {
        tokio::fs::read(path)
            .await
            .map_err(|e| read_error(format!("failed to read file {}: {e}", path.display())))?
    };

    let text = decode_text(&bytes, truncated).ok_or_else(|| {
        read_error(format!(
            "only text content files can be read. {} appears to contain binary/non-text content",
            path.display()
        ))
    })?;

    if ranged {
        return select_lines(text, start, end, path);
    }

    if truncated {
        return Ok(format!(
            "File truncated (>100KB). Showing first {}KB of {}:\n{text}\n\n[Content truncated - file is {} bytes total]",
            MAX_READ_BYTES / 1024,
            path.display(),
            metadata.len()
        ));
    }
    Ok(text.to_string())
}

/// Decode `bytes` as UTF-8 text. A multi-byte character cut off by
/// truncation is dropped; NUL bytes mark the content as binary.
fn decode_text(bytes: &[u8], truncated: bool) -> Option<&str> {
    if bytes.contains(&0) {
        return None;
    }
    match std::str::from_utf8(bytes) {
        Ok(text) => Some(text),
        Err(e) if truncated && e.error_len().is_none() => {
            std::str::from_utf8(&bytes[..e.valid_up_to()]).ok()
        }
        Err(_) => None,
    }
}

fn select_lines(text: &str, start: u32, end: u32, path: &Path) -> Result<String, ToolError> {
    let lines: Vec<&str> = text.split('\n').collect();
    let total = lines.len();

    let start = (start as usize).max(1);
    let end = match end as usize {
        0 => total,
        e if e > total => total,
        e => e,
    };

    if start > total {
        return Err(read_error(format!(
            "start line {start} exceeds file length {total}"
        )));
    }
    if start > end {
        return Err(read_error(format!(
            "start line {start} is greater than end line {end}"
        )));
    }

    Ok(format!(
        "Lines {start}-{end} of {}:\n{}",
        path.display(),
        lines[start - 1..end].join("\n")
    ))
}
