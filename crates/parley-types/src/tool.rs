//! Tool declarations, tool calls, and legacy context requests.
//!
//! Parley declares a fixed set of three tools to every backend. A model
//! invokes them either through the structured `tool_calls` field or, for
//! older prompts, through a free-text `context_requests` JSON payload.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ToolError;

/// A tool the model may call, in OpenAI function-calling shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDeclaration {
    #[serde(rename = "type")]
    pub kind: String,
    pub function: FunctionDeclaration,
}

/// Name, description, and JSON-Schema parameters of a declared tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDeclaration {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// A model-issued request to invoke a declared tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub id: String,
    #[serde(rename = "type", default = "default_call_kind", deserialize_with = "null_as_function")]
    pub kind: String,
    pub function: FunctionCall,
}

fn default_call_kind() -> String {
    "function".to_string()
}

/// Function name plus raw JSON argument text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    /// Raw JSON text. Some backends send an object instead of a string;
    /// both are accepted and stored as text.
    #[serde(default, deserialize_with = "arguments_as_text")]
    pub arguments: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_function<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_call_kind))
}

fn arguments_as_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    })
}

impl ToolCall {
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: default_call_kind(),
            function: FunctionCall {
                name: name.into(),
                arguments: arguments.into(),
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.function.name
    }

    /// Tolerant conversion of one `tool_calls` entry.
    ///
    /// Accepts a `null` or missing id and type, arguments as text or as an
    /// object, `parameters` in place of `arguments`, and the variant that
    /// nests `{name, arguments}` under `arguments` instead of `function`.
    /// Returns `None` when the entry has no function object at all. A
    /// function without a name yields an empty name.
    pub fn from_json(entry: &serde_json::Value) -> Option<ToolCall> {
        let function = entry
            .get("function")
            .filter(|f| f.is_object())
            .or_else(|| entry.get("arguments").filter(|a| a.is_object()))?;

        let text = |value: Option<&serde_json::Value>| match value {
            Some(serde_json::Value::String(s)) => s.clone(),
            _ => String::new(),
        };
        let arguments = match function.get("arguments").or_else(|| function.get("parameters")) {
            Some(serde_json::Value::String(s)) => s.clone(),
            None | Some(serde_json::Value::Null) => "{}".to_string(),
            Some(other) => other.to_string(),
        };
        let kind = match text(entry.get("type")) {
            k if k.is_empty() => default_call_kind(),
            k => k,
        };

        Some(ToolCall {
            id: text(entry.get("id")),
            kind,
            function: FunctionCall {
                name: text(function.get("name")),
                arguments,
            },
        })
    }
}

/// The fixed tool set Parley declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolName {
    AskUser,
    ReadFile,
    RunShellCommand,
}

impl ToolName {
    pub const ALL: [ToolName; 3] = [ToolName::AskUser, ToolName::ReadFile, ToolName::RunShellCommand];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolName::AskUser => "ask_user",
            ToolName::ReadFile => "read_file",
            ToolName::RunShellCommand => "run_shell_command",
        }
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolName {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ask_user" => Ok(ToolName::AskUser),
            "read_file" => Ok(ToolName::ReadFile),
            "run_shell_command" => Ok(ToolName::RunShellCommand),
            other => Err(ToolError::UnknownTool(other.to_string())),
        }
    }
}

/// A tool call with its arguments decoded into typed fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolInvocation {
    AskUser {
        question: String,
    },
    ReadFile {
        file_path: String,
        start_line: Option<u32>,
        end_line: Option<u32>,
    },
    RunShellCommand {
        command: String,
    },
}

#[derive(Deserialize)]
struct AskUserArgs {
    question: String,
}

#[derive(Deserialize)]
struct ReadFileArgs {
    file_path: String,
    #[serde(default)]
    start_line: Option<u32>,
    #[serde(default)]
    end_line: Option<u32>,
}

#[derive(Deserialize)]
struct RunShellCommandArgs {
    command: String,
}

impl ToolInvocation {
    pub fn tool_name(&self) -> ToolName {
        match self {
            ToolInvocation::AskUser { .. } => ToolName::AskUser,
            ToolInvocation::ReadFile { .. } => ToolName::ReadFile,
            ToolInvocation::RunShellCommand { .. } => ToolName::RunShellCommand,
        }
    }
}

impl TryFrom<&ToolCall> for ToolInvocation {
    type Error = ToolError;

    fn try_from(call: &ToolCall) -> Result<Self, Self::Error> {
        let name: ToolName = call.name().parse()?;
        let raw = if call.function.arguments.trim().is_empty() {
            "{}"
        } else {
            call.function.arguments.as_str()
        };
        let parse_err = |e: serde_json::Error| ToolError::parse(name.as_str(), e.to_string());

        Ok(match name {
            ToolName::AskUser => {
                let args: AskUserArgs = serde_json::from_str(raw).map_err(parse_err)?;
                ToolInvocation::AskUser {
                    question: args.question,
                }
            }
            ToolName::ReadFile => {
                let args: ReadFileArgs = serde_json::from_str(raw).map_err(parse_err)?;
                ToolInvocation::ReadFile {
                    file_path: args.file_path,
                    start_line: args.start_line,
                    end_line: args.end_line,
                }
            }
            ToolName::RunShellCommand => {
                let args: RunShellCommandArgs = serde_json::from_str(raw).map_err(parse_err)?;
                ToolInvocation::RunShellCommand {
                    command: args.command,
                }
            }
        })
    }
}

/// Legacy free-text request for information, e.g. `{"type":"user_input","query":"..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextRequest {
    #[serde(rename = "type")]
    pub kind: String,
    pub query: String,
}

impl ContextRequest {
    /// Context request kind used when `ask_user` is routed to the context handler.
    pub const USER_INPUT: &'static str = "user_input";
    /// Question kind used by older prompts.
    pub const USER_PROMPT: &'static str = "user_prompt";
    /// `query` is a file path to read.
    pub const FILE: &'static str = "file";
    /// `query` is a shell command to run.
    pub const SHELL: &'static str = "shell";
    pub const SEARCH: &'static str = "search";

    pub fn user_input(query: impl Into<String>) -> Self {
        Self {
            kind: Self::USER_INPUT.to_string(),
            query: query.into(),
        }
    }

    /// Whether this request is a question for the user.
    pub fn is_question(&self) -> bool {
        matches!(self.kind.as_str(), Self::USER_INPUT | Self::USER_PROMPT)
    }
}
