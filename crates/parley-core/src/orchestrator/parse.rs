//! Turn-intent detection: tool calls, legacy context requests, or a final
//! answer.
//!
//! Tool calls are recognised by an ordered chain of stages. Each stage is
//! total and the first one that yields calls wins:
//!
//! 1. structured: the native `tool_calls` field, else the whole content
//!    decoded as `{"tool_calls": [...]}`
//! 2. embedded: each top-level object in the content decoded the same
//!    way, else the bracket-matched `"tool_calls"` array wrapped back
//!    into an envelope
//! 3. fenced: the first ```` ```json ```` block decoded the same way
//! 4. keyword: a *quoted* tool name (`"ask_user"`) in the content, with
//!    its arguments recovered when they can be located
//!
//! Every decoding stage accepts `parameters` in place of `arguments` and
//! the variant that nests the function under `arguments`.
//!
//! Legacy `{"context_requests": [...]}` payloads are checked after the
//! strict stages and before the keyword stage, so a well-formed payload is
//! never reinterpreted by the heuristic.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use uuid::Uuid;

use parley_types::error::ToolError;
use parley_types::llm::ResponseMessage;
use parley_types::tool::{ContextRequest, ToolCall, ToolInvocation, ToolName};

/// What the model asked for on one turn.
#[derive(Debug, Clone, PartialEq)]
pub enum DetectedIntent {
    ToolCalls(Vec<ParsedToolCall>),
    ContextRequests(Vec<ContextRequest>),
    FinalAnswer(String),
}

/// A detected tool call, either ready to run or already known to be broken.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedToolCall {
    Ready {
        id: String,
        invocation: ToolInvocation,
    },
    Failed {
        tool: String,
        error: ToolError,
    },
}

/// Tool label used when a call carries no function name.
const UNNAMED_TOOL: &str = "unknown";

impl ParsedToolCall {
    pub fn from_call(call: &ToolCall) -> Self {
        if call.name().trim().is_empty() {
            return ParsedToolCall::Failed {
                tool: UNNAMED_TOOL.to_string(),
                error: ToolError::parse(UNNAMED_TOOL, "tool call has no function name"),
            };
        }
        match ToolInvocation::try_from(call) {
            Ok(invocation) => ParsedToolCall::Ready {
                id: if call.id.is_empty() {
                    synthetic_call_id()
                } else {
                    call.id.clone()
                },
                invocation,
            },
            Err(error) => ParsedToolCall::Failed {
                tool: call.name().to_string(),
                error,
            },
        }
    }

    pub fn tool(&self) -> &str {
        match self {
            ParsedToolCall::Ready { invocation, .. } => invocation.tool_name().as_str(),
            ParsedToolCall::Failed { tool, .. } => tool,
        }
    }
}

fn synthetic_call_id() -> String {
    format!("call_{}", Uuid::now_v7().simple())
}

#[derive(Deserialize)]
struct ContextEnvelope {
    context_requests: Vec<ContextRequest>,
}

/// Classify one response message.
pub fn detect_intent(message: &ResponseMessage) -> DetectedIntent {
    if !message.tool_calls.is_empty() {
        tracing::debug!(count = message.tool_calls.len(), "native tool calls");
        return DetectedIntent::ToolCalls(message.tool_calls.iter().map(ParsedToolCall::from_call).collect());
    }

    let content = message.content.as_str();

    if let Some(calls) = structured_tool_calls(content)
        .or_else(|| embedded_tool_calls(content))
        .or_else(|| fenced_tool_calls(content))
    {
        return DetectedIntent::ToolCalls(calls);
    }

    if let Some(requests) = context_requests(content) {
        tracing::debug!(count = requests.len(), "legacy context requests");
        return DetectedIntent::ContextRequests(requests);
    }

    if let Some(calls) = keyword_tool_calls(content) {
        return DetectedIntent::ToolCalls(calls);
    }

    DetectedIntent::FinalAnswer(message.content.clone())
}

/// Stage 1: the whole content is a `{"tool_calls": [...]}` document.
pub fn structured_tool_calls(content: &str) -> Option<Vec<ParsedToolCall>> {
    decode_tool_calls(content).inspect(|calls| {
        tracing::debug!(count = calls.len(), "tool calls decoded from content");
    })
}

/// Stage 2: `{"tool_calls": [...]}` surrounded by prose or repeated.
///
/// Every top-level object in the content is tried and the calls of all
/// that decode are concatenated. When none do, the array following the
/// first `"tool_calls"` key is cut out by bracket matching and decoded on
/// its own, which recovers calls whose enclosing object is unbalanced.
pub fn embedded_tool_calls(content: &str) -> Option<Vec<ParsedToolCall>> {
    if !content.contains("\"tool_calls\"") {
        return None;
    }

    let calls: Vec<ParsedToolCall> = split_top_level_objects(content)
        .into_iter()
        .filter_map(decode_tool_calls)
        .flatten()
        .collect();
    let calls = if calls.is_empty() {
        let array = tool_calls_array(content)?;
        decode_tool_calls(&format!("{{\"tool_calls\":{array}}}"))?
    } else {
        calls
    };

    tracing::debug!(count = calls.len(), "tool calls decoded from embedded JSON");
    Some(calls)
}

/// Stage 3: the first ```` ```json ```` block is a `{"tool_calls": [...]}` document.
pub fn fenced_tool_calls(content: &str) -> Option<Vec<ParsedToolCall>> {
    decode_tool_calls(fenced_json(content)?).inspect(|calls| {
        tracing::debug!(count = calls.len(), "tool calls decoded from fenced block");
    })
}

fn decode_tool_calls(text: &str) -> Option<Vec<ParsedToolCall>> {
    let document: Value = serde_json::from_str(text).ok()?;
    let entries = document.get("tool_calls")?.as_array()?;
    if entries.is_empty() {
        return None;
    }
    let calls = entries
        .iter()
        .map(|entry| match ToolCall::from_json(entry) {
            Some(call) => ParsedToolCall::from_call(&call),
            None => ParsedToolCall::Failed {
                tool: UNNAMED_TOOL.to_string(),
                error: ToolError::parse(UNNAMED_TOOL, "tool call has no function object"),
            },
        })
        .collect();
    Some(calls)
}

/// The balanced top-level `{...}` objects in `content`, in order.
///
/// Braces inside JSON strings are ignored. An object left open at the end
/// of the content is dropped.
fn split_top_level_objects(content: &str) -> Vec<&str> {
    let mut objects = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    let mut in_string = false;
    let mut escaped = false;

    for (i, byte) in content.bytes().enumerate() {
        if in_string {
            match byte {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match byte {
            b'"' if depth > 0 => in_string = true,
            b'{' => {
                if depth == 0 {
                    start = i;
                }
                depth += 1;
            }
            b'}' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    objects.push(&content[start..=i]);
                }
            }
            _ => {}
        }
    }
    objects
}

/// The bracket-matched array value of the first `"tool_calls"` key.
fn tool_calls_array(content: &str) -> Option<&str> {
    const KEY: &str = "\"tool_calls\"";
    let after_key = content.find(KEY)? + KEY.len();
    let rest = content[after_key..].trim_start().strip_prefix(':')?.trim_start();
    if !rest.starts_with('[') {
        return None;
    }

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (i, byte) in rest.bytes().enumerate() {
        if in_string {
            match byte {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match byte {
            b'"' => in_string = true,
            b'[' => depth += 1,
            b']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&rest[..=i]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Legacy `{"context_requests": [...]}`, bare or fenced.
pub fn context_requests(content: &str) -> Option<Vec<ContextRequest>> {
    if !content.contains("context_requests") {
        return None;
    }
    let decode = |text: &str| {
        serde_json::from_str::<ContextEnvelope>(text)
            .ok()
            .map(|e| e.context_requests)
            .filter(|r| !r.is_empty())
    };
    decode(content).or_else(|| fenced_json(content).and_then(decode))
}

/// Stage 4: quoted tool-name mentions.
///
/// Every occurrence of a quoted name counts, in order of appearance. The
/// arguments of a mention are looked up between it and the next mention,
/// so they are expected to follow the name. A lone mention falls back to
/// the whole content. Repeated mentions that recover the same invocation
/// collapse into one call.
///
/// A mentioned `"run_shell_command"` is never reconstructed from prose and
/// always becomes a parse failure line.
pub fn keyword_tool_calls(content: &str) -> Option<Vec<ParsedToolCall>> {
    let mut mentions: Vec<(usize, ToolName)> = ToolName::ALL
        .into_iter()
        .flat_map(|name| {
            let quoted = format!("\"{name}\"");
            content
                .match_indices(&quoted)
                .map(|(pos, _)| (pos, name))
                .collect::<Vec<_>>()
        })
        .collect();
    if mentions.is_empty() {
        return None;
    }
    mentions.sort_by_key(|(pos, _)| *pos);

    let lone = mentions.len() == 1;
    let mut calls: Vec<ParsedToolCall> = Vec::with_capacity(mentions.len());
    for (i, &(pos, name)) in mentions.iter().enumerate() {
        let end = mentions.get(i + 1).map_or(content.len(), |(next, _)| *next);
        let recovered = recover_invocation(name, &content[pos..end])
            .or_else(|| if lone { recover_invocation(name, content) } else { None });
        let call = match recovered {
            Some(invocation) => ParsedToolCall::Ready {
                id: synthetic_call_id(),
                invocation,
            },
            None => ParsedToolCall::Failed {
                tool: name.to_string(),
                error: ToolError::parse(name.as_str(), "tool was mentioned but its arguments could not be recovered"),
            },
        };
        if !calls.iter().any(|seen| same_call(seen, &call)) {
            calls.push(call);
        }
    }

    tracing::debug!(count = calls.len(), "tool calls recovered from keywords");
    Some(calls)
}

fn recover_invocation(name: ToolName, text: &str) -> Option<ToolInvocation> {
    match name {
        ToolName::AskUser => string_field(text, "question").map(|question| ToolInvocation::AskUser { question }),
        ToolName::ReadFile => string_field(text, "file_path").map(|file_path| ToolInvocation::ReadFile {
            file_path,
            start_line: u32_field(text, "start_line"),
            end_line: u32_field(text, "end_line"),
        }),
        ToolName::RunShellCommand => None,
    }
}

/// Equal invocations, or failures of the same tool; synthetic ids differ.
fn same_call(a: &ParsedToolCall, b: &ParsedToolCall) -> bool {
    match (a, b) {
        (ParsedToolCall::Ready { invocation: x, .. }, ParsedToolCall::Ready { invocation: y, .. }) => x == y,
        (ParsedToolCall::Failed { tool: x, .. }, ParsedToolCall::Failed { tool: y, .. }) => x == y,
        _ => false,
    }
}

/// Contents of the first ```` ```json ```` fence, trimmed.
fn fenced_json(content: &str) -> Option<&str> {
    const FENCE: &str = "```json";
    let start = content.find(FENCE)? + FENCE.len();
    let len = content[start..].find("```")?;
    Some(content[start..start + len].trim())
}

/// The first non-blank JSON string value following `"key":` in `content`.
fn string_field(content: &str, key: &str) -> Option<String> {
    json_fields::<String>(content, key)
        .into_iter()
        .find(|text| !text.trim().is_empty())
}

/// The first unsigned integer value following `"key":` in `content`.
fn u32_field(content: &str, key: &str) -> Option<u32> {
    json_fields::<u32>(content, key).into_iter().next()
}

/// Every value of type `T` that directly follows a `"key":` occurrence.
fn json_fields<T: DeserializeOwned>(content: &str, key: &str) -> Vec<T> {
    let quoted = format!("\"{key}\"");
    content
        .match_indices(&quoted)
        .filter_map(|(pos, _)| {
            let value = content[pos + quoted.len()..].trim_start().strip_prefix(':')?;
            serde_json::Deserializer::from_str(value.trim_start())
                .into_iter::<T>()
                .next()?
                .ok()
        })
        .collect()
}
