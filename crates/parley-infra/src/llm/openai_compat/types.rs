//! Wire types for the OpenAI-compatible chat completions API.
//!
//! Only the fields Parley reads or writes are modelled; unknown fields are
//! ignored on the way in.

use serde::{Deserialize, Serialize};

use parley_types::llm::{
    ChatResponse, Choice, FinishReason, Message, MessageRole, ResponseMessage, Usage,
};
use parley_types::tool::{ToolCall, ToolDeclaration};

/// Request body for `POST {base}/chat/completions`.
#[derive(Debug, Serialize)]
pub struct WireChatRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [Message],
    #[serde(skip_serializing_if = "no_tools")]
    pub tools: &'a [ToolDeclaration],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    pub max_tokens: u32,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning_effort: Option<&'a str>,
}

fn no_tools(tools: &&[ToolDeclaration]) -> bool {
    tools.is_empty()
}

/// Non-streaming response body.
#[derive(Debug, Deserialize)]
pub struct WireChatResponse {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub choices: Vec<WireChoice>,
    #[serde(default)]
    pub usage: Option<WireUsage>,
}

#[derive(Debug, Deserialize)]
pub struct WireChoice {
    #[serde(default)]
    pub index: u32,
    pub message: WireMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WireMessage {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    /// DeepSeek, DeepInfra, and most vLLM-style servers.
    #[serde(default)]
    pub reasoning_content: Option<String>,
    /// OpenRouter and Ollama.
    #[serde(default)]
    pub reasoning: Option<String>,
    /// Kept as raw values so one malformed entry cannot fail the whole
    /// response; see [`wire_tool_call`].
    #[serde(default)]
    pub tool_calls: Option<Vec<serde_json::Value>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct WireUsage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
    /// Some gateways report their own cost figure.
    #[serde(default, alias = "cost")]
    pub estimated_cost: Option<f64>,
}

/// Error envelope: `{"error": {"message": "..."}}`.
#[derive(Debug, Deserialize)]
pub struct WireErrorBody {
    pub error: WireErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct WireErrorDetail {
    #[serde(default)]
    pub message: String,
}

/// Response body for `GET {base}/models`.
#[derive(Debug, Deserialize)]
pub struct WireModelList {
    #[serde(default)]
    pub data: Vec<WireModel>,
}

#[derive(Debug, Deserialize)]
pub struct WireModel {
    pub id: String,
}

/// First non-blank of `reasoning_content` and `reasoning`.
fn normalize_reasoning(reasoning_content: Option<String>, reasoning: Option<String>) -> Option<String> {
    reasoning_content
        .into_iter()
        .chain(reasoning)
        .find(|r| !r.trim().is_empty())
}

/// Convert one raw `tool_calls` entry. An entry with no function object
/// still becomes a call with an empty name, so the orchestrator reports it
/// back to the model instead of dropping it.
fn wire_tool_call(entry: serde_json::Value) -> ToolCall {
    ToolCall::from_json(&entry).unwrap_or_else(|| {
        let id = entry
            .get("id")
            .and_then(|id| id.as_str())
            .unwrap_or_default()
            .to_string();
        ToolCall::new(id, "", entry.to_string())
    })
}

impl WireMessage {
    fn into_response_message(self) -> ResponseMessage {
        let role = self
            .role
            .as_deref()
            .and_then(|r| r.parse().ok())
            .unwrap_or(MessageRole::Assistant);
        ResponseMessage {
            role,
            content: self.content.unwrap_or_default(),
            reasoning_content: normalize_reasoning(self.reasoning_content, self.reasoning),
            tool_calls: self
                .tool_calls
                .unwrap_or_default()
                .into_iter()
                .map(wire_tool_call)
                .collect(),
        }
    }
}

impl WireChatResponse {
    /// Convert into the provider-agnostic shape. `estimated_cost` is left
    /// as reported; the adapter fills it from registry pricing.
    pub fn into_chat_response(self) -> ChatResponse {
        let choices = self
            .choices
            .into_iter()
            .map(|c| Choice {
                index: c.index,
                message: c.message.into_response_message(),
                finish_reason: c.finish_reason.as_deref().and_then(|r| r.parse::<FinishReason>().ok()),
            })
            .collect();

        let usage = self
            .usage
            .map(|u| Usage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: if u.total_tokens == 0 {
                    u.prompt_tokens + u.completion_tokens
                } else {
                    u.total_tokens
                },
                estimated_cost: u.estimated_cost,
            })
            .unwrap_or_default();

        ChatResponse {
            id: self.id,
            model: self.model,
            choices,
            usage,
        }
    }
}
