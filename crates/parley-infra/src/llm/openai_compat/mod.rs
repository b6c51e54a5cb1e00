//! OpenAI-compatible LLM provider implementation.
//!
//! A single [`OpenAiCompatibleProvider`] serves every [`ProviderKind`]:
//! OpenAI, OpenRouter, DeepInfra, Cerebras, Groq, DeepSeek, and a local
//! Ollama server all accept the same `/chat/completions` request shape.
//!
//! The API key is wrapped in [`secrecy::SecretString`] and is only exposed
//! when building the `Authorization` header.

pub mod config;
pub mod types;

use std::sync::Arc;

use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};

use parley_core::llm::model_cache::ModelListCache;
use parley_core::llm::pricing;
use parley_core::llm::provider::LlmProvider;
use parley_core::llm::registry::ModelRegistry;
use parley_types::llm::{ChatRequest, ChatResponse, LlmError, Message, ProviderFeatures, RequestOptions, Usage};
use parley_types::model::ModelDetails;
use parley_types::provider::ProviderKind;

use self::config::OpenAiCompatConfig;
use self::types::{WireChatRequest, WireChatResponse, WireErrorBody, WireModelList};

/// Context window assumed for models the registry does not know.
pub const DEFAULT_CONTEXT_LIMIT: u32 = 32_000;

const MIN_OUTPUT_TOKENS: u32 = 1_000;
const MAX_OUTPUT_TOKENS: u32 = 16_000;
const CONTEXT_SAFETY_BUFFER: u32 = 1_000;
const TOKENS_PER_TOOL: u32 = 200;

/// Unified provider for any OpenAI-compatible API.
///
/// # API Key Security
///
/// Does NOT derive Debug. The key is held as a [`SecretString`] and never
/// appears in tracing output; only the backend's env var name is logged.
pub struct OpenAiCompatibleProvider {
    client: reqwest::Client,
    kind: ProviderKind,
    base_url: String,
    api_key: Option<SecretString>,
    model: String,
    features: ProviderFeatures,
    registry: Arc<ModelRegistry>,
    model_cache: ModelListCache,
}

impl OpenAiCompatibleProvider {
    pub fn new(
        config: OpenAiCompatConfig,
        registry: Arc<ModelRegistry>,
        model_cache: ModelListCache,
    ) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| LlmError::Http(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            kind: config.kind,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key,
            model: config.model,
            features: config.features,
            registry,
            model_cache,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => builder.bearer_auth(key.expose_secret()),
            None => builder,
        }
    }

    /// Output budget: what is left of the context window after a rough
    /// input estimate (4 chars per token, 200 per tool) and a safety
    /// buffer, clamped to `[1000, 16000]`.
    fn size_max_tokens(&self, model: &str, messages: &[Message], tool_count: usize) -> u32 {
        let context = self
            .registry
            .get_model_context_length_with_default(model, DEFAULT_CONTEXT_LIMIT);

        let message_tokens: u32 = messages
            .iter()
            .map(|m| (m.content.len() / 4) as u32)
            .sum();
        let input = message_tokens.saturating_add(TOKENS_PER_TOOL.saturating_mul(tool_count as u32));

        context
            .saturating_sub(input)
            .saturating_sub(CONTEXT_SAFETY_BUFFER)
            .clamp(MIN_OUTPUT_TOKENS, MAX_OUTPUT_TOKENS)
    }

    fn error_for_status(&self, status: StatusCode, retry_after: Option<u64>, body: &str) -> LlmError {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                tracing::warn!(
                    provider = %self.kind,
                    env_var = self.kind.env_var().unwrap_or("none"),
                    status = status.as_u16(),
                    "authentication rejected"
                );
                LlmError::AuthenticationFailed
            }
            StatusCode::TOO_MANY_REQUESTS => LlmError::RateLimited {
                retry_after_ms: retry_after.map(|secs| secs * 1000),
            },
            _ => {
                let detail = serde_json::from_str::<WireErrorBody>(body)
                    .ok()
                    .map(|b| b.error.message)
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| body.to_string());
                LlmError::Provider {
                    message: format!(
                        "{} error ({}): {detail}",
                        self.kind.display_name(),
                        status.as_u16()
                    ),
                }
            }
        }
    }

    /// Single-entry listing used when `/models` is unavailable.
    fn fallback_listing(&self) -> Vec<ModelDetails> {
        let id = self.kind.default_model();
        vec![self.describe_model(id)]
    }

    fn describe_model(&self, id: &str) -> ModelDetails {
        match self.registry.get_model_config(id) {
            Ok(config) => ModelDetails {
                id: id.to_string(),
                name: if config.name.is_empty() { id.to_string() } else { config.name },
                context_length: Some(config.context_length),
                is_default: id == self.kind.default_model(),
                features: config.features,
            },
            Err(_) => {
                let mut features = Vec::new();
                if self.features.tools {
                    features.push("tools".to_string());
                }
                ModelDetails {
                    id: id.to_string(),
                    name: id.to_string(),
                    context_length: None,
                    is_default: id == self.kind.default_model(),
                    features,
                }
            }
        }
    }
}

fn map_transport_error(err: reqwest::Error) -> LlmError {
    if err.is_timeout() {
        LlmError::Timeout
    } else {
        LlmError::Http(err.to_string())
    }
}

fn retry_after_secs(headers: &reqwest::header::HeaderMap) -> Option<u64> {
    headers
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

impl LlmProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        self.kind.as_str()
    }

    fn kind(&self) -> ProviderKind {
        self.kind
    }

    fn features(&self) -> ProviderFeatures {
        let mut features = self.features;
        if let Ok(config) = self.registry.get_model_config(&self.model) {
            features.vision |= config.has_feature("vision");
            features.reasoning |= config.has_feature("reasoning");
        }
        features
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn set_model(&mut self, model: &str) -> Result<(), LlmError> {
        let model = model.trim();
        if model.is_empty() {
            return Err(LlmError::InvalidRequest("model must not be empty".to_string()));
        }
        tracing::info!(provider = %self.kind, from = %self.model, to = model, "switching model");
        self.model = model.to_string();
        Ok(())
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, LlmError> {
        let model = if request.model.is_empty() {
            self.model.as_str()
        } else {
            request.model.as_str()
        };
        let max_tokens = request
            .options
            .max_tokens
            .unwrap_or_else(|| self.size_max_tokens(model, &request.messages, request.tools.len()));

        let body = WireChatRequest {
            model,
            messages: &request.messages,
            tools: &request.tools,
            tool_choice: (!request.tools.is_empty()).then_some("auto"),
            temperature: request.options.temperature,
            max_tokens,
            stream: false,
            reasoning_effort: request.options.reasoning_effort.as_deref(),
        };

        tracing::debug!(
            provider = %self.kind,
            model,
            messages = request.messages.len(),
            tools = request.tools.len(),
            max_tokens,
            "sending chat request"
        );

        let response = self
            .authorize(self.client.post(self.url("/chat/completions")))
            .json(&body)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = retry_after_secs(response.headers());
            let error_body = response.text().await.unwrap_or_default();
            return Err(self.error_for_status(status, retry_after, &error_body));
        }

        let wire: WireChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Deserialization(format!("failed to parse response: {e}")))?;

        let mut chat = wire.into_chat_response();
        if chat.usage.estimated_cost.is_none() {
            chat.usage.estimated_cost = pricing::estimate_cost(&self.registry, model, &chat.usage);
        }

        tracing::debug!(
            provider = %self.kind,
            prompt_tokens = chat.usage.prompt_tokens,
            completion_tokens = chat.usage.completion_tokens,
            choices = chat.choices.len(),
            "chat response received"
        );

        Ok(chat)
    }

    async fn check_connection(&self) -> Result<(), LlmError> {
        let request = ChatRequest {
            model: String::new(),
            messages: vec![Message::user("Hi")],
            tools: Vec::new(),
            options: RequestOptions {
                max_tokens: Some(1),
                ..RequestOptions::default()
            },
        };
        self.chat(&request).await.map(|_| ())
    }

    async fn list_models(&self) -> Result<Vec<ModelDetails>, LlmError> {
        if let Some(models) = self.model_cache.get(self.kind) {
            tracing::debug!(provider = %self.kind, count = models.len(), "model list served from cache");
            return Ok(models);
        }

        let response = match self
            .authorize(self.client.get(self.url("/models")))
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(provider = %self.kind, error = %err, "model listing unavailable, using default model");
                return Ok(self.fallback_listing());
            }
        };

        let status = response.status();
        if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            return Err(self.error_for_status(status, None, ""));
        }
        if !status.is_success() {
            tracing::warn!(provider = %self.kind, status = status.as_u16(), "model listing unavailable, using default model");
            return Ok(self.fallback_listing());
        }

        let listing: WireModelList = response
            .json()
            .await
            .map_err(|e| LlmError::Deserialization(format!("failed to parse model list: {e}")))?;

        let mut models: Vec<ModelDetails> = listing
            .data
            .iter()
            .map(|m| self.describe_model(&m.id))
            .collect();
        models.sort_by(|a, b| a.id.cmp(&b.id));

        self.model_cache.insert(self.kind, models.clone());
        Ok(models)
    }

    fn context_limit(&self) -> u32 {
        self.registry
            .get_model_context_length_with_default(&self.model, DEFAULT_CONTEXT_LIMIT)
    }

    fn estimate_cost(&self, usage: &Usage) -> Option<f64> {
        pricing::estimate_cost(&self.registry, &self.model, usage)
    }
}
