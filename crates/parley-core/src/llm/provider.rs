//! LlmProvider trait definition.
//!
//! This is the core abstraction that all chat backends implement.
//! Uses RPITIT for the network-bound methods; the rest are plain
//! accessors answered from local state and the model registry.

use std::future::Future;

use parley_types::llm::{ChatRequest, ChatResponse, LlmError, ProviderFeatures, Usage};
use parley_types::model::ModelDetails;
use parley_types::provider::ProviderKind;

/// Trait for chat backends (OpenAI, DeepSeek, Ollama, etc.).
///
/// Uses native async fn in traits (RPITIT, Rust 2024 edition). Wrap in
/// [`BoxLlmProvider`](super::box_provider::BoxLlmProvider) for dynamic
/// dispatch.
///
/// Implementations live in parley-infra (e.g., `OpenAiCompatibleProvider`).
pub trait LlmProvider: Send + Sync {
    /// Short provider name (e.g., "openai", "ollama").
    fn name(&self) -> &str;

    fn kind(&self) -> ProviderKind;

    /// What the active model supports.
    fn features(&self) -> ProviderFeatures;

    /// Active model id.
    fn model(&self) -> &str;

    /// Switch the active model for subsequent requests.
    fn set_model(&mut self, model: &str) -> Result<(), LlmError>;

    /// Send one chat request and wait for the whole response.
    ///
    /// An empty `request.model` means the active model.
    fn chat(
        &self,
        request: &ChatRequest,
    ) -> impl Future<Output = Result<ChatResponse, LlmError>> + Send;

    /// Verify the backend is reachable and the credential is accepted.
    fn check_connection(&self) -> impl Future<Output = Result<(), LlmError>> + Send;

    /// Models the backend currently offers.
    fn list_models(&self) -> impl Future<Output = Result<Vec<ModelDetails>, LlmError>> + Send;

    /// Context window of the active model in tokens.
    fn context_limit(&self) -> u32;

    /// Estimated USD cost of `usage` on the active model, if priced.
    fn estimate_cost(&self, usage: &Usage) -> Option<f64>;
}
