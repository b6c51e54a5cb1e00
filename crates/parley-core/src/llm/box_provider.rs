//! BoxLlmProvider -- object-safe dynamic dispatch wrapper for LlmProvider.
//!
//! 1. Define an object-safe `LlmProviderDyn` trait with boxed futures
//! 2. Blanket-impl `LlmProviderDyn` for all `T: LlmProvider`
//! 3. `BoxLlmProvider` wraps `Box<dyn LlmProviderDyn>` and delegates

use std::future::Future;
use std::pin::Pin;

use parley_types::llm::{ChatRequest, ChatResponse, LlmError, ProviderFeatures, Usage};
use parley_types::model::ModelDetails;
use parley_types::provider::ProviderKind;

use super::provider::LlmProvider;

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Object-safe version of [`LlmProvider`] with boxed futures.
///
/// This trait exists solely to enable dynamic dispatch (`dyn LlmProviderDyn`).
/// A blanket implementation is provided for all types implementing `LlmProvider`.
pub trait LlmProviderDyn: Send + Sync {
    fn name(&self) -> &str;

    fn kind(&self) -> ProviderKind;

    fn features(&self) -> ProviderFeatures;

    fn model(&self) -> &str;

    fn set_model(&mut self, model: &str) -> Result<(), LlmError>;

    fn chat_boxed<'a>(
        &'a self,
        request: &'a ChatRequest,
    ) -> BoxFuture<'a, Result<ChatResponse, LlmError>>;

    fn check_connection_boxed(&self) -> BoxFuture<'_, Result<(), LlmError>>;

    fn list_models_boxed(&self) -> BoxFuture<'_, Result<Vec<ModelDetails>, LlmError>>;

    fn context_limit(&self) -> u32;

    fn estimate_cost(&self, usage: &Usage) -> Option<f64>;
}

/// Blanket implementation: any `LlmProvider` automatically implements `LlmProviderDyn`.
impl<T: LlmProvider> LlmProviderDyn for T {
    fn name(&self) -> &str {
        LlmProvider::name(self)
    }

    fn kind(&self) -> ProviderKind {
        LlmProvider::kind(self)
    }

    fn features(&self) -> ProviderFeatures {
        LlmProvider::features(self)
    }

    fn model(&self) -> &str {
        LlmProvider::model(self)
    }

    fn set_model(&mut self, model: &str) -> Result<(), LlmError> {
        LlmProvider::set_model(self, model)
    }

    fn chat_boxed<'a>(
        &'a self,
        request: &'a ChatRequest,
    ) -> BoxFuture<'a, Result<ChatResponse, LlmError>> {
        Box::pin(self.chat(request))
    }

    fn check_connection_boxed(&self) -> BoxFuture<'_, Result<(), LlmError>> {
        Box::pin(self.check_connection())
    }

    fn list_models_boxed(&self) -> BoxFuture<'_, Result<Vec<ModelDetails>, LlmError>> {
        Box::pin(self.list_models())
    }

    fn context_limit(&self) -> u32 {
        LlmProvider::context_limit(self)
    }

    fn estimate_cost(&self, usage: &Usage) -> Option<f64> {
        LlmProvider::estimate_cost(self, usage)
    }
}

/// Type-erased chat backend for runtime provider selection.
///
/// Since `LlmProvider` uses RPITIT, it cannot be used as a trait object directly.
/// `BoxLlmProvider` provides equivalent methods that delegate to the inner
/// `LlmProviderDyn` trait object, and itself implements `LlmProvider` so it
/// can be handed to anything generic over the trait.
pub struct BoxLlmProvider {
    inner: Box<dyn LlmProviderDyn + Send + Sync>,
}

impl BoxLlmProvider {
    /// Wrap a concrete `LlmProvider` in a type-erased box.
    pub fn new<T: LlmProvider + 'static>(provider: T) -> Self {
        Self {
            inner: Box::new(provider),
        }
    }
}

impl LlmProvider for BoxLlmProvider {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn kind(&self) -> ProviderKind {
        self.inner.kind()
    }

    fn features(&self) -> ProviderFeatures {
        self.inner.features()
    }

    fn model(&self) -> &str {
        self.inner.model()
    }

    fn set_model(&mut self, model: &str) -> Result<(), LlmError> {
        self.inner.set_model(model)
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, LlmError> {
        self.inner.chat_boxed(request).await
    }

    async fn check_connection(&self) -> Result<(), LlmError> {
        self.inner.check_connection_boxed().await
    }

    async fn list_models(&self) -> Result<Vec<ModelDetails>, LlmError> {
        self.inner.list_models_boxed().await
    }

    fn context_limit(&self) -> u32 {
        self.inner.context_limit()
    }

    fn estimate_cost(&self, usage: &Usage) -> Option<f64> {
        self.inner.estimate_cost(usage)
    }
}
