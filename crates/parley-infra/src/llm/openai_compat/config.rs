//! Per-backend presets for the OpenAI-compatible adapter.
//!
//! Every [`ProviderKind`] speaks the same chat completions protocol; they
//! differ only in endpoint, credential, default model, and feature flags.

use std::time::Duration;

use secrecy::SecretString;

use parley_types::llm::ProviderFeatures;
use parley_types::provider::ProviderKind;

/// Per-request HTTP timeout when none is configured.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Configuration for an [`super::OpenAiCompatibleProvider`].
///
/// Does not derive `Debug`; `api_key` must never be printed.
pub struct OpenAiCompatConfig {
    pub kind: ProviderKind,
    /// Endpoint root, e.g. `https://api.groq.com/openai/v1` (no trailing slash).
    pub base_url: String,
    /// `None` for backends without authentication (Ollama).
    pub api_key: Option<SecretString>,
    pub model: String,
    pub features: ProviderFeatures,
    pub request_timeout: Duration,
}

impl OpenAiCompatConfig {
    /// Preset for `kind` using its default endpoint. An empty `model`
    /// selects the backend's default model.
    pub fn for_kind(kind: ProviderKind, api_key: Option<SecretString>, model: &str) -> Self {
        let model = if model.trim().is_empty() {
            kind.default_model().to_string()
        } else {
            model.trim().to_string()
        };
        Self {
            kind,
            base_url: kind.default_base_url().to_string(),
            api_key,
            model,
            features: features_for(kind),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// Backend-level feature flags; the adapter refines `vision` and
/// `reasoning` from the active model's registry entry.
pub fn features_for(kind: ProviderKind) -> ProviderFeatures {
    ProviderFeatures {
        vision: kind.vision_model().is_some(),
        tools: true,
        streaming: false,
        reasoning: matches!(kind, ProviderKind::OpenAi | ProviderKind::DeepSeek),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_uses_kind_defaults() {
        let config = OpenAiCompatConfig::for_kind(ProviderKind::Groq, None, "");
        assert_eq!(config.base_url, "https://api.groq.com/openai/v1");
        assert_eq!(config.model, "llama3-70b-8192");
        assert_eq!(config.request_timeout, DEFAULT_REQUEST_TIMEOUT);
        assert!(config.features.tools);
        assert!(!config.features.vision);
    }

    #[test]
    fn test_base_url_override_strips_trailing_slash() {
        let config = OpenAiCompatConfig::for_kind(ProviderKind::Ollama, None, "qwen3:8b")
            .with_base_url("http://gpu-box:11434/v1/");
        assert_eq!(config.base_url, "http://gpu-box:11434/v1");
        assert_eq!(config.model, "qwen3:8b");
    }

    #[test]
    fn test_feature_flags() {
        assert!(features_for(ProviderKind::OpenAi).vision);
        assert!(features_for(ProviderKind::OpenAi).reasoning);
        assert!(features_for(ProviderKind::OpenRouter).vision);
        assert!(features_for(ProviderKind::DeepSeek).reasoning);
        assert!(!features_for(ProviderKind::Ollama).reasoning);
    }

    #[test]
    fn test_no_backend_advertises_streaming() {
        for kind in ProviderKind::SCAN_ORDER {
            let features = features_for(kind);
            assert!(!features.streaming, "{kind} should not report streaming");
            assert!(features.tools);
        }
    }
}
