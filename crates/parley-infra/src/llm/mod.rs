//! LLM provider implementations.
//!
//! Contains the OpenAI-compatible implementation of the [`LlmProvider`]
//! trait defined in `parley-core`, a provider factory ([`create_provider`])
//! keyed on [`ProviderKind`], and a connection test
//! ([`test_provider_connection`]).
//!
//! [`LlmProvider`]: parley_core::llm::provider::LlmProvider

pub mod openai_compat;

use std::sync::Arc;
use std::time::Duration;

use parley_core::llm::box_provider::BoxLlmProvider;
use parley_core::llm::credentials::CredentialSource;
use parley_core::llm::model_cache::ModelListCache;
use parley_core::llm::provider::LlmProvider;
use parley_core::llm::registry::ModelRegistry;
use parley_types::config::GlobalConfig;
use parley_types::error::ResolveError;
use parley_types::llm::LlmError;
use parley_types::provider::ProviderKind;

use crate::secret::api_key_for;

use self::openai_compat::OpenAiCompatibleProvider;
use self::openai_compat::config::{DEFAULT_REQUEST_TIMEOUT, OpenAiCompatConfig};

/// Connection settings applied on top of a backend's preset.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderSettings {
    /// Overrides the backend's default endpoint.
    pub base_url: Option<String>,
    pub request_timeout: Duration,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            base_url: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl ProviderSettings {
    /// Settings for `kind` from `config.toml` (`[base_urls]`, `request_timeout_secs`).
    pub fn from_config(config: &GlobalConfig, kind: ProviderKind) -> Self {
        Self {
            base_url: config.base_urls.get(kind.as_str()).cloned(),
            request_timeout: Duration::from_secs(config.request_timeout_secs),
        }
    }
}

/// Errors from building a provider.
#[derive(Debug, thiserror::Error)]
pub enum ProviderBuildError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Llm(#[from] LlmError),
}

/// Create a [`BoxLlmProvider`] for `kind`.
///
/// An empty `model` selects the backend's default model. Fails with
/// [`ResolveError::CredentialMissing`] when the backend needs an API key
/// and `credentials` has none.
pub fn create_provider<C: CredentialSource + ?Sized>(
    kind: ProviderKind,
    model: &str,
    credentials: &C,
    registry: Arc<ModelRegistry>,
    model_cache: ModelListCache,
    settings: &ProviderSettings,
) -> Result<BoxLlmProvider, ProviderBuildError> {
    let api_key = api_key_for(kind, credentials);
    if let Some(env_var) = kind.env_var()
        && api_key.is_none()
    {
        return Err(ResolveError::CredentialMissing {
            provider: kind.to_string(),
            env_var: env_var.to_string(),
        }
        .into());
    }

    let mut config = OpenAiCompatConfig::for_kind(kind, api_key, model)
        .with_request_timeout(settings.request_timeout);
    if let Some(base_url) = settings.base_url.as_deref() {
        config = config.with_base_url(base_url);
    }

    tracing::debug!(provider = %kind, model = %config.model, base_url = %config.base_url, "creating provider");
    let provider = OpenAiCompatibleProvider::new(config, registry, model_cache)?;
    Ok(BoxLlmProvider::new(provider))
}

/// Verify the backend is reachable and accepts the credential.
///
/// Sends a one-token completion request.
pub async fn test_provider_connection(provider: &BoxLlmProvider) -> Result<(), LlmError> {
    provider.check_connection().await
}

#[cfg(test)]
mod tests {
    use parley_core::llm::credentials::StaticCredentials;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn registry() -> Arc<ModelRegistry> {
        Arc::new(ModelRegistry::with_defaults())
    }

    #[test]
    fn test_create_provider_with_credential() {
        let creds = StaticCredentials::new().with("GROQ_API_KEY", "gsk-test");
        let provider = create_provider(
            ProviderKind::Groq,
            "",
            &creds,
            registry(),
            ModelListCache::new(),
            &ProviderSettings::default(),
        )
        .unwrap();
        assert_eq!(provider.name(), "groq");
        assert_eq!(provider.model(), "llama3-70b-8192");
    }

    #[test]
    fn test_create_provider_missing_credential() {
        let result = create_provider(
            ProviderKind::OpenAi,
            "gpt-4o",
            &StaticCredentials::new(),
            registry(),
            ModelListCache::new(),
            &ProviderSettings::default(),
        );
        match result {
            Err(ProviderBuildError::Resolve(ResolveError::CredentialMissing { env_var, .. })) => {
                assert_eq!(env_var, "OPENAI_API_KEY");
            }
            Err(other) => panic!("expected CredentialMissing, got: {other}"),
            Ok(_) => panic!("expected error but got Ok"),
        }
    }

    #[test]
    fn test_create_provider_ollama_needs_no_key() {
        let provider = create_provider(
            ProviderKind::Ollama,
            "qwen3:8b",
            &StaticCredentials::new(),
            registry(),
            ModelListCache::new(),
            &ProviderSettings::default(),
        )
        .unwrap();
        assert_eq!(provider.kind(), ProviderKind::Ollama);
        assert_eq!(provider.model(), "qwen3:8b");
    }

    #[test]
    fn test_settings_from_config() {
        let mut config = GlobalConfig::default();
        config
            .base_urls
            .insert("ollama".to_string(), "http://gpu-box:11434/v1".to_string());
        config.request_timeout_secs = 30;

        let settings = ProviderSettings::from_config(&config, ProviderKind::Ollama);
        assert_eq!(settings.base_url.as_deref(), Some("http://gpu-box:11434/v1"));
        assert_eq!(settings.request_timeout, Duration::from_secs(30));

        let settings = ProviderSettings::from_config(&config, ProviderKind::Groq);
        assert!(settings.base_url.is_none());
    }

    #[tokio::test]
    async fn test_connection_against_local_server() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"role": "assistant", "content": "Hi"}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let settings = ProviderSettings {
            base_url: Some(server.uri()),
            ..ProviderSettings::default()
        };
        let provider = create_provider(
            ProviderKind::Ollama,
            "",
            &StaticCredentials::new(),
            registry(),
            ModelListCache::new(),
            &settings,
        )
        .unwrap();

        test_provider_connection(&provider).await.unwrap();
    }
}
