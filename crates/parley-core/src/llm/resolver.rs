//! Provider selection and `provider:model` reference resolution.
//!
//! Precedence when choosing a backend:
//! 1. explicit choice (terminal if unknown or missing its credential)
//! 2. `PARLEY_PROVIDER`, then the configured default provider
//! 3. the last successfully used provider
//! 4. the first backend in scan order with a credential
//! 5. Ollama, which needs none

use parley_types::error::ResolveError;
use parley_types::provider::ProviderKind;

use super::credentials::CredentialSource;

/// Environment key naming the preferred provider.
pub const PROVIDER_ENV_VAR: &str = "PARLEY_PROVIDER";

/// A resolved `(provider, model)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelReference {
    pub provider: ProviderKind,
    pub model: String,
}

/// Chooses a backend from explicit input, configuration hints, and which
/// credentials are present.
pub struct ProviderResolver<C: CredentialSource> {
    credentials: C,
    default_provider: Option<String>,
}

impl<C: CredentialSource> ProviderResolver<C> {
    pub fn new(credentials: C) -> Self {
        Self {
            credentials,
            default_provider: None,
        }
    }

    /// Configured default provider, consulted after `PARLEY_PROVIDER`.
    pub fn with_default_provider(mut self, provider: Option<String>) -> Self {
        self.default_provider = provider.filter(|p| !p.trim().is_empty());
        self
    }

    pub fn credentials(&self) -> &C {
        &self.credentials
    }

    /// Whether `kind` can be used right now.
    pub fn is_available(&self, kind: ProviderKind) -> bool {
        match kind.env_var() {
            Some(var) => self.credentials.contains(var),
            None => true,
        }
    }

    /// Every backend that can be used right now, in scan order.
    pub fn available_providers(&self) -> Vec<ProviderKind> {
        ProviderKind::SCAN_ORDER
            .into_iter()
            .filter(|k| self.is_available(*k))
            .collect()
    }

    /// Pick the backend for a session.
    pub fn determine_provider(
        &self,
        explicit: Option<&str>,
        last_used: Option<ProviderKind>,
    ) -> Result<ProviderKind, ResolveError> {
        if let Some(name) = explicit.filter(|n| !n.trim().is_empty()) {
            let kind: ProviderKind = name.parse()?;
            if !self.is_available(kind) {
                let env_var = kind.env_var().unwrap_or_default().to_string();
                tracing::debug!(provider = %kind, env_var = %env_var, "explicit provider has no credential");
                return Err(ResolveError::CredentialMissing {
                    provider: kind.to_string(),
                    env_var,
                });
            }
            return Ok(kind);
        }

        let hints = [
            (PROVIDER_ENV_VAR, self.credentials.get(PROVIDER_ENV_VAR)),
            ("default_provider", self.default_provider.clone()),
        ];
        for (source, hint) in hints {
            let Some(name) = hint else { continue };
            match name.parse::<ProviderKind>() {
                Ok(kind) if self.is_available(kind) => {
                    tracing::debug!(provider = %kind, source, "provider chosen from preference");
                    return Ok(kind);
                }
                Ok(kind) => {
                    tracing::debug!(provider = %kind, source, "preferred provider unavailable, skipping");
                }
                Err(_) => {
                    tracing::warn!(provider = %name, source, "ignoring unknown preferred provider");
                }
            }
        }

        if let Some(kind) = last_used.filter(|k| self.is_available(*k)) {
            tracing::debug!(provider = %kind, "reusing last used provider");
            return Ok(kind);
        }

        // Ollama ends the scan order and is always available.
        let kind = ProviderKind::SCAN_ORDER
            .into_iter()
            .find(|k| self.is_available(*k))
            .unwrap_or(ProviderKind::Ollama);
        tracing::debug!(provider = %kind, "provider chosen by credential scan");
        Ok(kind)
    }

    /// Resolve `provider:model` or a bare model name.
    ///
    /// Only the text before the first `:` is tried as a provider name, and
    /// only when it parses as one; otherwise the whole reference is the
    /// model (so `gpt-oss:20b` stays a model id). An empty model part
    /// means the provider's default model.
    pub fn resolve_model_reference(&self, reference: &str) -> Result<ModelReference, ResolveError> {
        let reference = reference.trim();

        if let Some((prefix, rest)) = reference.split_once(':')
            && let Ok(kind) = prefix.parse::<ProviderKind>()
        {
            let model = if rest.is_empty() {
                kind.default_model().to_string()
            } else {
                rest.to_string()
            };
            return Ok(ModelReference {
                provider: kind,
                model,
            });
        }

        let provider = self.determine_provider(None, None)?;
        let model = if reference.is_empty() {
            provider.default_model().to_string()
        } else {
            reference.to_string()
        };
        Ok(ModelReference { provider, model })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::credentials::StaticCredentials;

    fn resolver(creds: StaticCredentials) -> ProviderResolver<StaticCredentials> {
        ProviderResolver::new(creds)
    }

    #[test]
    fn explicit_provider_with_credential() {
        let r = resolver(StaticCredentials::new().with("OPENAI_API_KEY", "sk-test"));
        assert_eq!(
            r.determine_provider(Some("openai"), None).unwrap(),
            ProviderKind::OpenAi
        );
    }

    #[test]
    fn explicit_provider_without_credential_is_terminal() {
        let r = resolver(StaticCredentials::new().with("GROQ_API_KEY", "gsk"));
        assert_eq!(
            r.determine_provider(Some("openai"), Some(ProviderKind::Groq)),
            Err(ResolveError::CredentialMissing {
                provider: "openai".to_string(),
                env_var: "OPENAI_API_KEY".to_string(),
            })
        );
    }

    #[test]
    fn explicit_unknown_provider() {
        let r = resolver(StaticCredentials::new());
        assert_eq!(
            r.determine_provider(Some("anthropic"), None),
            Err(ResolveError::UnknownProvider("anthropic".to_string()))
        );
    }

    #[test]
    fn explicit_ollama_needs_no_credential() {
        let r = resolver(StaticCredentials::new());
        assert_eq!(
            r.determine_provider(Some("ollama"), None).unwrap(),
            ProviderKind::Ollama
        );
    }

    #[test]
    fn env_preference_beats_last_used() {
        let r = resolver(
            StaticCredentials::new()
                .with(PROVIDER_ENV_VAR, "deepseek")
                .with("DEEPSEEK_API_KEY", "k")
                .with("GROQ_API_KEY", "k"),
        );
        assert_eq!(
            r.determine_provider(None, Some(ProviderKind::Groq)).unwrap(),
            ProviderKind::DeepSeek
        );
    }

    #[test]
    fn unavailable_env_preference_falls_through() {
        let r = resolver(
            StaticCredentials::new()
                .with(PROVIDER_ENV_VAR, "openai")
                .with("GROQ_API_KEY", "k"),
        );
        assert_eq!(
            r.determine_provider(None, Some(ProviderKind::Groq)).unwrap(),
            ProviderKind::Groq
        );
    }

    #[test]
    fn configured_default_after_env() {
        let r = resolver(
            StaticCredentials::new()
                .with("CEREBRAS_API_KEY", "k")
                .with("OPENAI_API_KEY", "k"),
        )
        .with_default_provider(Some("cerebras".to_string()));
        assert_eq!(
            r.determine_provider(None, None).unwrap(),
            ProviderKind::Cerebras
        );
    }

    #[test]
    fn scan_order_picks_first_available() {
        let r = resolver(
            StaticCredentials::new()
                .with("DEEPSEEK_API_KEY", "k")
                .with("DEEPINFRA_API_KEY", "k"),
        );
        assert_eq!(
            r.determine_provider(None, None).unwrap(),
            ProviderKind::DeepInfra
        );
    }

    #[test]
    fn falls_back_to_ollama() {
        let r = resolver(StaticCredentials::new());
        assert_eq!(r.determine_provider(None, None).unwrap(), ProviderKind::Ollama);
        assert_eq!(r.available_providers(), vec![ProviderKind::Ollama]);
    }

    #[test]
    fn available_providers_in_scan_order() {
        let r = resolver(
            StaticCredentials::new()
                .with("GROQ_API_KEY", "k")
                .with("OPENAI_API_KEY", "k"),
        );
        assert_eq!(
            r.available_providers(),
            vec![ProviderKind::OpenAi, ProviderKind::Groq, ProviderKind::Ollama]
        );
    }

    #[test]
    fn model_reference_with_provider_prefix() {
        let r = resolver(StaticCredentials::new());
        let resolved = r
            .resolve_model_reference("openrouter:qwen/qwen3-coder:free")
            .unwrap();
        assert_eq!(resolved.provider, ProviderKind::OpenRouter);
        assert_eq!(resolved.model, "qwen/qwen3-coder:free");
    }

    #[test]
    fn model_reference_colon_in_bare_model_name() {
        let r = resolver(StaticCredentials::new().with("OPENAI_API_KEY", "k"));
        let resolved = r.resolve_model_reference("gpt-oss:20b").unwrap();
        assert_eq!(resolved.provider, ProviderKind::OpenAi);
        assert_eq!(resolved.model, "gpt-oss:20b");
    }

    #[test]
    fn model_reference_provider_only() {
        let r = resolver(StaticCredentials::new());
        let resolved = r.resolve_model_reference("deepseek:").unwrap();
        assert_eq!(resolved.provider, ProviderKind::DeepSeek);
        assert_eq!(resolved.model, "deepseek-chat");
    }
}
