//! Application state wiring the registry, resolver, and config together.
//!
//! Built once per process and borrowed by every command handler.

use std::path::PathBuf;
use std::sync::Arc;

use parley_core::llm::box_provider::BoxLlmProvider;
use parley_core::llm::model_cache::ModelListCache;
use parley_core::llm::registry::ModelRegistry;
use parley_core::llm::resolver::{ModelReference, ProviderResolver};
use parley_infra::config::{load_global_config, record_last_used_provider};
use parley_infra::filesystem::resolve_data_dir;
use parley_infra::llm::{ProviderSettings, create_provider};
use parley_infra::secret::EnvCredentialSource;
use parley_types::config::GlobalConfig;
use parley_types::provider::ProviderKind;

pub struct AppState {
    pub data_dir: PathBuf,
    pub config: GlobalConfig,
    pub registry: Arc<ModelRegistry>,
    pub model_cache: ModelListCache,
    pub resolver: ProviderResolver<EnvCredentialSource>,
}

impl AppState {
    /// Load `config.toml` and build the registry with user overrides applied.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        let config = load_global_config(&data_dir).await;

        let registry = ModelRegistry::with_defaults();
        registry.extend_from_config(&config);
        let (models, patterns) = registry.counts();
        tracing::debug!(models, patterns, data_dir = %data_dir.display(), "model registry ready");

        let resolver = ProviderResolver::new(EnvCredentialSource::new())
            .with_default_provider(config.default_provider.clone());

        Ok(Self {
            data_dir,
            config,
            registry: Arc::new(registry),
            model_cache: ModelListCache::new(),
            resolver,
        })
    }

    /// `last_used_provider` from config, if it names a known backend.
    pub fn last_used_provider(&self) -> Option<ProviderKind> {
        self.config
            .last_used_provider
            .as_deref()
            .and_then(|p| p.parse().ok())
    }

    /// Pick the backend and model for a command.
    ///
    /// A `provider:model` reference wins when no provider flag is given.
    /// Otherwise the provider is resolved first (honouring the last used
    /// backend) and the model defaults to that backend's default.
    pub fn select_model(
        &self,
        provider: Option<&str>,
        model: Option<&str>,
    ) -> anyhow::Result<ModelReference> {
        let model = model.map(str::trim).filter(|m| !m.is_empty());

        if provider.is_none()
            && let Some(reference) = model
            && let Some((prefix, _)) = reference.split_once(':')
            && prefix.parse::<ProviderKind>().is_ok()
        {
            return Ok(self.resolver.resolve_model_reference(reference)?);
        }

        let kind = self
            .resolver
            .determine_provider(provider, self.last_used_provider())?;
        Ok(ModelReference {
            provider: kind,
            model: model
                .map(str::to_string)
                .unwrap_or_else(|| kind.default_model().to_string()),
        })
    }

    pub fn build_provider(&self, selection: &ModelReference) -> anyhow::Result<BoxLlmProvider> {
        let settings = ProviderSettings::from_config(&self.config, selection.provider);
        let provider = create_provider(
            selection.provider,
            &selection.model,
            self.resolver.credentials(),
            Arc::clone(&self.registry),
            self.model_cache.clone(),
            &settings,
        )?;
        Ok(provider)
    }

    /// Persist `kind` as the last used backend; failures are only logged.
    pub async fn remember_provider(&self, kind: ProviderKind) {
        if let Err(e) = record_last_used_provider(&self.data_dir, kind.as_str()).await {
            tracing::warn!(error = %e, "could not record last used provider");
        }
    }
}
