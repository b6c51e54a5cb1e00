//! Model registry: exact model entries plus priority-ordered pattern rules.
//!
//! One registry is built per process and shared as `Arc<ModelRegistry>`.
//! Both tables sit behind a single `RwLock` so a write is one critical
//! section and concurrent readers never see a half-applied update.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use parley_types::config::GlobalConfig;
use parley_types::error::RegistryError;
use parley_types::model::{ModelConfig, ModelPattern};

use super::catalog;

#[derive(Debug, Default)]
struct Tables {
    models: HashMap<String, ModelConfig>,
    /// Kept sorted by descending priority; equal priorities keep
    /// registration order.
    patterns: Vec<ModelPattern>,
}

impl Tables {
    fn sort_patterns(&mut self) {
        // `sort_by` is stable, so ties keep insertion order.
        self.patterns.sort_by(|a, b| b.priority.cmp(&a.priority));
    }
}

/// Registry of model metadata keyed by model id.
#[derive(Debug, Default)]
pub struct ModelRegistry {
    tables: RwLock<Tables>,
}

impl ModelRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry pre-loaded with the builtin model catalog.
    pub fn with_defaults() -> Self {
        let mut tables = Tables::default();
        for model in catalog::builtin_models() {
            tables.models.insert(model.id.clone(), model);
        }
        tables.patterns = catalog::builtin_patterns();
        tables.sort_patterns();

        Self {
            tables: RwLock::new(tables),
        }
    }

    // Writers never leave the tables half-updated, so a poisoned lock
    // still guards consistent data.
    fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.tables.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        self.tables.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Look up a model: exact id first, then pattern rules by priority.
    ///
    /// A pattern hit returns a copy of the pattern's config with `id` set
    /// to the queried id.
    pub fn get_model_config(&self, model_id: &str) -> Result<ModelConfig, RegistryError> {
        let tables = self.read();

        if let Some(config) = tables.models.get(model_id) {
            return Ok(config.clone());
        }

        tables
            .patterns
            .iter()
            .find(|p| p.matches(model_id))
            .map(|p| ModelConfig {
                id: model_id.to_string(),
                ..p.config.clone()
            })
            .ok_or_else(|| RegistryError::ModelNotFound(model_id.to_string()))
    }

    /// Context window size in tokens.
    pub fn get_model_context_length(&self, model_id: &str) -> Result<u32, RegistryError> {
        self.get_model_config(model_id).map(|c| c.context_length)
    }

    /// Context window size, or `default` when the model is unknown.
    pub fn get_model_context_length_with_default(&self, model_id: &str, default: u32) -> u32 {
        self.get_model_context_length(model_id).unwrap_or(default)
    }

    /// `(input, output)` cost in USD per million tokens.
    pub fn get_model_pricing(&self, model_id: &str) -> Result<(f64, f64), RegistryError> {
        self.get_model_config(model_id)
            .map(|c| (c.input_cost, c.output_cost))
    }

    pub fn get_model_pricing_with_default(&self, model_id: &str, default: (f64, f64)) -> (f64, f64) {
        self.get_model_pricing(model_id).unwrap_or(default)
    }

    /// Insert or overwrite an exact model entry.
    pub fn add_model(&self, config: ModelConfig) -> Result<(), RegistryError> {
        validate_model_config(&config)?;
        tracing::debug!(model = %config.id, provider = %config.provider, "registering model");
        self.write().models.insert(config.id.clone(), config);
        Ok(())
    }

    /// Append a pattern rule and restore priority order.
    pub fn add_pattern(&self, pattern: ModelPattern) -> Result<(), RegistryError> {
        validate_model_pattern(&pattern)?;
        tracing::debug!(
            contains = ?pattern.contains,
            not_contains = ?pattern.not_contains,
            priority = pattern.priority,
            "registering model pattern"
        );
        let mut tables = self.write();
        tables.patterns.push(pattern);
        tables.sort_patterns();
        Ok(())
    }

    /// Exact entries for one provider, sorted by id.
    pub fn models_for_provider(&self, provider: &str) -> Vec<ModelConfig> {
        let mut models: Vec<ModelConfig> = self
            .read()
            .models
            .values()
            .filter(|m| m.provider == provider)
            .cloned()
            .collect();
        models.sort_by(|a, b| a.id.cmp(&b.id));
        models
    }

    /// Number of exact entries and pattern rules.
    pub fn counts(&self) -> (usize, usize) {
        let tables = self.read();
        (tables.models.len(), tables.patterns.len())
    }

    pub fn is_empty(&self) -> bool {
        self.counts() == (0, 0)
    }

    /// Layer user-defined models and patterns from `config.toml` on top.
    ///
    /// Invalid entries are skipped with a warning; the rest still apply.
    pub fn extend_from_config(&self, config: &GlobalConfig) {
        for model in &config.models {
            if let Err(e) = self.add_model(model.clone()) {
                tracing::warn!(model = %model.id, error = %e, "skipping invalid model from config");
            }
        }
        for pattern in &config.model_patterns {
            if let Err(e) = self.add_pattern(pattern.clone()) {
                tracing::warn!(contains = ?pattern.contains, error = %e, "skipping invalid model pattern from config");
            }
        }
    }
}

fn validate_model_config(config: &ModelConfig) -> Result<(), RegistryError> {
    if config.id.is_empty() {
        return Err(RegistryError::validation("id", "model ID cannot be empty"));
    }
    if config.provider.is_empty() {
        return Err(RegistryError::validation("provider", "provider cannot be empty"));
    }
    if config.context_length == 0 {
        return Err(RegistryError::validation(
            "context_length",
            "context length must be positive",
        ));
    }
    if config.input_cost < 0.0 {
        return Err(RegistryError::validation("input_cost", "input cost cannot be negative"));
    }
    if config.output_cost < 0.0 {
        return Err(RegistryError::validation("output_cost", "output cost cannot be negative"));
    }
    if config.cached_input_cost < 0.0 {
        return Err(RegistryError::validation(
            "cached_input_cost",
            "cached input cost cannot be negative",
        ));
    }
    if config.cached_input_cost > config.input_cost {
        return Err(RegistryError::validation(
            "cached_input_cost",
            "cached input cost should not exceed regular input cost",
        ));
    }
    Ok(())
}

fn validate_model_pattern(pattern: &ModelPattern) -> Result<(), RegistryError> {
    if pattern.contains.is_empty() && pattern.not_contains.is_empty() {
        return Err(RegistryError::validation(
            "pattern",
            "pattern must have at least one contains or not_contains rule",
        ));
    }

    // The id is filled in per lookup, so only the rest is checked.
    let probe = ModelConfig {
        id: "pattern".to_string(),
        ..pattern.config.clone()
    };
    validate_model_config(&probe).map_err(|e| {
        RegistryError::validation("pattern.config", format!("invalid pattern config: {e}"))
    })?;

    if pattern.priority < 0 {
        return Err(RegistryError::validation(
            "pattern.priority",
            "priority cannot be negative",
        ));
    }
    Ok(())
}
