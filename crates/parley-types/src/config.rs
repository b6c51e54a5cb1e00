//! Global configuration types for Parley.
//!
//! `GlobalConfig` represents the top-level `config.toml` that controls
//! provider selection, orchestration limits, and user model overrides.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{ModelConfig, ModelPattern};
use crate::provider::ProviderKind;

/// Top-level configuration for Parley.
///
/// Loaded from `~/.parley/config.toml`. All fields have sensible defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Provider to use when none is given on the command line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_provider: Option<String>,

    /// Provider of the last successful session, used as a selection hint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_used_provider: Option<String>,

    /// Maximum model requests per orchestration session.
    #[serde(default = "default_max_attempts")]
    pub orchestration_max_attempts: u32,

    /// Wall-clock budget for a whole orchestration session.
    #[serde(default = "default_orchestration_timeout")]
    pub orchestration_timeout_secs: u64,

    /// Per-HTTP-request timeout.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Extra exact model entries layered over the builtin catalog.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub models: Vec<ModelConfig>,

    /// Extra pattern rules layered over the builtin catalog.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub model_patterns: Vec<ModelPattern>,

    /// Endpoint overrides keyed by provider name (e.g. `ollama = "http://gpu-box:11434/v1"`).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub base_urls: BTreeMap<String, String>,
}

fn default_max_attempts() -> u32 {
    8
}

fn default_orchestration_timeout() -> u64 {
    300
}

fn default_request_timeout() -> u64 {
    120
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            default_provider: None,
            last_used_provider: None,
            orchestration_max_attempts: default_max_attempts(),
            orchestration_timeout_secs: default_orchestration_timeout(),
            request_timeout_secs: default_request_timeout(),
            models: Vec::new(),
            model_patterns: Vec::new(),
            base_urls: BTreeMap::new(),
        }
    }
}

impl GlobalConfig {
    /// Base URL for `kind`, honouring a configured override.
    pub fn base_url_for(&self, kind: ProviderKind) -> &str {
        self.base_urls
            .get(kind.as_str())
            .map(String::as_str)
            .unwrap_or_else(|| kind.default_base_url())
    }
}
