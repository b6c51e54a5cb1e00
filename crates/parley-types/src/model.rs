//! Model metadata: exact registry entries, pattern rules, and listings.

use serde::{Deserialize, Serialize};

/// Metadata and pricing for one model. Costs are USD per million tokens.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub provider: String,
    pub context_length: u32,
    #[serde(default, alias = "input_cost_per_1m")]
    pub input_cost: f64,
    #[serde(default, alias = "output_cost_per_1m")]
    pub output_cost: f64,
    #[serde(default, alias = "cached_input_cost_per_1m")]
    pub cached_input_cost: f64,
    /// Capability labels such as "vision", "reasoning", "tools", "audio".
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<String>,
    /// Free-form labels such as "latest", "preview", "free", "local".
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl ModelConfig {
    pub fn has_feature(&self, feature: &str) -> bool {
        self.features.iter().any(|f| f == feature)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// A substring rule mapping families of model ids to a shared config.
///
/// A pattern matches an id when the id contains every string in
/// `contains` and none of the strings in `not_contains`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelPattern {
    #[serde(default)]
    pub contains: Vec<String>,
    #[serde(default)]
    pub not_contains: Vec<String>,
    pub config: ModelConfig,
    #[serde(default)]
    pub priority: i32,
}

impl ModelPattern {
    pub fn matches(&self, model_id: &str) -> bool {
        self.contains.iter().all(|s| model_id.contains(s.as_str()))
            && !self.not_contains.iter().any(|s| model_id.contains(s.as_str()))
    }
}

/// One entry of a provider's model listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDetails {
    pub id: String,
    pub name: String,
    /// `None` when the registry has no entry for this id.
    pub context_length: Option<u32>,
    pub is_default: bool,
    #[serde(default)]
    pub features: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(contains: &[&str], not_contains: &[&str]) -> ModelPattern {
        ModelPattern {
            contains: contains.iter().map(|s| s.to_string()).collect(),
            not_contains: not_contains.iter().map(|s| s.to_string()).collect(),
            config: ModelConfig::default(),
            priority: 0,
        }
    }

    #[test]
    fn test_pattern_contains_all_and_none_excluded() {
        let p = pattern(&["a", "b"], &["c"]);
        assert!(p.matches("xaby"));
        assert!(p.matches("bay-a"));
        assert!(!p.matches("abc"));
        assert!(!p.matches("axy"));
    }

    #[test]
    fn test_model_config_accepts_per_1m_aliases() {
        let toml_str = r#"
id = "my-model"
provider = "ollama"
context_length = 8192
input_cost_per_1m = 0.5
output_cost_per_1m = 1.5
features = ["tools"]
"#;
        let config: ModelConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.input_cost, 0.5);
        assert_eq!(config.output_cost, 1.5);
        assert_eq!(config.cached_input_cost, 0.0);
        assert!(config.has_feature("tools"));
        assert!(!config.has_tag("latest"));
    }
}
