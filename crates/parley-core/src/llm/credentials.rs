//! Credential lookup port.
//!
//! Provider selection only needs to know whether a credential exists;
//! the value itself is read once, when an adapter is built.

use std::collections::HashMap;

/// Read-only source of named credentials (API keys, provider hints).
///
/// The production implementation reads environment variables
/// (`parley_infra::secret::EnvCredentialSource`). Empty values count as
/// absent.
pub trait CredentialSource: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

impl<T: CredentialSource + ?Sized> CredentialSource for &T {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }
}

/// In-memory credential source.
#[derive(Default, Clone)]
pub struct StaticCredentials {
    values: HashMap<String, String>,
}

impl StaticCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }
}

impl CredentialSource for StaticCredentials {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).filter(|v| !v.is_empty()).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_value_counts_as_missing() {
        let creds = StaticCredentials::new()
            .with("OPENAI_API_KEY", "")
            .with("GROQ_API_KEY", "gsk-test");
        assert!(!creds.contains("OPENAI_API_KEY"));
        assert!(creds.contains("GROQ_API_KEY"));
        assert!(!creds.contains("DEEPSEEK_API_KEY"));
    }
}
