//! Environment variable credential source.
//!
//! Reads API keys (`OPENAI_API_KEY`, `GROQ_API_KEY`, ...) and the
//! `PARLEY_PROVIDER` preference straight from the process environment.

use parley_core::llm::credentials::CredentialSource;

/// Read-only credential source backed by `std::env`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvCredentialSource;

impl EnvCredentialSource {
    pub fn new() -> Self {
        Self
    }
}

impl CredentialSource for EnvCredentialSource {
    fn get(&self, key: &str) -> Option<String> {
        match std::env::var(key) {
            Ok(val) if !val.trim().is_empty() => Some(val),
            Ok(_) => None,
            Err(std::env::VarError::NotPresent) => None,
            Err(std::env::VarError::NotUnicode(_)) => {
                // Present but unusable as a header value.
                tracing::warn!(env_var = key, "ignoring non-unicode environment variable");
                None
            }
        }
    }
}
