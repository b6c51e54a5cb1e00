//! Credential lookup for provider API keys.
//!
//! - `env`: environment variable credential source (read-only)
//! - [`api_key_for`]: fetches a backend's key and wraps it in a [`SecretString`]

pub mod env;

pub use env::EnvCredentialSource;

use secrecy::SecretString;

use parley_core::llm::credentials::CredentialSource;
use parley_types::provider::ProviderKind;

/// The API key for `kind`, if it needs one and one is present.
///
/// Only the variable name is ever logged.
pub fn api_key_for<C: CredentialSource + ?Sized>(kind: ProviderKind, credentials: &C) -> Option<SecretString> {
    let var = kind.env_var()?;
    match credentials.get(var) {
        Some(value) => Some(SecretString::from(value)),
        None => {
            tracing::debug!(provider = %kind, env_var = var, "no API key found");
            None
        }
    }
}
