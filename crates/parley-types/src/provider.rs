//! The closed set of backends Parley can talk to.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ResolveError;

/// Which LLM backend a provider instance talks to.
///
/// Every backend speaks the OpenAI-compatible chat contract; they differ
/// in base URL, credential, and default model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    OpenAi,
    OpenRouter,
    DeepInfra,
    Cerebras,
    Groq,
    DeepSeek,
    Ollama,
}

impl ProviderKind {
    /// Order in which backends are probed when nothing is explicitly chosen.
    /// Ollama is last because it needs no credential and is always reported
    /// as available.
    pub const SCAN_ORDER: [ProviderKind; 7] = [
        ProviderKind::OpenAi,
        ProviderKind::OpenRouter,
        ProviderKind::DeepInfra,
        ProviderKind::Cerebras,
        ProviderKind::Groq,
        ProviderKind::DeepSeek,
        ProviderKind::Ollama,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::OpenRouter => "openrouter",
            ProviderKind::DeepInfra => "deepinfra",
            ProviderKind::Cerebras => "cerebras",
            ProviderKind::Groq => "groq",
            ProviderKind::DeepSeek => "deepseek",
            ProviderKind::Ollama => "ollama",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "OpenAI",
            ProviderKind::OpenRouter => "OpenRouter",
            ProviderKind::DeepInfra => "DeepInfra",
            ProviderKind::Cerebras => "Cerebras",
            ProviderKind::Groq => "Groq",
            ProviderKind::DeepSeek => "DeepSeek",
            ProviderKind::Ollama => "Ollama",
        }
    }

    /// Environment variable holding the API key, if the backend needs one.
    pub fn env_var(&self) -> Option<&'static str> {
        match self {
            ProviderKind::OpenAi => Some("OPENAI_API_KEY"),
            ProviderKind::OpenRouter => Some("OPENROUTER_API_KEY"),
            ProviderKind::DeepInfra => Some("DEEPINFRA_API_KEY"),
            ProviderKind::Cerebras => Some("CEREBRAS_API_KEY"),
            ProviderKind::Groq => Some("GROQ_API_KEY"),
            ProviderKind::DeepSeek => Some("DEEPSEEK_API_KEY"),
            ProviderKind::Ollama => None,
        }
    }

    pub fn requires_credential(&self) -> bool {
        self.env_var().is_some()
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "gpt-4o-mini",
            ProviderKind::OpenRouter => "deepseek/deepseek-chat-v3.1:free",
            ProviderKind::DeepInfra => "deepseek-ai/deepseek-v3.1",
            ProviderKind::Cerebras => "cerebras/btlm-3b-8k-base",
            ProviderKind::Groq => "llama3-70b-8192",
            ProviderKind::DeepSeek => "deepseek-chat",
            ProviderKind::Ollama => "gpt-oss:20b",
        }
    }

    /// Model to switch to for image input, when the backend has one.
    pub fn vision_model(&self) -> Option<&'static str> {
        match self {
            ProviderKind::OpenAi | ProviderKind::OpenRouter => Some("gpt-4o"),
            _ => None,
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "https://api.openai.com/v1",
            ProviderKind::OpenRouter => "https://openrouter.ai/api/v1",
            ProviderKind::DeepInfra => "https://api.deepinfra.com/v1/openai",
            ProviderKind::Cerebras => "https://api.cerebras.ai/v1",
            ProviderKind::Groq => "https://api.groq.com/openai/v1",
            ProviderKind::DeepSeek => "https://api.deepseek.com/v1",
            ProviderKind::Ollama => "http://localhost:11434/v1",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = ResolveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(ProviderKind::OpenAi),
            "openrouter" => Ok(ProviderKind::OpenRouter),
            "deepinfra" => Ok(ProviderKind::DeepInfra),
            "cerebras" => Ok(ProviderKind::Cerebras),
            "groq" => Ok(ProviderKind::Groq),
            "deepseek" => Ok(ProviderKind::DeepSeek),
            "ollama" => Ok(ProviderKind::Ollama),
            _ => Err(ResolveError::UnknownProvider(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_kind_roundtrip() {
        for kind in ProviderKind::SCAN_ORDER {
            let parsed: ProviderKind = kind.to_string().parse().unwrap();
            assert_eq!(kind, parsed);
        }
    }

    #[test]
    fn test_provider_kind_parse_is_case_insensitive() {
        assert_eq!("OpenAI".parse::<ProviderKind>().unwrap(), ProviderKind::OpenAi);
        assert_eq!(" groq ".parse::<ProviderKind>().unwrap(), ProviderKind::Groq);
    }

    #[test]
    fn test_unknown_provider() {
        assert_eq!(
            "anthropic".parse::<ProviderKind>(),
            Err(ResolveError::UnknownProvider("anthropic".to_string()))
        );
    }

    #[test]
    fn test_only_ollama_needs_no_credential() {
        let keyless: Vec<_> = ProviderKind::SCAN_ORDER
            .into_iter()
            .filter(|k| !k.requires_credential())
            .collect();
        assert_eq!(keyless, vec![ProviderKind::Ollama]);
        assert_eq!(ProviderKind::SCAN_ORDER.last(), Some(&ProviderKind::Ollama));
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&ProviderKind::DeepSeek).unwrap();
        assert_eq!(json, "\"deepseek\"");
    }
}
