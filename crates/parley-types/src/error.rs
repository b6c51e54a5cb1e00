use thiserror::Error;

/// Errors related to model registry lookups and mutations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistryError {
    #[error("model '{0}' not found in registry")]
    ModelNotFound(String),

    #[error("model validation error in {field}: {message}")]
    Validation { field: String, message: String },
}

impl RegistryError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        RegistryError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Errors from choosing a provider or resolving a model reference.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResolveError {
    #[error("provider '{provider}' has no credential (set {env_var})")]
    CredentialMissing { provider: String, env_var: String },

    #[error("unknown provider: '{0}'")]
    UnknownProvider(String),
}

/// Recoverable per-tool failures.
///
/// These never abort an orchestration session; they are rendered into a
/// failure line and fed back to the model.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ToolError {
    #[error("invalid {tool} arguments: {message}")]
    Parse { tool: String, message: String },

    #[error("{message}")]
    Execution { tool: String, message: String },

    #[error("unknown tool: '{0}'")]
    UnknownTool(String),
}

impl ToolError {
    pub fn parse(tool: impl Into<String>, message: impl Into<String>) -> Self {
        ToolError::Parse {
            tool: tool.into(),
            message: message.into(),
        }
    }

    pub fn execution(tool: impl Into<String>, message: impl Into<String>) -> Self {
        ToolError::Execution {
            tool: tool.into(),
            message: message.into(),
        }
    }
}
