//! Error types for the Synapse domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error type.

use thiserror::Error;

// --- Bounded context errors ---

/// Failures of the generation backend. Any of these ends the current run.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

impl ProviderError {
    /// Whether retrying the same request may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ProviderError::RateLimited { .. } | ProviderError::Timeout(_) | ProviderError::Network(_)
        )
    }
}

#[derive(Debug, Clone, Error)]
pub enum ToolError {
    #[error("unknown tool {0}")]
    NotFound(String),

    #[error("tool '{0}' is already registered")]
    DuplicateTool(String),

    #[error("{tool_name}() got an unexpected keyword argument '{argument}'")]
    UnexpectedArgument { tool_name: String, argument: String },

    #[error("{tool_name} failed: {reason}")]
    ExecutionFailed { tool_name: String, reason: String },
}

#[derive(Debug, Clone, Error)]
pub enum PolicyError {
    #[error("evaluator '{evaluator}' failed: {reason}")]
    EvaluatorFailed { evaluator: String, reason: String },

    #[error("evaluator panicked: {0}")]
    Panicked(String),

    #[error("invalid judgment: {0}")]
    InvalidJudgment(String),
}
