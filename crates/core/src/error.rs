//! Error types for the Deskmate domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

/// The top-level error type for all Deskmate operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Collaborator error: {0}")]
    Collaborator(#[from] CollaboratorError),

    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// A failure pulling from an external data collaborator (LMS, calendar,
/// search, weather). These never propagate past the context assembler or the
/// proactive monitor: they are recovered locally as a sentinel string.
#[derive(Debug, Clone, Error)]
pub enum CollaboratorError {
    #[error("Network failure: {0}")]
    Network(String),

    #[error("Authentication rejected: {0}")]
    Auth(String),

    #[error("Malformed response: {0}")]
    Parse(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),
}

impl CollaboratorError {
    /// The human-readable sentinel included in an assembled context block in
    /// place of the payload. The model sees this and can narrate the outage.
    pub fn sentinel(&self) -> String {
        match self {
            Self::Network(_) | Self::Unavailable(_) => "Offline".into(),
            Self::Auth(_) => "Access Denied".into(),
            Self::Parse(reason) => format!("Unreadable response ({reason})"),
        }
    }
}

/// Coarse classification used by the generation fallback driver: retry the
/// next model identifier, or stop immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Rate/quota class — worth trying the next model in the chain.
    Retryable,
    /// Anything else — surfaced to the caller after one attempt.
    Fatal,
}

/// A failure from the LLM generation call.
#[derive(Debug, Clone, Error)]
pub enum GenerationError {
    #[error("Rate limited by model endpoint, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Quota exhausted: {0}")]
    QuotaExhausted(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("API request failed: {message} (status: {status})")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Model returned an empty reply")]
    Empty,

    #[error("No model candidates configured: {0}")]
    NotConfigured(String),
}

impl GenerationError {
    /// Classify for the fallback driver. Only the rate/quota class advances
    /// the model chain; everything else stops it.
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::RateLimited { .. } | Self::QuotaExhausted(_) => ErrorClass::Retryable,
            _ => ErrorClass::Fatal,
        }
    }
}
