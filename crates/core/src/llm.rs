//! LlmClient trait — the abstraction over the generation backend.
//!
//! An LlmClient knows how to send one composite request (persona + history +
//! new message) to a specific model identifier and return the generated text.
//! Model selection and retry/fallback live above this trait, in the
//! generation invoker.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::GenerationError;
use crate::session::{Role, Turn};

/// One prior turn, mapped to the external model's role vocabulary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    /// "user" or "assistant"
    pub role: String,
    pub text: String,
}

impl From<&Turn> for ChatTurn {
    fn from(turn: &Turn) -> Self {
        Self {
            role: match turn.role {
                Role::User => "user".into(),
                Role::Assistant => "assistant".into(),
            },
            text: turn.text.clone(),
        }
    }
}

/// A single generation request against one model identifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The model identifier to use (e.g. "google/gemini-2.0-flash-001")
    pub model: String,

    /// Persona / system instructions, with any context block already
    /// appended by the caller.
    pub system: String,

    /// Prior turns in append order.
    pub history: Vec<ChatTurn>,

    /// The new user utterance.
    pub message: String,

    /// Maximum tokens to generate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

/// A completed generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// The generated reply text.
    pub text: String,

    /// Which model actually responded.
    pub model: String,
}

/// The generation backend trait.
///
/// Implementations perform exactly one outbound request per call and mutate
/// nothing locally on failure.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// A human-readable name for this backend (e.g. "openrouter").
    fn name(&self) -> &str;

    /// Send one request and get the complete reply.
    async fn complete(
        &self,
        request: ChatRequest,
    ) -> std::result::Result<ChatResponse, GenerationError>;
}

/// The seam the chat engine generates through: one composite prompt
/// (persona + context + history + utterance) in, reply text out.
///
/// Model selection, retry, and fallback live behind this trait so the
/// engine never sees model identifiers.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(
        &self,
        persona: &str,
        context: &str,
        history: &[Turn],
        utterance: &str,
    ) -> std::result::Result<String, GenerationError>;
}
