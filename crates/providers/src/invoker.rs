//! Generation invoker — ordered model fallback with typed error
//! classification.
//!
//! Walks a fixed priority list of model identifiers against one LLM client.
//! A rate/quota class error advances to the next candidate; any other error
//! stops the chain immediately and is returned to the caller. One success
//! ends the walk.

use std::sync::Arc;

use async_trait::async_trait;
use deskmate_core::error::{ErrorClass, GenerationError};
use deskmate_core::llm::{ChatRequest, ChatTurn, Generator, LlmClient};
use deskmate_core::session::Turn;
use tracing::{info, warn};

/// Drives generation across an ordered list of candidate models.
pub struct GenerationInvoker {
    client: Arc<dyn LlmClient>,
    models: Vec<String>,
    max_tokens: Option<u32>,
}

impl GenerationInvoker {
    /// Create an invoker over a client and a priority-ordered model list.
    pub fn new(client: Arc<dyn LlmClient>, models: Vec<String>) -> Self {
        Self {
            client,
            models,
            max_tokens: None,
        }
    }

    /// Cap tokens per generated reply.
    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    /// Number of candidate models.
    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

#[async_trait]
impl Generator for GenerationInvoker {
    /// Generate a reply for the new utterance.
    ///
    /// The composite prompt is persona/system instructions plus the labeled
    /// context block (when non-empty), followed by prior turns mapped to the
    /// model role vocabulary, followed by the utterance.
    async fn generate(
        &self,
        persona: &str,
        context: &str,
        history: &[Turn],
        utterance: &str,
    ) -> Result<String, GenerationError> {
        let system = if context.is_empty() {
            persona.to_string()
        } else {
            format!("{persona}\n\n{context}")
        };
        let history: Vec<ChatTurn> = history.iter().map(ChatTurn::from).collect();

        let mut last_error =
            GenerationError::NotConfigured("no model candidates configured".into());

        for (i, model) in self.models.iter().enumerate() {
            info!(
                model = %model,
                attempt = i + 1,
                total = self.models.len(),
                "Trying model"
            );

            let request = ChatRequest {
                model: model.clone(),
                system: system.clone(),
                history: history.clone(),
                message: utterance.to_string(),
                max_tokens: self.max_tokens,
            };

            match self.client.complete(request).await {
                Ok(response) => return Ok(response.text),
                Err(e) => match e.class() {
                    ErrorClass::Retryable => {
                        warn!(model = %model, error = %e, "Model rate/quota limited, trying next");
                        last_error = e;
                    }
                    ErrorClass::Fatal => {
                        warn!(model = %model, error = %e, "Model failed fatally, stopping");
                        return Err(e);
                    }
                },
            }
        }

        Err(last_error)
    }
}
