//! LLM backend implementations and the generation fallback driver.
//!
//! `OpenAiCompatClient` speaks the `/chat/completions` dialect that covers
//! OpenRouter, OpenAI, and most proxy endpoints. `GenerationInvoker` sits
//! above it and walks an ordered list of model identifiers, advancing only
//! on rate/quota errors.

pub mod invoker;
pub mod openai_compat;

pub use invoker::GenerationInvoker;
pub use openai_compat::OpenAiCompatClient;

use deskmate_config::AppConfig;

/// Build the generation invoker from configuration.
pub fn build_from_config(config: &AppConfig) -> GenerationInvoker {
    let client = OpenAiCompatClient::new(
        "openrouter",
        &config.llm.api_url,
        config.llm.api_key.as_deref().unwrap_or_default(),
    );
    GenerationInvoker::new(std::sync::Arc::new(client), config.llm.models.clone())
        .with_max_tokens(config.llm.max_tokens)
}
