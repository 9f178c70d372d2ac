//! LLM integration for Talent Scout.
//!
//! The rest of the crate only sees the `LlmProvider` trait; `create_provider`
//! builds the concrete OpenAI-compatible backend from configuration.

pub mod openai;
pub mod provider;

pub use openai::OpenAiProvider;
pub use provider::*;

use std::sync::Arc;
use std::time::Duration;

use crate::error::LlmError;

/// Configuration for creating an LLM provider.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: secrecy::SecretString,
    pub base_url: String,
    pub model: String,
    pub request_timeout: Duration,
}

/// Create an LLM provider from configuration.
pub fn create_provider(config: &LlmConfig) -> Result<Arc<dyn LlmProvider>, LlmError> {
    let provider = OpenAiProvider::new(
        config.api_key.clone(),
        &config.base_url,
        &config.model,
        config.request_timeout,
    )?;
    tracing::info!("Using OpenAI-compatible endpoint (model: {})", config.model);
    Ok(Arc::new(provider))
}
