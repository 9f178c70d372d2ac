//! Configuration types.

use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;
use crate::llm::LlmConfig;

/// Default OpenAI-compatible endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default completion model.
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// How long an ended or finished session stays readable before it is pruned.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(3600);

/// Generation parameters shared by every orchestration call.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationConfig {
    /// How many interview questions to request per technology.
    pub questions_per_tech: u32,
    /// Max tokens for a question-generation call.
    pub question_max_tokens: u32,
    /// Max tokens for an assignment-generation call.
    pub assignment_max_tokens: u32,
    /// Sampling temperature for both call kinds.
    pub temperature: f32,
    /// Fan out per-tech and per-category calls instead of running them one by one.
    pub parallel: bool,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            questions_per_tech: 3,
            question_max_tokens: 400,
            assignment_max_tokens: 350,
            temperature: 0.3,
            parallel: false,
        }
    }
}

/// Process-wide configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct ScoutConfig {
    pub api_key: SecretString,
    pub base_url: String,
    pub model: String,
    pub port: u16,
    pub request_timeout: Duration,
    pub session_ttl: Duration,
    pub generation: GenerationConfig,
}

impl ScoutConfig {
    /// Build config from environment variables.
    ///
    /// A missing `OPENAI_API_KEY` is the only hard failure.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("OPENAI_API_KEY")
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar("OPENAI_API_KEY".to_string()))?;

        let base_url = lookup("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let model = lookup("TALENT_SCOUT_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let port: u16 = lookup("TALENT_SCOUT_PORT")
            .and_then(|s| s.parse().ok())
            .unwrap_or(8080);

        let timeout_secs: u64 = lookup("TALENT_SCOUT_REQUEST_TIMEOUT_SECS")
            .and_then(|s| s.parse().ok())
            .unwrap_or(60);

        let session_ttl = lookup("TALENT_SCOUT_SESSION_TTL_SECS")
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_SESSION_TTL);

        let defaults = GenerationConfig::default();
        let questions_per_tech: u32 = lookup("TALENT_SCOUT_QUESTIONS_PER_TECH")
            .and_then(|s| s.parse().ok())
            .filter(|n| *n > 0)
            .unwrap_or(defaults.questions_per_tech);

        let parallel = lookup("TALENT_SCOUT_PARALLEL_GENERATION")
            .map(|s| matches!(s.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Self {
            api_key: SecretString::from(api_key),
            base_url,
            model,
            port,
            request_timeout: Duration::from_secs(timeout_secs),
            session_ttl,
            generation: GenerationConfig {
                questions_per_tech,
                parallel,
                ..defaults
            },
        })
    }

    /// The subset the LLM provider needs.
    pub fn llm_config(&self) -> LlmConfig {
        LlmConfig {
            api_key: self.api_key.clone(),
            base_url: self.base_url.clone(),
            model: self.model.clone(),
            request_timeout: self.request_timeout,
        }
    }
}
