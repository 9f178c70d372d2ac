//! Error types for Talent Scout.

use std::time::Duration;

use uuid::Uuid;

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),
}

/// LLM provider errors.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Provider {provider} request failed: {reason}")]
    RequestFailed { provider: String, reason: String },

    #[error("Provider {provider} rate limited, retry after {retry_after:?}")]
    RateLimited {
        provider: String,
        retry_after: Option<Duration>,
    },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },

    #[error("Authentication failed for provider {provider}")]
    AuthFailed { provider: String },

    #[error("Quota exceeded for provider {provider}: {reason}")]
    QuotaExceeded { provider: String, reason: String },

    #[error("Provider {provider} timed out")]
    Timeout { provider: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Why a candidate answer was rejected. The messages are shown to the
/// candidate as-is.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please enter a valid email address.")]
    InvalidEmail,

    #[error("Please enter a valid phone number.")]
    InvalidPhone,

    #[error("Please enter valid years of experience (non-negative integer).")]
    InvalidExperience,

    #[error("Please specify at least one technology in your tech stack.")]
    EmptyTechStack,

    #[error("Please select at least one category.")]
    NoCategories,

    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("Please type your answer as text.")]
    ExpectedText,
}

/// Session lookup and lifecycle errors.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Session {id} not found")]
    NotFound { id: Uuid },

    #[error("Session {id} is already {state}, no further answers accepted")]
    Closed { id: Uuid, state: String },
}
