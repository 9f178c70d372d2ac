//! OpenAI chat-completions provider over `reqwest`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::error::LlmError;
use crate::llm::provider::{CompletionRequest, CompletionResponse, FinishReason, LlmProvider};

const PROVIDER: &str = "openai";

/// Calls `{base_url}/chat/completions` with a bearer credential.
pub struct OpenAiProvider {
    http: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    model: String,
}

impl OpenAiProvider {
    pub fn new(
        api_key: SecretString,
        base_url: &str,
        model: &str,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::RequestFailed {
                provider: PROVIDER.to_string(),
                reason: format!("Failed to build HTTP client: {e}"),
            })?;
        Ok(Self {
            http,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let mut body = json!({
            "model": self.model,
            "messages": request.messages,
            "n": 1,
        });
        if let Some(max_tokens) = request.max_tokens {
            body["max_tokens"] = json!(max_tokens);
        }
        if let Some(temperature) = request.temperature {
            body["temperature"] = json!(temperature);
        }

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout {
                        provider: PROVIDER.to_string(),
                    }
                } else {
                    LlmError::RequestFailed {
                        provider: PROVIDER.to_string(),
                        reason: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs);
        let payload = response
            .text()
            .await
            .map_err(|e| body_read_error(&e))?;

        if !status.is_success() {
            return Err(map_status_error(status, &payload, retry_after));
        }

        let parsed = parse_completion(&payload)?;
        debug!(
            model = %self.model,
            input_tokens = parsed.input_tokens,
            output_tokens = parsed.output_tokens,
            "Completion received"
        );
        Ok(parsed)
    }
}

fn body_read_error(e: &reqwest::Error) -> LlmError {
    if e.is_timeout() {
        LlmError::Timeout {
            provider: PROVIDER.to_string(),
        }
    } else {
        LlmError::RequestFailed {
            provider: PROVIDER.to_string(),
            reason: format!("Failed to read response body: {e}"),
        }
    }
}

/// Turn a non-success HTTP status into the matching `LlmError`.
fn map_status_error(status: StatusCode, payload: &str, retry_after: Option<Duration>) -> LlmError {
    let detail = extract_api_error(payload);
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => LlmError::AuthFailed {
            provider: PROVIDER.to_string(),
        },
        StatusCode::TOO_MANY_REQUESTS if detail.contains("quota") => LlmError::QuotaExceeded {
            provider: PROVIDER.to_string(),
            reason: detail,
        },
        StatusCode::TOO_MANY_REQUESTS => LlmError::RateLimited {
            provider: PROVIDER.to_string(),
            retry_after,
        },
        _ => LlmError::RequestFailed {
            provider: PROVIDER.to_string(),
            reason: format!("HTTP {status}: {detail}"),
        },
    }
}

/// Pull `error.message` out of an API error body, or fall back to the raw text.
fn extract_api_error(payload: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(payload)
        .map(|body| body.error.message)
        .unwrap_or_else(|_| payload.trim().to_string())
}

fn parse_completion(payload: &str) -> Result<CompletionResponse, LlmError> {
    let parsed: ChatCompletion = serde_json::from_str(payload)?;
    let choice = parsed
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| LlmError::InvalidResponse {
            provider: PROVIDER.to_string(),
            reason: "response contained no choices".to_string(),
        })?;
    let content = choice
        .message
        .content
        .ok_or_else(|| LlmError::InvalidResponse {
            provider: PROVIDER.to_string(),
            reason: "choice had no message content".to_string(),
        })?;
    let usage = parsed.usage.unwrap_or_default();

    Ok(CompletionResponse {
        content,
        input_tokens: usage.prompt_tokens,
        output_tokens: usage.completion_tokens,
        finish_reason: FinishReason::from_wire(choice.finish_reason.as_deref()),
        response_id: parsed.id,
    })
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    id: Option<String>,
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}
