//! Generation gateway: turns intake requests into LLM calls and normalizes
//! the output.
//!
//! The plain `generate_*` methods never fail. A provider error becomes a
//! descriptive string returned in place of the content, so one bad call can
//! not block the rest of the batch. Callers that need to tell failures apart
//! use the `try_generate_*` variants.

use std::sync::Arc;

use tracing::{debug, warn};

use super::prompts::{assignment_prompt, tech_questions_prompt};
use crate::config::GenerationConfig;
use crate::error::LlmError;
use crate::llm::{ChatMessage, CompletionRequest, FinishReason, LlmProvider};

/// Characters stripped from the front of each generated question line.
fn is_list_marker(c: char) -> bool {
    c.is_ascii_digit() || c.is_whitespace() || matches!(c, '.' | ')' | ':' | '-' | '*' | '•')
}

/// Split a completion into clean question lines.
///
/// Never returns an empty list: if nothing survives cleaning, the raw
/// completion comes back as the only element.
pub fn clean_question_lines(raw: &str) -> Vec<String> {
    let questions: Vec<String> = raw
        .lines()
        .map(|line| line.trim_start_matches(is_list_marker).trim())
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect();

    if questions.is_empty() {
        vec![raw.to_string()]
    } else {
        questions
    }
}

/// Boundary between the intake flow and the text-generation service.
pub struct GenerationGateway {
    llm: Arc<dyn LlmProvider>,
    config: GenerationConfig,
}

impl GenerationGateway {
    pub fn new(llm: Arc<dyn LlmProvider>, config: GenerationConfig) -> Self {
        Self { llm, config }
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    async fn complete(&self, prompt: String, max_tokens: u32) -> Result<String, LlmError> {
        let request = CompletionRequest::new(vec![ChatMessage::system(prompt)])
            .with_max_tokens(max_tokens)
            .with_temperature(self.config.temperature);
        let response = self.llm.complete(request).await?;
        debug!(
            model = self.llm.model_name(),
            response_id = response.response_id.as_deref().unwrap_or("-"),
            output_tokens = response.output_tokens,
            "Generation call completed"
        );
        match response.finish_reason {
            FinishReason::Length => warn!(
                max_tokens,
                response_id = response.response_id.as_deref().unwrap_or("-"),
                "Completion hit the token cap, output may be cut short"
            ),
            FinishReason::ContentFilter => warn!(
                response_id = response.response_id.as_deref().unwrap_or("-"),
                "Completion was stopped by the content filter"
            ),
            FinishReason::Stop | FinishReason::Unknown => {}
        }
        Ok(response.content)
    }

    /// Generate interview questions for one technology.
    pub async fn try_generate_questions(
        &self,
        tech: &str,
        years: &str,
    ) -> Result<Vec<String>, LlmError> {
        let prompt = tech_questions_prompt(tech, years, self.config.questions_per_tech);
        let content = self.complete(prompt, self.config.question_max_tokens).await?;
        Ok(clean_question_lines(&content))
    }

    /// Fail-soft form of [`try_generate_questions`](Self::try_generate_questions).
    pub async fn generate_questions(&self, tech: &str, years: &str) -> Vec<String> {
        match self.try_generate_questions(tech, years).await {
            Ok(questions) => questions,
            Err(e) => {
                warn!(tech = tech, error = %e, "Question generation failed");
                vec![format!("Error generating questions for {tech}: {e}")]
            }
        }
    }

    /// Generate one assignment for a category.
    pub async fn try_generate_assignment(&self, category: &str) -> Result<String, LlmError> {
        let prompt = assignment_prompt(category);
        let content = self
            .complete(prompt, self.config.assignment_max_tokens)
            .await?;
        Ok(content.trim().to_string())
    }

    /// Fail-soft form of [`try_generate_assignment`](Self::try_generate_assignment).
    pub async fn generate_assignment(&self, category: &str) -> String {
        match self.try_generate_assignment(category).await {
            Ok(assignment) => assignment,
            Err(e) => {
                warn!(category = category, error = %e, "Assignment generation failed");
                format!("Error generating assignment for {category}: {e}")
            }
        }
    }
}
