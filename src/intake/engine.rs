//! ConversationEngine: drives one candidate through the intake steps and
//! runs generation once every answer is in.
//!
//! Each call is one atomic (validate, mutate, respond) cycle. Methods take
//! `&mut self`, so the transition into `Finished` and the generation it
//! triggers can only happen once.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::{join, join_all};
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::gateway::GenerationGateway;
use super::state::{AssignmentRecord, Phase, QuestionSet, RawAnswer, SessionState};
use super::steps::{AnswerShape, Category, Step, StepKey, TOTAL_STEPS};
use super::validation::{is_termination, validate_answer};
use crate::error::{SessionError, ValidationError};

/// Result of submitting one answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Answer stored; the next step is now current.
    Accepted,
    /// Answer refused; the same step stays current.
    Rejected(ValidationError),
    /// The candidate asked to stop.
    Ended,
    /// Last answer stored and generation has run.
    Finished,
}

/// What the presentation layer needs to render the current step.
#[derive(Debug, Clone, Serialize)]
pub struct StepView {
    pub key: StepKey,
    pub question: &'static str,
    pub shape: AnswerShape,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<&'static str>,
}

impl From<&Step> for StepView {
    fn from(step: &Step) -> Self {
        let options = match step.shape {
            AnswerShape::MultiSelect => Category::labels(),
            AnswerShape::FreeText => Vec::new(),
        };
        Self {
            key: step.key,
            question: step.question,
            shape: step.shape,
            options,
        }
    }
}

/// Snapshot of a session for rendering.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub session_id: Uuid,
    pub phase: Phase,
    pub step: usize,
    pub total_steps: usize,
    pub progress_percent: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current: Option<StepView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub tech_questions: Vec<String>,
    pub question_sets: Vec<QuestionSet>,
    pub assignments: Vec<AssignmentRecord>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<DateTime<Utc>>,
}

/// One intake conversation.
pub struct ConversationEngine {
    id: Uuid,
    state: SessionState,
    gateway: Arc<GenerationGateway>,
}

impl ConversationEngine {
    pub fn new(gateway: Arc<GenerationGateway>) -> Self {
        Self {
            id: Uuid::new_v4(),
            state: SessionState::default(),
            gateway,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    /// The step waiting for an answer, if any.
    pub fn current_step(&self) -> Option<&'static Step> {
        self.state.current_step()
    }

    /// Render-only snapshot. Never triggers a transition.
    pub fn view(&self) -> SessionView {
        let state = &self.state;
        SessionView {
            session_id: self.id,
            phase: state.phase,
            step: state.step,
            total_steps: TOTAL_STEPS,
            progress_percent: state.progress_percent(),
            current: state.current_step().map(StepView::from),
            message: (!state.message.is_empty()).then(|| state.message.clone()),
            tech_questions: state.tech_questions(),
            question_sets: state.question_sets.clone(),
            assignments: state.assignments.clone(),
            created_at: state.created_at,
            closed_at: state.closed_at,
        }
    }

    /// Submit the raw answer for the current step.
    ///
    /// Free-text input is checked for a termination keyword before the
    /// step's own validation. Accepting the final answer runs generation
    /// before this returns.
    pub async fn submit(&mut self, raw: RawAnswer) -> Result<SubmitOutcome, SessionError> {
        if self.state.phase.is_terminal() {
            warn!(session_id = %self.id, phase = %self.state.phase, "Answer submitted to closed session");
            return Err(SessionError::Closed {
                id: self.id,
                state: self.state.phase.to_string(),
            });
        }

        let Some(step) = self.state.current_step() else {
            // Every answer is already in; only generation is left.
            self.finish_if_ready().await;
            return Ok(SubmitOutcome::Finished);
        };

        if let RawAnswer::Text(text) = &raw {
            if is_termination(text) {
                self.state.end();
                info!(session_id = %self.id, step = %step.key, "Candidate ended the conversation");
                return Ok(SubmitOutcome::Ended);
            }
        }

        match validate_answer(step.key, &raw) {
            Err(reason) => {
                debug!(session_id = %self.id, step = %step.key, reason = %reason, "Answer rejected");
                Ok(SubmitOutcome::Rejected(reason))
            }
            Ok(answer) => {
                self.state.record(step.key, answer);
                info!(
                    session_id = %self.id,
                    step = %step.key,
                    progress = self.state.progress_percent(),
                    "Answer accepted"
                );
                if self.finish_if_ready().await {
                    Ok(SubmitOutcome::Finished)
                } else {
                    Ok(SubmitOutcome::Accepted)
                }
            }
        }
    }

    /// Run generation and move to `Finished` if every step is answered.
    ///
    /// Returns whether this call performed the transition. Calling it again
    /// afterwards is a no-op.
    pub async fn finish_if_ready(&mut self) -> bool {
        if !self.state.ready_to_finish() {
            return false;
        }

        let techs = self
            .state
            .answer(StepKey::TechStack)
            .map(|a| a.as_list().to_vec())
            .unwrap_or_default();
        let years = self
            .state
            .answer(StepKey::Experience)
            .and_then(|a| a.as_text())
            .unwrap_or_default()
            .to_string();
        let categories = self
            .state
            .answer(StepKey::Categories)
            .map(|a| a.as_list().to_vec())
            .unwrap_or_default();

        info!(
            session_id = %self.id,
            techs = techs.len(),
            categories = categories.len(),
            parallel = self.gateway.config().parallel,
            "Generating questions and assignments"
        );

        let (question_sets, assignments) =
            orchestrate(&self.gateway, &techs, &years, &categories).await;
        self.state.finish(question_sets, assignments);

        info!(
            session_id = %self.id,
            questions = self.state.tech_questions().len(),
            assignments = self.state.assignments.len(),
            "Intake finished"
        );
        true
    }
}

/// One question call per tech, then one assignment call per category.
///
/// In parallel mode every call is in flight at once; `join_all` keeps the
/// results in input order either way.
async fn orchestrate(
    gateway: &GenerationGateway,
    techs: &[String],
    years: &str,
    categories: &[String],
) -> (Vec<QuestionSet>, Vec<AssignmentRecord>) {
    if gateway.config().parallel {
        return join(
            join_all(techs.iter().map(|tech| question_set(gateway, tech, years))),
            join_all(categories.iter().map(|c| assignment_record(gateway, c))),
        )
        .await;
    }

    let mut question_sets = Vec::with_capacity(techs.len());
    for tech in techs {
        question_sets.push(question_set(gateway, tech, years).await);
    }
    let mut assignments = Vec::with_capacity(categories.len());
    for category in categories {
        assignments.push(assignment_record(gateway, category).await);
    }
    (question_sets, assignments)
}

async fn question_set(gateway: &GenerationGateway, tech: &str, years: &str) -> QuestionSet {
    QuestionSet {
        tech: tech.to_string(),
        questions: gateway.generate_questions(tech, years).await,
    }
}

async fn assignment_record(gateway: &GenerationGateway, category: &str) -> AssignmentRecord {
    AssignmentRecord {
        category: category.to_string(),
        assignment: gateway.generate_assignment(category).await,
    }
}
