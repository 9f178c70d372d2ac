//! Session state for one intake conversation.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::steps::{STEPS, Step, StepKey, TOTAL_STEPS};

/// Message shown when the conversation ends, early or normally.
pub const FAREWELL_MESSAGE: &str = "Thank you for chatting with TalentScout! We'll review your \
information, your technical questions, and assignment, then contact you regarding the next steps.";

/// Macro-state of a conversation.
///
/// `Collecting` is the only non-terminal phase. `Ended` and `Finished` are
/// mutually exclusive by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Collecting,
    Ended,
    Finished,
}

impl Phase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Ended | Self::Finished)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Collecting => "collecting",
            Self::Ended => "ended",
            Self::Finished => "finished",
        };
        write!(f, "{s}")
    }
}

/// An answer as the presentation layer submits it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawAnswer {
    Text(String),
    Selection(Vec<String>),
}

impl From<&str> for RawAnswer {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

/// A validated, normalized answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    Text(String),
    List(Vec<String>),
}

impl Answer {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::List(_) => None,
        }
    }

    pub fn as_list(&self) -> &[String] {
        match self {
            Self::Text(_) => &[],
            Self::List(items) => items,
        }
    }
}

/// Generated questions for one tech-stack entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionSet {
    pub tech: String,
    pub questions: Vec<String>,
}

/// A generated assignment for one selected category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentRecord {
    pub category: String,
    pub assignment: String,
}

/// Everything the engine knows about one conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    /// Index of the current step; `TOTAL_STEPS` once every answer is in.
    pub step: usize,
    pub phase: Phase,
    pub candidate_info: BTreeMap<StepKey, Answer>,
    /// Per-tech question groups, in the order the candidate typed the techs.
    pub question_sets: Vec<QuestionSet>,
    pub assignments: Vec<AssignmentRecord>,
    pub message: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<DateTime<Utc>>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            step: 0,
            phase: Phase::default(),
            candidate_info: BTreeMap::new(),
            question_sets: Vec::new(),
            assignments: Vec::new(),
            message: String::new(),
            created_at: Utc::now(),
            closed_at: None,
        }
    }
}

impl SessionState {
    /// The step currently being asked, if still collecting.
    pub fn current_step(&self) -> Option<&'static Step> {
        if self.phase != Phase::Collecting {
            return None;
        }
        STEPS.get(self.step)
    }

    /// All answers are in but generation has not run yet.
    pub fn ready_to_finish(&self) -> bool {
        self.phase == Phase::Collecting && self.step == TOTAL_STEPS
    }

    /// Store an accepted answer and move to the next step.
    pub fn record(&mut self, key: StepKey, answer: Answer) {
        debug_assert_eq!(STEPS.get(self.step).map(|s| s.key), Some(key));
        self.candidate_info.insert(key, answer);
        self.step += 1;
    }

    pub fn end(&mut self) {
        self.phase = Phase::Ended;
        self.message = FAREWELL_MESSAGE.to_string();
        self.closed_at = Some(Utc::now());
    }

    pub fn finish(&mut self, question_sets: Vec<QuestionSet>, assignments: Vec<AssignmentRecord>) {
        self.question_sets.extend(question_sets);
        self.assignments.extend(assignments);
        self.phase = Phase::Finished;
        self.message = FAREWELL_MESSAGE.to_string();
        self.closed_at = Some(Utc::now());
    }

    /// Every generated question, flattened in tech order.
    pub fn tech_questions(&self) -> Vec<String> {
        self.question_sets
            .iter()
            .flat_map(|set| set.questions.iter().cloned())
            .collect()
    }

    /// Completion percentage for the progress indicator.
    pub fn progress_percent(&self) -> u8 {
        let percent = self.step.min(TOTAL_STEPS) * 100 / TOTAL_STEPS;
        percent as u8
    }

    pub fn answer(&self, key: StepKey) -> Option<&Answer> {
        self.candidate_info.get(&key)
    }

    /// Closed, and more than `ttl` has passed since.
    pub fn closed_longer_than(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        self.closed_at
            .and_then(|closed| (now - closed).to_std().ok())
            .is_some_and(|age| age > ttl)
    }
}
