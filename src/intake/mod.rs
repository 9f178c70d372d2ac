//! Candidate intake: a guided, step-by-step profile conversation.
//!
//! The engine asks a fixed sequence of questions, validates each answer,
//! and once the profile is complete asks the LLM for interview questions
//! (one call per technology) and assignments (one call per category).

pub mod engine;
pub mod gateway;
pub mod manager;
pub mod prompts;
pub mod routes;
pub mod state;
pub mod steps;
pub mod validation;

pub use engine::{ConversationEngine, SessionView, StepView, SubmitOutcome};
pub use gateway::GenerationGateway;
pub use manager::{SessionManager, spawn_prune_task};
pub use routes::{IntakeRouteState, intake_routes};
pub use state::{Answer, AssignmentRecord, FAREWELL_MESSAGE, Phase, QuestionSet, RawAnswer, SessionState};
pub use steps::{AnswerShape, Category, STEPS, Step, StepKey, TOTAL_STEPS};
