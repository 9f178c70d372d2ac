//! Presentation shells for the intake conversation.

pub mod cli;

pub use cli::{CliChannel, parse_cli_answer};
