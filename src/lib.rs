//! Talent Scout: guided candidate intake with generated interview material.

pub mod channels;
pub mod config;
pub mod error;
pub mod intake;
pub mod llm;
