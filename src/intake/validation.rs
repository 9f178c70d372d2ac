//! Answer validation and termination detection.
//!
//! Every function here is pure. `validate_answer` dispatches on the step key
//! and returns the normalized value to store, or the reason for rejecting it.

use std::sync::LazyLock;

use regex::Regex;

use super::state::{Answer, RawAnswer};
use super::steps::{Category, StepKey};
use crate::error::ValidationError;

/// Words that end the conversation when they appear anywhere in an answer.
pub const END_KEYWORDS: [&str; 5] = ["quit", "exit", "bye", "cancel", "end"];

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\w.-]+@[\w.-]+\.\w+$").expect("email pattern is a valid regex")
});

/// Case-insensitive substring match against [`END_KEYWORDS`].
///
/// "Excitement" matches because it contains "exit".
pub fn is_termination(text: &str) -> bool {
    let lowered = text.to_lowercase();
    END_KEYWORDS.iter().any(|kw| lowered.contains(kw))
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Only digits count; everything else is formatting.
pub fn is_valid_phone(phone: &str) -> bool {
    let digits = phone.chars().filter(char::is_ascii_digit).count();
    (7..=15).contains(&digits)
}

/// Years of experience: any integer >= 0, with no width limit.
///
/// A leading `+` is allowed, and so is `-` when only zeros follow it.
pub fn is_valid_experience(exp: &str) -> bool {
    let exp = exp.trim();
    let (negative, digits) = match exp.as_bytes().first() {
        Some(b'+') => (false, &exp[1..]),
        Some(b'-') => (true, &exp[1..]),
        _ => (false, exp),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    !negative || digits.bytes().all(|b| b == b'0')
}

/// Split on commas, trim, drop empties. Positional duplicates are kept.
pub fn split_tech_stack(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

/// Resolve selected labels against the closed category set, keeping order.
pub fn parse_categories(selected: &[String]) -> Result<Vec<Category>, ValidationError> {
    if selected.is_empty() {
        return Err(ValidationError::NoCategories);
    }
    selected
        .iter()
        .map(|label| {
            Category::from_label(label.trim())
                .ok_or_else(|| ValidationError::UnknownCategory(label.clone()))
        })
        .collect()
}

/// Validate one raw answer for `key`, returning the value to store.
pub fn validate_answer(key: StepKey, raw: &RawAnswer) -> Result<Answer, ValidationError> {
    if key == StepKey::Categories {
        return match raw {
            RawAnswer::Selection(selected) => {
                let categories = parse_categories(selected)?;
                Ok(Answer::List(
                    categories.iter().map(|c| c.label().to_string()).collect(),
                ))
            }
            RawAnswer::Text(_) => Err(ValidationError::NoCategories),
        };
    }

    let RawAnswer::Text(text) = raw else {
        return Err(ValidationError::ExpectedText);
    };

    match key {
        StepKey::Email if !is_valid_email(text) => Err(ValidationError::InvalidEmail),
        StepKey::Phone if !is_valid_phone(text) => Err(ValidationError::InvalidPhone),
        StepKey::Experience if !is_valid_experience(text) => {
            Err(ValidationError::InvalidExperience)
        }
        StepKey::Experience => Ok(Answer::Text(text.trim().to_string())),
        StepKey::TechStack => {
            let techs = split_tech_stack(text);
            if techs.is_empty() {
                Err(ValidationError::EmptyTechStack)
            } else {
                Ok(Answer::List(techs))
            }
        }
        // TODO: decide whether blank name/position/location should be rejected.
        _ => Ok(Answer::Text(text.clone())),
    }
}
