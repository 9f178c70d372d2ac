//! The fixed candidate-intake step sequence and the closed category set.

use serde::{Deserialize, Serialize};

/// Storage key for one intake step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKey {
    Name,
    Email,
    Phone,
    Experience,
    Position,
    Location,
    TechStack,
    Categories,
}

impl StepKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Experience => "experience",
            Self::Position => "position",
            Self::Location => "location",
            Self::TechStack => "tech_stack",
            Self::Categories => "categories",
        }
    }
}

impl std::fmt::Display for StepKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What kind of answer a step takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerShape {
    FreeText,
    MultiSelect,
}

/// One question in the intake sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub question: &'static str,
    pub key: StepKey,
    pub shape: AnswerShape,
}

/// Number of steps in the intake sequence.
pub const TOTAL_STEPS: usize = 8;

/// The intake sequence, in the order it is asked.
pub static STEPS: [Step; TOTAL_STEPS] = [
    Step {
        question: "What is your full name?",
        key: StepKey::Name,
        shape: AnswerShape::FreeText,
    },
    Step {
        question: "Your email address?",
        key: StepKey::Email,
        shape: AnswerShape::FreeText,
    },
    Step {
        question: "Your phone number?",
        key: StepKey::Phone,
        shape: AnswerShape::FreeText,
    },
    Step {
        question: "How many years of professional experience do you have?",
        key: StepKey::Experience,
        shape: AnswerShape::FreeText,
    },
    Step {
        question: "Which position(s) are you interested in?",
        key: StepKey::Position,
        shape: AnswerShape::FreeText,
    },
    Step {
        question: "Where are you currently located?",
        key: StepKey::Location,
        shape: AnswerShape::FreeText,
    },
    Step {
        question: "List your tech stack (comma-separated, e.g., Python, React, SQL):",
        key: StepKey::TechStack,
        shape: AnswerShape::FreeText,
    },
    Step {
        question: "Select categories you are interested in assignments for:",
        key: StepKey::Categories,
        shape: AnswerShape::MultiSelect,
    },
];

/// Assignment categories a candidate can pick from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Backend Development")]
    BackendDevelopment,
    #[serde(rename = "Frontend Development")]
    FrontendDevelopment,
    #[serde(rename = "Data Science")]
    DataScience,
    #[serde(rename = "DevOps")]
    DevOps,
    #[serde(rename = "Mobile Development")]
    MobileDevelopment,
    #[serde(rename = "Machine Learning")]
    MachineLearning,
    #[serde(rename = "Cloud Computing")]
    CloudComputing,
}

impl Category {
    /// Every category, in display order.
    pub const ALL: [Category; 7] = [
        Self::BackendDevelopment,
        Self::FrontendDevelopment,
        Self::DataScience,
        Self::DevOps,
        Self::MobileDevelopment,
        Self::MachineLearning,
        Self::CloudComputing,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::BackendDevelopment => "Backend Development",
            Self::FrontendDevelopment => "Frontend Development",
            Self::DataScience => "Data Science",
            Self::DevOps => "DevOps",
            Self::MobileDevelopment => "Mobile Development",
            Self::MachineLearning => "Machine Learning",
            Self::CloudComputing => "Cloud Computing",
        }
    }

    /// Exact label match.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.label() == label)
    }

    /// Labels of every category, in display order.
    pub fn labels() -> Vec<&'static str> {
        Self::ALL.iter().map(Category::label).collect()
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_follow_fixed_order() {
        let keys: Vec<StepKey> = STEPS.iter().map(|s| s.key).collect();
        assert_eq!(
            keys,
            vec![
                StepKey::Name,
                StepKey::Email,
                StepKey::Phone,
                StepKey::Experience,
                StepKey::Position,
                StepKey::Location,
                StepKey::TechStack,
                StepKey::Categories,
            ]
        );
        assert_eq!(TOTAL_STEPS, 8);
    }

    #[test]
    fn only_categories_is_multi_select() {
        for step in STEPS.iter() {
            let expected = if step.key == StepKey::Categories {
                AnswerShape::MultiSelect
            } else {
                AnswerShape::FreeText
            };
            assert_eq!(step.shape, expected, "{} has the wrong shape", step.key);
        }
    }

    #[test]
    fn display_matches_serde() {
        for step in STEPS.iter() {
            let json = serde_json::to_string(&step.key).unwrap();
            assert_eq!(json, format!("\"{}\"", step.key));
        }
    }

    #[test]
    fn category_labels_roundtrip() {
        for category in Category::ALL {
            assert_eq!(Category::from_label(category.label()), Some(category));
            let json = serde_json::to_string(&category).unwrap();
            assert_eq!(json, format!("\"{}\"", category.label()));
        }
        assert_eq!(Category::from_label("backend development"), None);
        assert_eq!(Category::from_label("Game Development"), None);
    }
}
