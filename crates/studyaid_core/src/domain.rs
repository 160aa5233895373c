//! crates/studyaid_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any HTTP framework or upstream API format.

use serde::{Deserialize, Serialize};

/// The kind of file a user uploaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Image,
}

/// A freshly uploaded document. Transient: it exists only long enough
/// for text extraction and is never persisted.
#[derive(Debug)]
pub struct UploadedDocument {
    pub kind: DocumentKind,
    pub bytes: Vec<u8>,
}

/// The three question formats a generated quiz may contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuestionKind {
    #[serde(rename = "multiple-choice")]
    MultipleChoice,
    #[serde(rename = "true-false")]
    TrueFalse,
    #[serde(rename = "fill-in-the-blank")]
    FillInTheBlank,
}

impl QuestionKind {
    /// Parses the wire spelling used in quiz payloads.
    pub fn from_wire(s: &str) -> Option<Self> {
        match s {
            "multiple-choice" => Some(Self::MultipleChoice),
            "true-false" => Some(Self::TrueFalse),
            "fill-in-the-blank" => Some(Self::FillInTheBlank),
            _ => None,
        }
    }
}

/// A single quiz question.
///
/// `options` is empty for fill-in-the-blank questions and non-empty for the
/// other two kinds; decoding enforces this.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    #[serde(rename = "question")]
    pub prompt: String,
    pub options: Vec<String>,
    /// Never serialized: quiz answers stay server-side until scoring.
    #[serde(skip_serializing)]
    pub answer: String,
}

/// A single front/back study card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flashcard {
    pub front: String,
    pub back: String,
}

/// A fully-parsed generated artifact. Parsing is all-or-nothing: a value of
/// this type is never partially valid.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StructuredContent {
    Explanation { html: String },
    Quiz { questions: Vec<Question> },
    Flashcards { cards: Vec<Flashcard> },
    ConceptMap { html: String },
}

/// Where a study resource came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Video,
    Article,
}

/// A single external study resource (video or article).
#[derive(Debug, Clone, Serialize)]
pub struct Resource {
    pub kind: ResourceKind,
    pub title: String,
    pub url: String,
}

/// A qualitative reward level derived from a quiz percentage score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeTier {
    TopicMaster,
    ExpertLearner,
    SolidFoundation,
}

impl BadgeTier {
    /// Computes the badge for a percentage score, if any.
    /// 100% earns the top tier, >=70% the second, >=50% the third.
    pub fn for_percentage(percentage: u32) -> Option<Self> {
        if percentage >= 100 {
            Some(Self::TopicMaster)
        } else if percentage >= 70 {
            Some(Self::ExpertLearner)
        } else if percentage >= 50 {
            Some(Self::SolidFoundation)
        } else {
            None
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::TopicMaster => "Topic Master",
            Self::ExpertLearner => "Expert Learner",
            Self::SolidFoundation => "Solid Foundation",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::TopicMaster => "Perfect score! You've mastered this topic.",
            Self::ExpertLearner => {
                "Excellent work! You have a strong grasp of the material."
            }
            Self::SolidFoundation => {
                "Good job! Keep reviewing to solidify your knowledge."
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn badge_tier_thresholds() {
        assert_eq!(BadgeTier::for_percentage(100), Some(BadgeTier::TopicMaster));
        assert_eq!(BadgeTier::for_percentage(85), Some(BadgeTier::ExpertLearner));
        assert_eq!(BadgeTier::for_percentage(70), Some(BadgeTier::ExpertLearner));
        assert_eq!(
            BadgeTier::for_percentage(50),
            Some(BadgeTier::SolidFoundation)
        );
        assert_eq!(BadgeTier::for_percentage(49), None);
        assert_eq!(BadgeTier::for_percentage(0), None);
    }

    #[test]
    fn question_kind_wire_spellings() {
        assert_eq!(
            QuestionKind::from_wire("multiple-choice"),
            Some(QuestionKind::MultipleChoice)
        );
        assert_eq!(
            QuestionKind::from_wire("true-false"),
            Some(QuestionKind::TrueFalse)
        );
        assert_eq!(
            QuestionKind::from_wire("fill-in-the-blank"),
            Some(QuestionKind::FillInTheBlank)
        );
        assert_eq!(QuestionKind::from_wire("essay"), None);
    }
}
