//! Question and answer-option value types.
//!
//! # Invariants
//! - `Question::id` is assigned by the store and never changes afterwards.
//! - `options` keeps insertion order; the store reads them back the same way.

use serde::{Deserialize, Serialize};

/// Store-assigned question identifier (SQLite rowid).
pub type QuestionId = i64;

/// A quiz prompt with its ordered answer choices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Zero until the question has been persisted. Ignored on create.
    #[serde(default)]
    pub id: QuestionId,
    pub body: String,
    #[serde(default)]
    pub options: Vec<QuestionOption>,
}

/// One answer choice. Any number of options may be marked correct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOption {
    pub body: String,
    pub correct: bool,
}

impl Question {
    /// Builds an unsaved question; the store assigns `id` on create.
    pub fn new(body: impl Into<String>, options: Vec<QuestionOption>) -> Self {
        Self {
            id: 0,
            body: body.into(),
            options,
        }
    }

    /// Options flagged as correct, in stored order.
    pub fn correct_options(&self) -> impl Iterator<Item = &QuestionOption> {
        self.options.iter().filter(|option| option.correct)
    }
}

impl QuestionOption {
    pub fn new(body: impl Into<String>, correct: bool) -> Self {
        Self {
            body: body.into(),
            correct,
        }
    }
}
