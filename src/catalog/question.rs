//! Question bank
//!
//! Multiple-choice questions with exactly four options. The bank is read
//! from JSON and validated entry by entry; any malformed question is a
//! fatal load error.

use garde::Validate;
use serde::{Deserialize, Serialize};

use super::{Error, validate_entries};
use crate::constants::question::{
    MAX_ANSWER_INDEX, MAX_CATEGORY_LENGTH, MAX_OPTION_LENGTH, MAX_TEXT_LENGTH, OPTION_COUNT,
};

/// The question bank shipped with the crate
const BUNDLED_QUESTIONS: &str = include_str!("../../data/questions.json");

/// How hard a question is meant to be
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
pub enum Difficulty {
    /// Easy
    Easy,
    /// Medium
    Medium,
    /// Hard
    Hard,
}

/// A single multiple-choice question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Question {
    /// Identifier, unique within the bank
    #[garde(skip)]
    pub id: u32,
    /// The prompt read out by the host
    #[garde(length(min = 1, max = MAX_TEXT_LENGTH))]
    pub text: String,
    /// The answer options, in display order
    #[garde(length(min = OPTION_COUNT, max = OPTION_COUNT), inner(length(min = 1, max = MAX_OPTION_LENGTH)))]
    pub options: Vec<String>,
    /// Index of the correct option
    #[garde(range(max = MAX_ANSWER_INDEX))]
    pub answer: usize,
    /// Category label, mapped to a rotation band by the shuffler
    #[garde(length(min = 1, max = MAX_CATEGORY_LENGTH))]
    pub category: String,
    /// Difficulty label
    #[garde(skip)]
    pub difficulty: Difficulty,
}

impl Question {
    /// The text of the correct option
    pub fn correct_option(&self) -> Option<&str> {
        self.options.get(self.answer).map(String::as_str)
    }

    /// Letter label (`A`–`D`) of the option at `index`
    pub fn option_label(index: usize) -> Option<char> {
        u8::try_from(index)
            .ok()
            .filter(|i| usize::from(*i) < OPTION_COUNT)
            .map(|i| char::from(b'A' + i))
    }
}

/// A validated, immutable set of questions
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionBank {
    questions: Vec<Question>,
}

impl QuestionBank {
    /// Builds a bank after validating every question
    ///
    /// # Errors
    ///
    /// Returns [`Error::Invalid`] for the first malformed question,
    /// [`Error::DuplicateId`] for a repeated identifier and
    /// [`Error::Empty`] for an empty bank.
    pub fn new(questions: Vec<Question>) -> Result<Self, Error> {
        validate_entries("question", &questions, |q| q.id.to_string())?;
        Ok(Self { questions })
    }

    /// Parses and validates a bank from a JSON array
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] for malformed JSON, including a missing
    /// field, and the errors of [`QuestionBank::new`].
    pub fn from_json(json: &str) -> Result<Self, Error> {
        Self::new(serde_json::from_str(json)?)
    }

    /// The question bank shipped with the crate
    ///
    /// # Errors
    ///
    /// Fails only if the bundled data is corrupt.
    pub fn bundled() -> Result<Self, Error> {
        Self::from_json(BUNDLED_QUESTIONS)
    }

    /// The questions, in load order
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Number of questions
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Whether the bank has no questions (never true for a loaded bank)
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}
