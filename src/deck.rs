//! Question deck navigation
//!
//! The shuffled question order is fixed for a session; the host steps
//! through it forwards and backwards without wrapping around. The deck also
//! tracks whether the options and the correct answer are currently shown,
//! and both are hidden again whenever the host moves to another question.

use serde::{Deserialize, Serialize};

use crate::{catalog::Question, shuffler};

/// A linear cursor over the session's question order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionDeck {
    questions: Vec<Question>,
    index: usize,
    show_options: bool,
    show_answer: bool,
}

impl QuestionDeck {
    /// Builds a deck in category-rotated order
    pub fn shuffled(questions: &[Question]) -> Self {
        Self::in_order(shuffler::shuffle(questions))
    }

    /// Builds a deck that plays `questions` exactly in the given order
    pub fn in_order(questions: Vec<Question>) -> Self {
        Self {
            questions,
            index: 0,
            show_options: false,
            show_answer: false,
        }
    }

    /// The question under the cursor
    pub fn current(&self) -> Option<&Question> {
        self.questions.get(self.index)
    }

    /// Moves to the next question
    ///
    /// # Returns
    ///
    /// `false` when already on the last question
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> bool {
        if self.is_last() {
            return false;
        }
        self.index += 1;
        self.hide();
        true
    }

    /// Moves to the previous question
    ///
    /// # Returns
    ///
    /// `false` when already on the first question
    pub fn previous(&mut self) -> bool {
        if self.is_first() {
            return false;
        }
        self.index -= 1;
        self.hide();
        true
    }

    /// Goes back to the first question, keeping the order
    pub fn rewind(&mut self) {
        self.index = 0;
        self.hide();
    }

    /// Whether the cursor is on the first question
    pub fn is_first(&self) -> bool {
        self.index == 0
    }

    /// Whether the cursor is on the last question
    pub fn is_last(&self) -> bool {
        self.index + 1 >= self.questions.len()
    }

    /// Zero-based cursor position
    pub fn index(&self) -> usize {
        self.index
    }

    /// Number of questions in the deck
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Whether the deck has no questions
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// The full play order
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Whether the options are shown
    pub fn options_shown(&self) -> bool {
        self.show_options
    }

    /// Whether the correct answer is shown
    pub fn answer_shown(&self) -> bool {
        self.show_answer
    }

    /// Shows or hides the options
    pub fn toggle_options(&mut self) -> bool {
        self.show_options = !self.show_options;
        self.show_options
    }

    /// Shows or hides the correct answer
    pub fn toggle_answer(&mut self) -> bool {
        self.show_answer = !self.show_answer;
        self.show_answer
    }

    fn hide(&mut self) {
        self.show_options = false;
        self.show_answer = false;
    }
}
