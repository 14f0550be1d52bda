//! Category-rotating question order
//!
//! Questions are grouped into three broad bands, shuffled within each band
//! and then dealt out round-robin (Programming, Aptitude, Core Tech) so that
//! consecutive questions rarely share a subject. Empty bands are skipped and
//! the rotation continues until every band is used up.

use enum_map::{Enum, EnumMap};
use itertools::Itertools;
use serde::Serialize;

use crate::catalog::Question;

/// Broad subject band used for rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Enum, Serialize, derive_more::Display)]
pub enum Category {
    /// Programming languages and concepts
    Programming,
    /// Aptitude and reasoning puzzles
    Aptitude,
    /// Everything else: systems, algorithms, web, hardware
    #[display("Core Tech")]
    CoreTech,
}

impl Category {
    /// Rotation order
    pub const ROTATION: [Category; 3] = [Self::Programming, Self::Aptitude, Self::CoreTech];

    /// Maps a question's category label to its band
    ///
    /// Unknown labels fall into [`Category::CoreTech`].
    pub fn classify(label: &str) -> Self {
        match label {
            "Python" | "Programming" | "Computer Science" | "Programming Concepts" => {
                Self::Programming
            }
            "Aptitude" | "Reasoning" | "Logical Reasoning" | "Coding-Decoding"
            | "Clock Problems" => Self::Aptitude,
            _ => Self::CoreTech,
        }
    }
}

/// Number of questions in each band
pub type Distribution = EnumMap<Category, usize>;

/// Produces the play order for a question set
///
/// The result is a permutation of the input.
pub fn shuffle(questions: &[Question]) -> Vec<Question> {
    let mut bands: EnumMap<Category, Vec<Question>> = EnumMap::default();
    for question in questions {
        bands[Category::classify(&question.category)].push(question.clone());
    }
    for band in bands.values_mut() {
        fastrand::shuffle(band);
    }

    let mut dealers = Category::ROTATION
        .into_iter()
        .map(|category| std::mem::take(&mut bands[category]).into_iter())
        .collect_vec();

    let mut order = Vec::with_capacity(questions.len());
    while order.len() < questions.len() {
        for dealer in &mut dealers {
            if let Some(question) = dealer.next() {
                order.push(question);
            }
        }
    }

    tracing::debug!(count = order.len(), "question order shuffled");
    order
}

/// Counts how many questions fall into each band
pub fn category_distribution(questions: &[Question]) -> Distribution {
    let mut distribution = Distribution::default();
    for question in questions {
        distribution[Category::classify(&question.category)] += 1;
    }
    distribution
}
