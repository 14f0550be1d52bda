//! Static game catalogs
//!
//! The question bank, the lifeline catalog and the dare catalog are loaded
//! once at startup and never change afterwards. Every entry is validated at
//! load time; a malformed entry aborts startup rather than reaching a live
//! game.

use std::collections::HashSet;

use garde::Validate;
use thiserror::Error;

pub mod dare;
pub mod lifeline;
pub mod question;

pub use dare::{Dare, DareKind};
pub use lifeline::{Lifeline, LifelineEffect};
pub use question::{Difficulty, Question, QuestionBank};

/// Errors raised while loading a catalog
#[derive(Debug, Error)]
pub enum Error {
    /// The catalog is not well-formed JSON
    #[error("malformed catalog data: {0}")]
    Parse(#[from] serde_json::Error),
    /// An entry failed validation
    #[error("invalid entry at index {index} (id {id}): {report}")]
    Invalid {
        /// Position of the entry in the catalog
        index: usize,
        /// Identifier of the entry
        id: String,
        /// What was wrong with it
        report: garde::Report,
    },
    /// Two entries share an identifier
    #[error("duplicate id {0}")]
    DuplicateId(String),
    /// The catalog has no entries
    #[error("{0} catalog is empty")]
    Empty(&'static str),
}

/// Validates every entry of a catalog and checks identifiers are unique
///
/// # Arguments
///
/// * `name` - Catalog name used in the [`Error::Empty`] message
/// * `entries` - The entries to check
/// * `id_of` - Extracts the identifier of an entry
///
/// # Errors
///
/// Returns the first problem found, in catalog order.
pub(crate) fn validate_entries<T, F>(
    name: &'static str,
    entries: &[T],
    id_of: F,
) -> Result<(), Error>
where
    T: Validate<Context = ()>,
    F: Fn(&T) -> String,
{
    if entries.is_empty() {
        return Err(Error::Empty(name));
    }

    let mut seen = HashSet::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let id = id_of(entry);
        if let Err(report) = entry.validate() {
            tracing::error!(catalog = name, index, %id, %report, "malformed catalog entry");
            return Err(Error::Invalid { index, id, report });
        }
        if !seen.insert(id.clone()) {
            return Err(Error::DuplicateId(id));
        }
    }

    Ok(())
}

/// All three catalogs of a game
#[derive(Debug, Clone)]
pub struct Catalogs {
    /// The question bank
    pub questions: QuestionBank,
    /// Lifelines that can be drawn
    pub lifelines: Vec<Lifeline>,
    /// Dares that can be presented
    pub dares: Vec<Dare>,
}

impl Catalogs {
    /// Assembles catalogs after validating the lifeline and dare entries
    ///
    /// The question bank is already validated by its own constructor.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] for an empty catalog, a duplicate identifier or
    /// an entry that fails validation.
    pub fn new(
        questions: QuestionBank,
        lifelines: Vec<Lifeline>,
        dares: Vec<Dare>,
    ) -> Result<Self, Error> {
        validate_entries("lifeline", &lifelines, |l| l.id.clone())?;
        validate_entries("dare", &dares, |d| d.id.clone())?;
        Ok(Self {
            questions,
            lifelines,
            dares,
        })
    }

    /// The bundled question bank with the standard lifelines and dares
    ///
    /// # Errors
    ///
    /// Fails only if the bundled data is corrupt.
    pub fn bundled() -> Result<Self, Error> {
        Self::new(
            QuestionBank::bundled()?,
            lifeline::standard_catalog(),
            dare::standard_catalog(),
        )
    }
}
