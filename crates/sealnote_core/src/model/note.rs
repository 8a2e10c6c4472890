//! Note domain model.
//!
//! # Responsibility
//! - Define the canonical in-memory note record.
//! - Normalize and validate user-supplied note text.
//!
//! # Invariants
//! - `text` never has leading/trailing whitespace and is never empty.
//! - `id` is session-scoped: it is assigned on create/load and is not
//!   written to the notes file.

use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Identifier for one in-memory note.
///
/// Lets callers address one specific note even when several notes share
/// the same text.
pub type NoteId = Uuid;

/// Rejection reasons for note text input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteValidationError {
    /// Input was empty or whitespace only.
    EmptyText,
}

impl Display for NoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyText => write!(f, "note text cannot be empty"),
        }
    }
}

impl Error for NoteValidationError {}

/// One piece of user text, the atomic unit of storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    /// Session-scoped identity used by delete operations.
    pub id: NoteId,
    /// Trimmed plaintext body.
    pub text: String,
}

impl Note {
    /// Creates a note from raw user input with a fresh id.
    ///
    /// # Errors
    /// - `NoteValidationError::EmptyText` when `text` is blank after trim.
    pub fn new(text: impl AsRef<str>) -> Result<Self, NoteValidationError> {
        let text = normalize_text(text.as_ref())?;
        Ok(Self {
            id: Uuid::new_v4(),
            text,
        })
    }

    /// Wraps already-decrypted text read back from the notes file.
    ///
    /// Persisted text was trimmed on the way in, so it is kept verbatim.
    pub(crate) fn restored(text: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            text,
        }
    }
}

/// Trims surrounding whitespace and rejects blank input.
pub fn normalize_text(raw: &str) -> Result<String, NoteValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(NoteValidationError::EmptyText);
    }
    Ok(trimmed.to_string())
}
