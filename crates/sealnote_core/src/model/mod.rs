//! Domain model for stored notes.
//!
//! # Responsibility
//! - Define the in-memory note shape shared by the store and UI adapters.
//!
//! # Invariants
//! - Note text is trimmed and non-empty once a `Note` exists.
//! - Every in-memory note has a `NoteId` unique within the process.

pub mod note;
