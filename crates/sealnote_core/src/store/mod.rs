//! On-disk representation of the encrypted note list.
//!
//! # Responsibility
//! - Read and write the notes file as a JSON array of ciphertext records.
//! - Keep file I/O details out of the note store service.
//!
//! # Invariants
//! - Writes replace the whole file atomically (temp file + rename).
//! - A missing notes file reads as "no records", not as an error.

pub mod file;
