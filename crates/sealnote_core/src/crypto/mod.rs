//! Key lifecycle and per-note authenticated encryption.
//!
//! # Responsibility
//! - Load or create the single symmetric key for a data directory.
//! - Seal/open one note text as a self-contained textual blob.
//!
//! # Invariants
//! - Key bytes never reach logs or `Debug` output.
//! - Every seal uses a fresh random nonce.

pub mod cipher;
pub mod key;
