//! Core domain logic for SealNote.
//! This crate owns the key lifecycle and the encrypted note store; UI
//! front ends only call into [`NoteStore`].

pub mod config;
pub mod crypto;
pub mod logging;
pub mod model;
pub mod service;
pub mod store;

pub use config::{LoadPolicy, StoreConfig};
pub use crypto::cipher::{CipherError, CipherResult, NoteCipher};
pub use crypto::key::{obtain_key, KeyError, KeyMaterial, KeyResult};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::note::{Note, NoteId, NoteValidationError};
pub use service::note_store::{NoteStore, NoteStoreError, NoteStoreResult};
pub use store::file::{EncryptedRecord, StoreFileError, StoreResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
