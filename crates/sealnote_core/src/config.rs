//! Store configuration.
//!
//! # Responsibility
//! - Name the data directory and the two well-known files inside it.
//! - Carry the policy applied when the notes file holds unreadable records.
//!
//! # Invariants
//! - Defaults match the historic on-disk layout: `encryption_key.key` and
//!   `notes.json` in the current working directory.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default key file name inside the data directory.
pub const DEFAULT_KEY_FILE_NAME: &str = "encryption_key.key";
/// Default notes file name inside the data directory.
pub const DEFAULT_NOTES_FILE_NAME: &str = "notes.json";

/// How `load` treats records that fail to decrypt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadPolicy {
    /// First unreadable record fails the whole load.
    #[default]
    Strict,
    /// Unreadable records are dropped with a warning. Parse errors stay fatal.
    SkipUnreadable,
}

/// Locations and policies for one note store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Directory holding the key file and the notes file.
    pub data_dir: PathBuf,
    pub key_file_name: String,
    pub notes_file_name: String,
    #[serde(default)]
    pub load_policy: LoadPolicy,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::in_dir(".")
    }
}

impl StoreConfig {
    /// Config with default file names inside `data_dir`.
    pub fn in_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            key_file_name: DEFAULT_KEY_FILE_NAME.to_string(),
            notes_file_name: DEFAULT_NOTES_FILE_NAME.to_string(),
            load_policy: LoadPolicy::Strict,
        }
    }

    pub fn with_load_policy(mut self, policy: LoadPolicy) -> Self {
        self.load_policy = policy;
        self
    }

    pub fn with_key_file_name(mut self, name: impl Into<String>) -> Self {
        self.key_file_name = name.into();
        self
    }

    pub fn with_notes_file_name(mut self, name: impl Into<String>) -> Self {
        self.notes_file_name = name.into();
        self
    }

    /// Full path of the key file.
    pub fn key_path(&self) -> PathBuf {
        self.data_dir.join(&self.key_file_name)
    }

    /// Full path of the notes file.
    pub fn notes_path(&self) -> PathBuf {
        self.data_dir.join(&self.notes_file_name)
    }
}
