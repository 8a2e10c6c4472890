//! JSON notes file codec.
//!
//! # Responsibility
//! - Parse the notes file into ordered ciphertext records.
//! - Serialize records and swap them into place in one rename.
//!
//! # Invariants
//! - Record order in the file is the display order of the notes.
//! - Records only ever hold ciphertext; plaintext never touches this module.
//! - A failed write leaves the previous file untouched.

use log::{debug, error};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub type StoreResult<T> = Result<T, StoreFileError>;

/// One persisted note: the ciphertext blob of its text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedRecord {
    pub text: String,
}

/// Notes file I/O and format failures.
#[derive(Debug)]
pub enum StoreFileError {
    Read { path: PathBuf, source: io::Error },
    Write { path: PathBuf, source: io::Error },
    /// File exists but is not a JSON array of records.
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    Serialize(serde_json::Error),
}

impl Display for StoreFileError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "failed to read notes file `{}`: {source}", path.display())
            }
            Self::Write { path, source } => {
                write!(f, "failed to write notes file `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "notes file `{}` is malformed: {source}", path.display())
            }
            Self::Serialize(err) => write!(f, "failed to serialize notes: {err}"),
        }
    }
}

impl Error for StoreFileError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } | Self::Write { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::Serialize(err) => Some(err),
        }
    }
}

/// Reads all records from `path`.
///
/// Returns `Ok(None)` when the file does not exist.
pub fn read_records(path: &Path) -> StoreResult<Option<Vec<EncryptedRecord>>> {
    let raw = match std::fs::read(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(StoreFileError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let records: Vec<EncryptedRecord> =
        serde_json::from_slice(&raw).map_err(|source| StoreFileError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    debug!(
        "event=notes_file_read module=store status=ok records={} bytes={}",
        records.len(),
        raw.len()
    );
    Ok(Some(records))
}

/// Replaces the file at `path` with `records`.
///
/// # Side effects
/// - Creates the parent directory if needed.
/// - Writes a sibling temp file, syncs it, then renames it over `path`.
pub fn write_records(path: &Path, records: &[EncryptedRecord]) -> StoreResult<()> {
    let write_err = |source: io::Error| StoreFileError::Write {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(write_err)?;

    let mut temp = NamedTempFile::new_in(dir).map_err(write_err)?;
    {
        let mut writer = BufWriter::new(temp.as_file_mut());
        serde_json::to_writer_pretty(&mut writer, records).map_err(StoreFileError::Serialize)?;
        writer.write_all(b"\n").map_err(write_err)?;
        writer.flush().map_err(write_err)?;
    }
    temp.as_file().sync_all().map_err(write_err)?;

    temp.persist(path).map_err(|err| {
        error!(
            "event=notes_file_write module=store status=error error_code=rename_failed error={}",
            err.error
        );
        write_err(err.error)
    })?;
    debug!(
        "event=notes_file_write module=store status=ok records={}",
        records.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{read_records, write_records, EncryptedRecord, StoreFileError};

    fn record(text: &str) -> EncryptedRecord {
        EncryptedRecord {
            text: text.to_string(),
        }
    }

    #[test]
    fn missing_file_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = read_records(&dir.path().join("absent.json")).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn written_records_read_back_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.json");
        let records = vec![record("b1"), record("a2"), record("c3")];

        write_records(&path, &records).unwrap();
        assert_eq!(read_records(&path).unwrap(), Some(records));
    }

    #[test]
    fn file_is_json_array_of_text_objects() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.json");
        write_records(&path, &[record("blob")]).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value, serde_json::json!([{ "text": "blob" }]));
    }

    #[test]
    fn rewrite_replaces_previous_content_and_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.json");
        write_records(&path, &[record("one"), record("two")]).unwrap();
        write_records(&path, &[record("three")]).unwrap();

        assert_eq!(read_records(&path).unwrap(), Some(vec![record("three")]));
        let entries = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn write_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("notes.json");
        write_records(&path, &[]).unwrap();
        assert_eq!(read_records(&path).unwrap(), Some(Vec::new()));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.json");
        std::fs::write(&path, "[{\"text\": \"trunc").unwrap();

        let err = read_records(&path).unwrap_err();
        assert!(matches!(err, StoreFileError::Parse { .. }));
    }

    #[test]
    fn wrong_shape_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.json");
        std::fs::write(&path, r#"{"text": "not a list"}"#).unwrap();

        let err = read_records(&path).unwrap_err();
        assert!(matches!(err, StoreFileError::Parse { .. }));
    }
}
