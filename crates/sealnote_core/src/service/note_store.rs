//! Encrypted note store service.
//!
//! # Responsibility
//! - Own the in-memory note sequence and the key used to protect it.
//! - Keep the notes file equal to the element-wise encryption of that
//!   sequence after every mutation.
//!
//! # Invariants
//! - Insertion order is display order and file order.
//! - Every successful `add`/`delete` fully rewrites the notes file before
//!   returning. A failed rewrite rolls the in-memory change back.
//! - Decryption failures are surfaced unless the store was configured with
//!   `LoadPolicy::SkipUnreadable`.

use crate::config::{LoadPolicy, StoreConfig};
use crate::crypto::cipher::{CipherError, NoteCipher};
use crate::crypto::key::{obtain_key, KeyError, KeyMaterial};
use crate::model::note::{Note, NoteId, NoteValidationError};
use crate::store::file::{read_records, write_records, EncryptedRecord, StoreFileError};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub type NoteStoreResult<T> = Result<T, NoteStoreError>;

/// Service error for note store operations.
#[derive(Debug)]
pub enum NoteStoreError {
    /// Note text was blank; nothing changed.
    Validation(NoteValidationError),
    /// Key file could not be read or created.
    Key(KeyError),
    /// Notes file could not be read, written or parsed.
    File(StoreFileError),
    /// Record at `index` could not be decrypted with the current key.
    Decryption { index: usize, source: CipherError },
    /// Note at `index` could not be encrypted.
    Encryption { index: usize, source: CipherError },
}

impl NoteStoreError {
    /// Whether the notes file exists but is not valid structured data.
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Self::File(StoreFileError::Parse { .. }))
    }

    /// Whether a ciphertext record failed to open.
    pub fn is_decryption_error(&self) -> bool {
        matches!(self, Self::Decryption { .. })
    }
}

impl Display for NoteStoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Key(err) => write!(f, "{err}"),
            Self::File(err) => write!(f, "{err}"),
            Self::Decryption { index, source } => {
                write!(f, "failed to decrypt note #{index}: {source}")
            }
            Self::Encryption { index, source } => {
                write!(f, "failed to encrypt note #{index}: {source}")
            }
        }
    }
}

impl Error for NoteStoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Key(err) => Some(err),
            Self::File(err) => Some(err),
            Self::Decryption { source, .. } | Self::Encryption { source, .. } => Some(source),
        }
    }
}

impl From<NoteValidationError> for NoteStoreError {
    fn from(value: NoteValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<KeyError> for NoteStoreError {
    fn from(value: KeyError) -> Self {
        Self::Key(value)
    }
}

impl From<StoreFileError> for NoteStoreError {
    fn from(value: StoreFileError) -> Self {
        Self::File(value)
    }
}

/// Context object owning the key and the note sequence.
#[derive(Debug)]
pub struct NoteStore {
    config: StoreConfig,
    cipher: NoteCipher,
    notes: Vec<Note>,
}

impl NoteStore {
    /// Obtains the key for `config` and loads existing notes.
    ///
    /// # Side effects
    /// - Creates the key file on first run in the data directory.
    pub fn open(config: StoreConfig) -> NoteStoreResult<Self> {
        let key = obtain_key(config.key_path())?;
        Self::open_with_key(config, key)
    }

    /// Loads existing notes using caller-provided key material.
    pub fn open_with_key(config: StoreConfig, key: KeyMaterial) -> NoteStoreResult<Self> {
        let mut store = Self {
            config,
            cipher: NoteCipher::new(key),
            notes: Vec::new(),
        };
        store.notes = store.load()?;
        Ok(store)
    }

    /// Reads and decrypts the notes file without touching memory state.
    ///
    /// Returns an empty sequence when the notes file does not exist.
    pub fn load(&self) -> NoteStoreResult<Vec<Note>> {
        let started_at = Instant::now();
        let path = self.config.notes_path();
        let records = match read_records(&path) {
            Ok(Some(records)) => records,
            Ok(None) => {
                info!("event=notes_load module=service status=ok source=none count=0");
                return Ok(Vec::new());
            }
            Err(err) => {
                error!(
                    "event=notes_load module=service status=error error_code=notes_file_unreadable error={}",
                    err
                );
                return Err(err.into());
            }
        };

        let mut notes = Vec::with_capacity(records.len());
        let mut skipped = 0usize;
        for (index, record) in records.iter().enumerate() {
            match self.cipher.open(&record.text) {
                Ok(text) => notes.push(Note::restored(text)),
                Err(source) if self.config.load_policy == LoadPolicy::SkipUnreadable => {
                    warn!(
                        "event=notes_load module=service status=skip index={} error={}",
                        index, source
                    );
                    skipped += 1;
                }
                Err(source) => {
                    error!(
                        "event=notes_load module=service status=error error_code=decrypt_failed index={} error={}",
                        index, source
                    );
                    return Err(NoteStoreError::Decryption { index, source });
                }
            }
        }

        info!(
            "event=notes_load module=service status=ok source=file count={} skipped={} duration_ms={}",
            notes.len(),
            skipped,
            started_at.elapsed().as_millis()
        );
        Ok(notes)
    }

    /// Replaces the in-memory sequence with a fresh `load`.
    pub fn reload(&mut self) -> NoteStoreResult<()> {
        self.notes = self.load()?;
        Ok(())
    }

    /// Current notes in display order.
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn get(&self, id: NoteId) -> Option<&Note> {
        self.notes.iter().find(|note| note.id == id)
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Appends one note and persists.
    ///
    /// # Errors
    /// - `Validation` when `text` is blank after trim; memory and file are
    ///   left as they were.
    /// - `File`/`Encryption` when persisting fails; the note is not kept.
    pub fn add(&mut self, text: &str) -> NoteStoreResult<Note> {
        let note = Note::new(text).map_err(|err| {
            warn!("event=note_add module=service status=rejected reason=empty_text");
            NoteStoreError::from(err)
        })?;

        self.notes.push(note.clone());
        if let Err(err) = self.persist() {
            self.notes.pop();
            return Err(err);
        }
        info!(
            "event=note_add module=service status=ok count={}",
            self.notes.len()
        );
        Ok(note)
    }

    /// Removes `note` (matched by id) and persists.
    ///
    /// Returns `Ok(false)` without rewriting the file when no note with
    /// that id is present.
    pub fn delete(&mut self, note: &Note) -> NoteStoreResult<bool> {
        self.delete_by_id(note.id)
    }

    /// Removes the note with `id` and persists.
    pub fn delete_by_id(&mut self, id: NoteId) -> NoteStoreResult<bool> {
        let Some(position) = self.notes.iter().position(|note| note.id == id) else {
            info!("event=note_delete module=service status=noop reason=not_found");
            return Ok(false);
        };

        let removed = self.notes.remove(position);
        if let Err(err) = self.persist() {
            self.notes.insert(position, removed);
            return Err(err);
        }
        info!(
            "event=note_delete module=service status=ok count={}",
            self.notes.len()
        );
        Ok(true)
    }

    /// Encrypts every note and rewrites the notes file.
    pub fn persist(&self) -> NoteStoreResult<()> {
        let started_at = Instant::now();
        let records = self
            .notes
            .iter()
            .enumerate()
            .map(|(index, note)| {
                self.cipher
                    .seal(&note.text)
                    .map(|text| EncryptedRecord { text })
                    .map_err(|source| NoteStoreError::Encryption { index, source })
            })
            .collect::<NoteStoreResult<Vec<_>>>()?;

        if let Err(err) = write_records(&self.config.notes_path(), &records) {
            error!(
                "event=notes_persist module=service status=error error_code=write_failed error={}",
                err
            );
            return Err(err.into());
        }
        info!(
            "event=notes_persist module=service status=ok count={} duration_ms={}",
            records.len(),
            started_at.elapsed().as_millis()
        );
        Ok(())
    }
}
