//! Key manager: load-or-create the symmetric key.
//!
//! # Responsibility
//! - Return the key stored at the well-known path, creating it on first run.
//!
//! # Invariants
//! - An existing key file is returned verbatim; its length and format are
//!   not checked here. A bad key surfaces as a cipher error on first use.
//! - At most one write happens, and only when the key file is absent.

use aes_gcm::aead::{KeyInit, OsRng};
use aes_gcm::Aes256Gcm;
use log::{error, info};
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use zeroize::Zeroizing;

pub type KeyResult<T> = Result<T, KeyError>;

/// Filesystem failures while loading or creating the key.
#[derive(Debug)]
pub enum KeyError {
    Read { path: PathBuf, source: io::Error },
    Write { path: PathBuf, source: io::Error },
}

impl Display for KeyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "failed to read key file `{}`: {source}", path.display())
            }
            Self::Write { path, source } => {
                write!(f, "failed to write key file `{}`: {source}", path.display())
            }
        }
    }
}

impl Error for KeyError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } | Self::Write { source, .. } => Some(source),
        }
    }
}

/// Raw key bytes, wiped on drop.
#[derive(Clone, PartialEq, Eq)]
pub struct KeyMaterial(Zeroizing<Vec<u8>>);

impl KeyMaterial {
    /// Generates a fresh 256-bit key from the OS RNG.
    pub fn generate() -> Self {
        let key = Aes256Gcm::generate_key(OsRng);
        Self(Zeroizing::new(key.to_vec()))
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(Zeroizing::new(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Debug for KeyMaterial {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "KeyMaterial([redacted; {} bytes])", self.0.len())
    }
}

/// Returns the key stored at `path`, generating and writing one if absent.
///
/// # Side effects
/// - Creates the parent directory and the key file on first run.
/// - Emits `key_load` / `key_create` logging events (no key bytes).
///
/// # Errors
/// - `KeyError::Read` when the key path cannot be checked or read.
/// - `KeyError::Write` when a new key cannot be written.
pub fn obtain_key(path: impl AsRef<Path>) -> KeyResult<KeyMaterial> {
    let path = path.as_ref();
    let started_at = Instant::now();

    let exists = path.try_exists().map_err(|source| {
        error!(
            "event=key_load module=crypto status=error error_code=key_stat_failed error={}",
            source
        );
        KeyError::Read {
            path: path.to_path_buf(),
            source,
        }
    })?;
    if exists {
        let bytes = std::fs::read(path).map_err(|source| {
            error!(
                "event=key_load module=crypto status=error error_code=key_read_failed error={}",
                source
            );
            KeyError::Read {
                path: path.to_path_buf(),
                source,
            }
        })?;
        info!(
            "event=key_load module=crypto status=ok key_len={} duration_ms={}",
            bytes.len(),
            started_at.elapsed().as_millis()
        );
        return Ok(KeyMaterial::from_bytes(bytes));
    }

    let key = KeyMaterial::generate();
    write_new_key(path, &key).map_err(|source| {
        error!(
            "event=key_create module=crypto status=error error_code=key_write_failed error={}",
            source
        );
        KeyError::Write {
            path: path.to_path_buf(),
            source,
        }
    })?;
    info!(
        "event=key_create module=crypto status=ok key_len={} duration_ms={}",
        key.len(),
        started_at.elapsed().as_millis()
    );
    Ok(key)
}

fn write_new_key(path: &Path, key: &KeyMaterial) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let mut file = create_key_file(path)?;
    file.write_all(key.as_bytes())?;
    file.sync_all()
}

/// Opens a brand-new key file; fails if one appeared since the existence check.
#[cfg(unix)]
fn create_key_file(path: &Path) -> io::Result<File> {
    use std::os::unix::fs::OpenOptionsExt;
    OpenOptions::new()
        .write(true)
        .create_new(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn create_key_file(path: &Path) -> io::Result<File> {
    OpenOptions::new().write(true).create_new(true).open(path)
}
