use sealnote_core::{obtain_key, KeyError, NoteCipher};

#[test]
fn obtain_key_creates_key_file_on_first_run() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("encryption_key.key");

    let key = obtain_key(&path).unwrap();

    assert_eq!(key.len(), 32);
    assert_eq!(std::fs::read(&path).unwrap(), key.as_bytes());
}

#[test]
fn obtain_key_is_stable_across_calls() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("encryption_key.key");

    let first = obtain_key(&path).unwrap();
    let second = obtain_key(&path).unwrap();

    assert_eq!(first, second);
}

#[test]
fn existing_key_file_is_returned_verbatim() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("encryption_key.key");
    std::fs::write(&path, b"not-a-real-key").unwrap();

    let key = obtain_key(&path).unwrap();

    assert_eq!(key.as_bytes(), b"not-a-real-key");
    assert_eq!(std::fs::read(&path).unwrap(), b"not-a-real-key");
}

#[test]
fn truncated_key_loads_but_fails_on_use() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("encryption_key.key");
    let full = obtain_key(&path).unwrap();
    std::fs::write(&path, &full.as_bytes()[..10]).unwrap();

    let truncated = obtain_key(&path).expect("key load must not validate length");
    assert_eq!(truncated.len(), 10);
    assert!(NoteCipher::new(truncated).seal("x").is_err());
}

#[test]
fn obtain_key_creates_missing_parent_directory() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("k.key");

    obtain_key(&path).unwrap();

    assert!(path.is_file());
}

#[test]
fn unreadable_key_path_returns_read_error() {
    let dir = tempfile::tempdir().unwrap();
    // A directory at the key path exists but cannot be read as a file.
    let path = dir.path().join("encryption_key.key");
    std::fs::create_dir(&path).unwrap();

    let err = obtain_key(&path).unwrap_err();
    assert!(matches!(err, KeyError::Read { .. }));
}

#[cfg(unix)]
#[test]
fn uncheckable_key_path_returns_read_error() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, b"file").unwrap();
    let path = blocker.join("encryption_key.key");

    let err = obtain_key(&path).unwrap_err();
    assert!(matches!(err, KeyError::Read { .. }));
    assert_eq!(std::fs::read(&blocker).unwrap(), b"file");
}

#[cfg(unix)]
#[test]
fn new_key_file_is_owner_only() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("encryption_key.key");
    obtain_key(&path).unwrap();

    let mode = std::fs::metadata(&path).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
}
