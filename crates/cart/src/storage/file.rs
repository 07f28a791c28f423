//! File-backed key-value store: one JSON file per key.

use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::{ErrorKind, Write as _};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use super::{KeyValueStore, StorageError};

/// Stores each key as `<dir>/<escaped key>.json`.
///
/// Each write goes to its own synced temporary file in the same directory
/// and is renamed into place. Readers see either the old or the new cart,
/// and concurrent writers (several processes on one directory) never share
/// a temporary file; the last rename wins.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// File backing `key`.
    #[must_use]
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", escape_key(key)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(&path, e)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir).map_err(|e| io_error(&self.dir, e))?;

        let path = self.path_for(key);
        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(|e| io_error(&self.dir, e))?;
        tmp.write_all(value.as_bytes())
            .map_err(|e| io_error(tmp.path(), e))?;
        tmp.as_file()
            .sync_all()
            .map_err(|e| io_error(tmp.path(), e))?;
        tmp.persist(&path).map_err(|e| io_error(&path, e.error))?;

        // Best effort: not every platform can open a directory for syncing.
        fsync_dir(&self.dir).ok();
        Ok(())
    }
}

fn fsync_dir(dir: &Path) -> std::io::Result<()> {
    File::open(dir)?.sync_all()
}

/// Escape a key into a file name. ASCII letters, digits, `-` and `_` are
/// kept; every other byte becomes `%XX`, so distinct keys never collide.
fn escape_key(key: &str) -> String {
    let mut escaped = String::with_capacity(key.len());
    for byte in key.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
            escaped.push(char::from(byte));
        } else {
            let _ = write!(escaped, "%{byte:02X}");
        }
    }
    escaped
}

fn io_error(path: &Path, source: std::io::Error) -> StorageError {
    StorageError::Io {
        path: path.display().to_string(),
        source,
    }
}
