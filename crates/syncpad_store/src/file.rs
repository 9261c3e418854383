//! File-based document store.
//!
//! Data directory layout:
//!
//! ```text
//! <data_dir>/
//! ├─ data.json          # Canonical document payload
//! ├─ data.json.tmp      # Staging target for the next commit
//! ├─ data.version       # Decimal version marker
//! └─ LOCK               # Advisory lock for single-writer
//! ```
//!
//! The LOCK file ensures only one process commits to the directory at a
//! time. Both the payload and the version marker are replaced with the
//! write-then-rename pattern, so a crash mid-commit leaves the previous
//! complete document readable.

use crate::error::{StoreError, StoreResult};
use crate::store::{DocumentStore, PersistedDocument};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// File names within the data directory.
const DOCUMENT_FILE: &str = "data.json";
const DOCUMENT_TEMP: &str = "data.json.tmp";
const VERSION_FILE: &str = "data.version";
const VERSION_TEMP: &str = "data.version.tmp";
const LOCK_FILE: &str = "LOCK";

/// A document store backed by a data directory.
///
/// # Thread Safety
///
/// `FileStore` holds an exclusive advisory lock on its directory for its
/// whole lifetime; only one instance can exist per directory at a time,
/// across processes.
///
/// # Durability
///
/// `commit` stages the new payload in a temporary file, syncs it, replaces
/// the version marker, renames the staged payload over the canonical file,
/// and finally fsyncs the directory so the renames themselves are durable.
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
    /// Lock file handle (held for exclusive access).
    _lock_file: File,
}

impl FileStore {
    /// Opens a document store over the given data directory, creating the
    /// directory if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Locked`] if another process holds the lock,
    /// or an I/O error if the directory or lock file cannot be created.
    pub fn open(dir: &Path) -> StoreResult<Self> {
        fs::create_dir_all(dir)?;

        let lock_file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(dir.join(LOCK_FILE))?;

        if lock_file.try_lock_exclusive().is_err() {
            return Err(StoreError::Locked);
        }

        Ok(Self {
            dir: dir.to_path_buf(),
            _lock_file: lock_file,
        })
    }

    /// Returns the path to the data directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the path to the canonical document file.
    #[must_use]
    pub fn document_path(&self) -> PathBuf {
        self.dir.join(DOCUMENT_FILE)
    }

    /// Returns the path to the version marker file.
    #[must_use]
    pub fn version_path(&self) -> PathBuf {
        self.dir.join(VERSION_FILE)
    }

    /// Writes `data` to `path` atomically via `temp`.
    fn replace_file(&self, temp: &Path, path: &Path, data: &[u8]) -> StoreResult<()> {
        let mut file = File::create(temp)?;
        file.write_all(data)?;
        file.sync_all()?;
        drop(file);

        fs::rename(temp, path)?;
        Ok(())
    }

    /// Syncs the data directory so renames are durable.
    ///
    /// On Windows, directory fsync is not supported; NTFS journaling
    /// provides equivalent metadata durability.
    #[cfg(unix)]
    fn sync_directory(&self) -> StoreResult<()> {
        let dir = File::open(&self.dir)?;
        dir.sync_all()?;
        Ok(())
    }

    #[cfg(not(unix))]
    fn sync_directory(&self) -> StoreResult<()> {
        Ok(())
    }

    /// Reads the version marker, recovering 0 if it is missing or invalid.
    ///
    /// An unparseable marker is recovered leniently: the payload file is
    /// the source of truth for content, and refusing to start over a
    /// half-written counter would brick the data directory.
    fn read_version(&self) -> u64 {
        let path = self.version_path();
        match fs::read_to_string(&path) {
            Ok(text) => match text.trim().parse::<u64>() {
                Ok(version) => version,
                Err(_) => {
                    tracing::warn!(
                        path = %path.display(),
                        "version marker is not a decimal integer, recovering as 0"
                    );
                    0
                }
            },
            Err(err) if err.kind() == io::ErrorKind::NotFound => 0,
            Err(err) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %err,
                    "version marker unreadable, recovering as 0"
                );
                0
            }
        }
    }
}

impl DocumentStore for FileStore {
    fn load(&self) -> StoreResult<PersistedDocument> {
        let payload = match fs::read(self.document_path()) {
            Ok(bytes) => bytes,
            // First run: nothing has ever been committed.
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Ok(PersistedDocument::empty())
            }
            Err(err) => return Err(err.into()),
        };

        Ok(PersistedDocument {
            payload,
            version: self.read_version(),
        })
    }

    fn commit(&mut self, payload: &[u8], version: u64) -> StoreResult<()> {
        let staged = self.dir.join(DOCUMENT_TEMP);

        // Stage the payload first so a marker update never refers to a
        // payload that cannot be published.
        let mut file = File::create(&staged)?;
        file.write_all(payload)?;
        file.sync_all()?;
        drop(file);

        self.replace_file(
            &self.dir.join(VERSION_TEMP),
            &self.version_path(),
            version.to_string().as_bytes(),
        )?;

        fs::rename(&staged, self.document_path())?;
        self.sync_directory()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn open_creates_directory() {
        let temp = tempdir().unwrap();
        let dir = temp.path().join("fresh");

        assert!(!dir.exists());
        let store = FileStore::open(&dir).unwrap();
        assert!(dir.is_dir());
        drop(store);
    }

    #[test]
    fn first_run_is_empty_at_version_zero() {
        let temp = tempdir().unwrap();
        let store = FileStore::open(temp.path()).unwrap();

        let doc = store.load().unwrap();
        assert!(doc.payload.is_empty());
        assert_eq!(doc.version, 0);
    }

    #[test]
    fn commit_then_load_round_trips() {
        let temp = tempdir().unwrap();
        let mut store = FileStore::open(temp.path()).unwrap();

        store.commit(b"{\"a\":1}", 1).unwrap();

        let doc = store.load().unwrap();
        assert_eq!(doc.payload, b"{\"a\":1}");
        assert_eq!(doc.version, 1);
    }

    #[test]
    fn commit_leaves_no_staging_file() {
        let temp = tempdir().unwrap();
        let mut store = FileStore::open(temp.path()).unwrap();

        store.commit(b"payload", 1).unwrap();

        assert!(!temp.path().join(DOCUMENT_TEMP).exists());
        assert!(!temp.path().join(VERSION_TEMP).exists());
    }

    #[test]
    fn reopen_recovers_last_commit() {
        let temp = tempdir().unwrap();

        {
            let mut store = FileStore::open(temp.path()).unwrap();
            store.commit(b"first", 1).unwrap();
            store.commit(b"second", 2).unwrap();
        }

        let store = FileStore::open(temp.path()).unwrap();
        let doc = store.load().unwrap();
        assert_eq!(doc.payload, b"second");
        assert_eq!(doc.version, 2);
    }

    #[test]
    fn version_marker_is_decimal_text() {
        let temp = tempdir().unwrap();
        let mut store = FileStore::open(temp.path()).unwrap();

        store.commit(b"x", 42).unwrap();

        let text = fs::read_to_string(store.version_path()).unwrap();
        assert_eq!(text.trim(), "42");
    }

    #[test]
    fn garbage_version_marker_recovers_as_zero() {
        let temp = tempdir().unwrap();
        let mut store = FileStore::open(temp.path()).unwrap();
        store.commit(b"data", 3).unwrap();

        fs::write(store.version_path(), "not a number").unwrap();

        let doc = store.load().unwrap();
        assert_eq!(doc.payload, b"data");
        assert_eq!(doc.version, 0);
    }

    #[test]
    fn lock_prevents_second_open() {
        let temp = tempdir().unwrap();

        let _store = FileStore::open(temp.path()).unwrap();
        let result = FileStore::open(temp.path());
        assert!(matches!(result, Err(StoreError::Locked)));
    }

    #[test]
    fn lock_released_on_drop() {
        let temp = tempdir().unwrap();

        {
            let _store = FileStore::open(temp.path()).unwrap();
        }

        let _store2 = FileStore::open(temp.path()).unwrap();
    }

    #[test]
    fn paths_are_correct() {
        let temp = tempdir().unwrap();
        let store = FileStore::open(temp.path()).unwrap();

        assert_eq!(store.document_path(), temp.path().join("data.json"));
        assert_eq!(store.version_path(), temp.path().join("data.version"));
    }
}
