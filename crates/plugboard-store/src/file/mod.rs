//! File-backed coordination store for single-host clusters and tooling.
//!
//! Each node lives in its own file beneath the store root, holding a small
//! JSON envelope with the node's version and its document text. Reads are
//! lock-free because writers always replace the file through an atomic
//! rename. Writers serialise through an exclusive OS lock on a sibling
//! `.lock` file, which the kernel releases if the holder dies; losing the lock
//! race is reported as a version conflict so the caller re-reads and retries
//! under its own backoff.

mod lock;

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::Builder;
use tracing::debug;

use crate::error::StoreError;
use crate::snapshot::{Snapshot, Version};
use crate::store::CoordinationStore;

use self::lock::{LockError, NodeLock};

/// Tracing target for file store operations.
const FILE_TARGET: &str = "plugboard_store::file";

#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    version: u64,
    data: String,
}

/// [`CoordinationStore`] persisting nodes as files under a root directory.
///
/// # Example
///
/// ```
/// use plugboard_store::{CoordinationStore, FileStore, Version};
///
/// let root = tempfile::tempdir().expect("temp dir");
/// let store = FileStore::new(root.path());
/// let version = store
///     .compare_and_set("/clusterprops.json", Version::Absent, b"{}")
///     .expect("create node");
/// assert_eq!(version, Version::Stamp(0));
/// ```
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Creates a store rooted at `root`. The directory is created on first
    /// write.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory holding the node files.
    #[must_use]
    pub fn root(&self) -> &Path {
        self.root.as_path()
    }

    /// Maps a node path such as `/clusterprops.json` onto a file below the
    /// root.
    fn resolve(&self, path: &str) -> Result<PathBuf, StoreError> {
        let mut resolved = self.root.clone();
        let mut segments = 0_usize;
        for segment in path.split('/') {
            match segment {
                "" | "." => {}
                ".." => {
                    return Err(StoreError::InvalidPath {
                        path: path.to_owned(),
                        message: String::from("parent directory segments are not allowed"),
                    });
                }
                other => {
                    resolved.push(other);
                    segments = segments.saturating_add(1);
                }
            }
        }
        if segments == 0 {
            return Err(StoreError::InvalidPath {
                path: path.to_owned(),
                message: String::from("path does not name a node"),
            });
        }
        Ok(resolved)
    }
}

impl CoordinationStore for FileStore {
    fn get(&self, path: &str) -> Result<Snapshot, StoreError> {
        let target = self.resolve(path)?;
        let envelope = read_envelope(&target).map_err(|source| StoreError::io(path, source))?;
        Ok(envelope.map_or_else(Snapshot::absent, |stored| {
            Snapshot::present(stored.data.into_bytes(), stored.version)
        }))
    }

    fn compare_and_set(
        &self,
        path: &str,
        expected: Version,
        data: &[u8],
    ) -> Result<Version, StoreError> {
        let target = self.resolve(path)?;
        let text = std::str::from_utf8(data).map_err(|error| {
            StoreError::io(path, io::Error::new(io::ErrorKind::InvalidData, error))
        })?;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|source| StoreError::io(path, source))?;
        }

        let _lock = match NodeLock::acquire(&lock_path(&target)) {
            Ok(lock) => lock,
            Err(LockError::Held) => {
                debug!(
                    target: FILE_TARGET,
                    path,
                    "node lock held by another writer"
                );
                return Err(StoreError::VersionConflict {
                    path: path.to_owned(),
                    expected,
                });
            }
            Err(LockError::Io(source)) => return Err(StoreError::io(path, source)),
        };

        let current = read_envelope(&target)
            .map_err(|source| StoreError::io(path, source))?
            .map_or(Version::Absent, |envelope| Version::Stamp(envelope.version));
        if current != expected {
            return Err(StoreError::VersionConflict {
                path: path.to_owned(),
                expected,
            });
        }

        let stamp = match current {
            Version::Absent => 0,
            Version::Stamp(stamp) => stamp.saturating_add(1),
        };
        let envelope = Envelope {
            version: stamp,
            data: text.to_owned(),
        };
        let bytes = serde_json::to_vec(&envelope).map_err(|error| {
            StoreError::io(path, io::Error::new(io::ErrorKind::InvalidData, error))
        })?;
        atomic_write(&target, &bytes).map_err(|source| StoreError::io(path, source))?;
        debug!(
            target: FILE_TARGET,
            path,
            version = stamp,
            file = %target.display(),
            "node written"
        );
        Ok(Version::Stamp(stamp))
    }
}

fn read_envelope(target: &Path) -> io::Result<Option<Envelope>> {
    let bytes = match fs::read(target) {
        Ok(bytes) => bytes,
        Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(error) => return Err(error),
    };
    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|error| io::Error::new(io::ErrorKind::InvalidData, error))
}

fn lock_path(target: &Path) -> PathBuf {
    let mut name = target
        .file_name()
        .map(std::ffi::OsStr::to_os_string)
        .unwrap_or_default();
    name.push(".lock");
    target.with_file_name(name)
}

/// Writes the provided bytes to the path using an atomic persist step.
///
/// Data is flushed and fsync'd before the temporary file is renamed into
/// place so readers never observe a partially written node.
fn atomic_write(path: &Path, contents: &[u8]) -> io::Result<()> {
    let directory = path.parent().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::NotFound,
            "target path did not have a parent directory",
        )
    })?;

    let mut builder = Builder::new();
    builder.prefix(
        path.file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("plugboard"),
    );
    builder.suffix(".tmp");

    let mut file = builder.tempfile_in(directory)?;
    file.write_all(contents)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|error| error.error)?;
    Ok(())
}
