use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tracing::warn;

use super::FILE_TARGET;

pub(super) enum LockError {
    Held,
    Io(io::Error),
}

/// Exclusive writer lock for one node.
///
/// The lock is an advisory OS lock on a persistent `<node>.lock` file, so the
/// kernel drops it when the holding process exits. The file itself is never
/// removed; a leftover file without a holder does not block writers.
#[derive(Debug)]
pub(super) struct NodeLock {
    path: PathBuf,
    file: File,
}

impl NodeLock {
    pub(super) fn acquire(path: &Path) -> Result<Self, LockError> {
        let file = open(path).map_err(LockError::Io)?;
        match file.try_lock_exclusive() {
            Ok(()) => Ok(Self {
                path: path.to_path_buf(),
                file,
            }),
            Err(error) if is_contended(&error) => Err(LockError::Held),
            Err(error) => Err(LockError::Io(error)),
        }
    }
}

impl Drop for NodeLock {
    fn drop(&mut self) {
        if let Err(error) = FileExt::unlock(&self.file) {
            warn!(
                target: FILE_TARGET,
                file = %self.path.display(),
                error = %error,
                "failed to release node lock"
            );
        }
    }
}

fn open(path: &Path) -> io::Result<File> {
    let mut options = OpenOptions::new();
    options.read(true).write(true).create(true).truncate(false);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    options.open(path)
}

fn is_contended(error: &io::Error) -> bool {
    error.kind() == io::ErrorKind::WouldBlock
        || error.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}
