//! Domain errors raised by coordination store access and atomic updates.
//!
//! All errors use `thiserror`-derived enums with structured context so callers
//! can inspect the failure programmatically. I/O errors are wrapped in `Arc`
//! so [`StoreError`] stays cheap to clone and `Send + Sync`.

use std::io;
use std::sync::Arc;

use thiserror::Error;

use crate::snapshot::Version;

/// Errors reported by a [`CoordinationStore`](crate::CoordinationStore).
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The node changed after it was read, so the guarded write was refused.
    #[error("version conflict writing '{path}': expected {expected}")]
    VersionConflict {
        /// Path of the node.
        path: String,
        /// Version the caller expected to replace.
        expected: Version,
    },

    /// The store could not service the request.
    #[error("coordination store unavailable for '{path}': {message}")]
    Unavailable {
        /// Path of the node.
        path: String,
        /// Human-readable failure description.
        message: String,
    },

    /// The node path cannot be mapped onto the store.
    #[error("invalid node path '{path}': {message}")]
    InvalidPath {
        /// Offending path.
        path: String,
        /// Why the path was rejected.
        message: String,
    },

    /// An I/O error occurred while reading or writing the node.
    #[error("I/O error accessing '{path}': {source}")]
    Io {
        /// Path of the node.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: Arc<io::Error>,
    },

    /// The calling thread was interrupted while waiting on the store.
    #[error("interrupted while accessing '{path}'")]
    Interrupted {
        /// Path of the node.
        path: String,
    },
}

impl StoreError {
    /// Wraps an I/O error for the given node path.
    pub fn io(path: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source: Arc::new(source),
        }
    }

    /// Returns `true` when the error reports a lost compare-and-set race.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::VersionConflict { .. })
    }

    /// Returns `true` when the error reports thread interruption.
    #[must_use]
    pub const fn is_interrupted(&self) -> bool {
        matches!(self, Self::Interrupted { .. })
    }

    /// Path of the node the failing call addressed.
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::VersionConflict { path, .. }
            | Self::Unavailable { path, .. }
            | Self::InvalidPath { path, .. }
            | Self::Io { path, .. }
            | Self::Interrupted { path } => path.as_str(),
        }
    }
}

/// Errors surfaced by [`AtomicUpdater::apply`](crate::AtomicUpdater::apply).
///
/// `E` is the error type of the caller-supplied transform. A transform error
/// aborts the update before anything is written.
#[derive(Debug, Error)]
pub enum UpdateError<E> {
    /// The transform refused to produce a new document.
    #[error("update rejected: {0}")]
    Rejected(E),

    /// Every attempt lost its compare-and-set race.
    #[error("gave up updating '{path}' after {attempts} conflicting attempts")]
    Contention {
        /// Path of the document.
        path: String,
        /// Number of attempts made.
        attempts: u32,
    },

    /// The update was cancelled before it could commit.
    #[error("update of '{path}' was cancelled")]
    Cancelled {
        /// Path of the document.
        path: String,
    },

    /// The store failed with something other than a version conflict.
    #[error(transparent)]
    Store(StoreError),

    /// The stored bytes are not a JSON object.
    #[error("document at '{path}' is not a JSON object: {source}")]
    MalformedDocument {
        /// Path of the document.
        path: String,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// The transformed document could not be serialised.
    #[error("failed to serialise document for '{path}': {source}")]
    Encode {
        /// Path of the document.
        path: String,
        /// Underlying serialisation error.
        #[source]
        source: serde_json::Error,
    },
}

impl<E> UpdateError<E> {
    /// Classifies a store failure, mapping interruption to cancellation.
    pub(crate) fn from_store(error: StoreError) -> Self {
        match error {
            StoreError::Interrupted { path } => Self::Cancelled { path },
            other => Self::Store(other),
        }
    }
}
