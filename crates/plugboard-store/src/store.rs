//! Client abstraction over the strongly consistent coordination store.
//!
//! The store offers exactly two primitives: a versioned read and a
//! compare-and-set write. Everything else in plugboard is built on top of
//! these, so any backend that can honour them (ZooKeeper, etcd, a local file)
//! can host the shared document.

use std::sync::Arc;

use crate::error::StoreError;
use crate::snapshot::{Snapshot, Version};

/// Versioned get and compare-and-set over named paths.
///
/// Implementations must report a missing node as [`Snapshot::absent`] rather
/// than an error, report a lost race as [`StoreError::VersionConflict`], and
/// report thread interruption as [`StoreError::Interrupted`] so callers can
/// tell cancellation apart from failure.
pub trait CoordinationStore {
    /// Reads the node at `path` together with its version.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the store cannot be reached or the
    /// read is interrupted.
    fn get(&self, path: &str) -> Result<Snapshot, StoreError>;

    /// Replaces the node at `path` with `data` if its version still equals
    /// `expected`, returning the new version.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::VersionConflict`] when the node changed since it
    /// was read, or another [`StoreError`] when the write could not be
    /// attempted.
    fn compare_and_set(
        &self,
        path: &str,
        expected: Version,
        data: &[u8],
    ) -> Result<Version, StoreError>;
}

impl<T> CoordinationStore for &T
where
    T: CoordinationStore + ?Sized,
{
    fn get(&self, path: &str) -> Result<Snapshot, StoreError> {
        (**self).get(path)
    }

    fn compare_and_set(
        &self,
        path: &str,
        expected: Version,
        data: &[u8],
    ) -> Result<Version, StoreError> {
        (**self).compare_and_set(path, expected, data)
    }
}

impl<T> CoordinationStore for Arc<T>
where
    T: CoordinationStore + ?Sized,
{
    fn get(&self, path: &str) -> Result<Snapshot, StoreError> {
        (**self).get(path)
    }

    fn compare_and_set(
        &self,
        path: &str,
        expected: Version,
        data: &[u8],
    ) -> Result<Version, StoreError> {
        (**self).compare_and_set(path, expected, data)
    }
}
