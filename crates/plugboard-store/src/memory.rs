//! In-process coordination store.
//!
//! [`MemoryStore`] keeps nodes in a mutex-guarded map and assigns versions
//! the way `ZooKeeper` does: a freshly created node starts at generation zero
//! and every successful write bumps it by one. It is the store used by unit
//! tests and by embedders that run a single-process cluster.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::StoreError;
use crate::snapshot::{Snapshot, Version};
use crate::store::CoordinationStore;

#[derive(Debug, Clone)]
struct Node {
    data: Vec<u8>,
    stamp: u64,
}

/// Thread-safe in-memory [`CoordinationStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    nodes: Mutex<HashMap<String, Node>>,
    writes: AtomicUsize,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store with one node already present at generation zero.
    #[must_use]
    pub fn with_node(path: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        let store = Self::new();
        store.lock().insert(
            path.into(),
            Node {
                data: data.into(),
                stamp: 0,
            },
        );
        store
    }

    /// Returns the current bytes of a node, if present.
    #[must_use]
    pub fn data(&self, path: &str) -> Option<Vec<u8>> {
        self.lock().get(path).map(|node| node.data.clone())
    }

    /// Number of compare-and-set calls that committed.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Node>> {
        self.nodes.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CoordinationStore for MemoryStore {
    fn get(&self, path: &str) -> Result<Snapshot, StoreError> {
        Ok(self
            .lock()
            .get(path)
            .map_or_else(Snapshot::absent, |node| {
                Snapshot::present(node.data.clone(), node.stamp)
            }))
    }

    fn compare_and_set(
        &self,
        path: &str,
        expected: Version,
        data: &[u8],
    ) -> Result<Version, StoreError> {
        let mut nodes = self.lock();
        let current = nodes
            .get(path)
            .map_or(Version::Absent, |node| Version::Stamp(node.stamp));
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
        nodes.insert(
            path.to_owned(),
            Node {
                data: data.to_vec(),
                stamp,
            },
        );
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(Version::Stamp(stamp))
    }
}
