//! Versioned document storage and optimistic concurrency for plugboard.
//!
//! The `plugboard-store` crate owns everything that touches the coordination
//! store: the [`CoordinationStore`] client abstraction, the in-memory and
//! file-backed adapters, and the [`AtomicUpdater`] that turns a pure document
//! transform into a linearizable read-modify-write.
//!
//! Shared cluster state is modelled as a value plus a store-assigned
//! [`Version`]. Writers never lock the document in-process; instead every
//! mutation is submitted as a compare-and-set guarded by the version that was
//! read. A concurrent commit invalidates the guard, and the updater re-reads
//! and re-applies the transform until it wins or the [`RetryPolicy`] budget is
//! spent.
//!
//! # Example
//!
//! ```
//! use plugboard_store::{AtomicUpdater, MemoryStore, RetryPolicy, Transition, UpdateOutcome};
//! use serde_json::json;
//!
//! let updater = AtomicUpdater::new(MemoryStore::new(), RetryPolicy::default());
//! let outcome = updater
//!     .apply::<_, std::convert::Infallible>("/clusterprops.json", |mut document| {
//!         document.insert("urlScheme".into(), json!("https"));
//!         Ok(Transition::Commit(document))
//!     })
//!     .expect("first write commits");
//! assert!(matches!(outcome, UpdateOutcome::Committed { attempts: 1, .. }));
//! ```

pub mod cancel;
pub mod document;
pub mod error;
pub mod file;
pub mod memory;
pub mod retry;
pub mod snapshot;
pub mod store;
pub mod updater;

pub use self::cancel::{Cancelled, CancellationToken};
pub use self::document::ClusterDocument;
pub use self::error::{StoreError, UpdateError};
pub use self::file::FileStore;
pub use self::memory::MemoryStore;
pub use self::retry::RetryPolicy;
pub use self::snapshot::{Snapshot, Version};
pub use self::store::CoordinationStore;
pub use self::updater::{AtomicUpdater, Transition, UpdateOutcome};
