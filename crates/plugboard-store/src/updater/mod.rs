//! Optimistic read-modify-write over a single shared document.
//!
//! [`AtomicUpdater::apply`] reads the current document and its version,
//! hands the decoded document to a pure transform, and commits the result
//! with a compare-and-set guarded by the version it read. When another writer
//! commits in between, the guard fails, the updater backs off, re-reads, and
//! runs the transform again against the fresh state. Each attempt either
//! fully replaces the document or changes nothing.

use tracing::{debug, info, warn};

use crate::cancel::CancellationToken;
use crate::document::{self, ClusterDocument};
use crate::error::UpdateError;
use crate::retry::RetryPolicy;
use crate::snapshot::Version;
use crate::store::CoordinationStore;

/// Tracing target for update loop events.
const UPDATER_TARGET: &str = "plugboard_store::updater";

/// Result of a transform: either a document to persist or "leave it alone".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition<T> {
    /// Persist the contained value.
    Commit(T),
    /// Nothing changed; skip the write.
    Unchanged,
}

impl<T> Transition<T> {
    /// Maps the committed value, leaving [`Transition::Unchanged`] alone.
    pub fn map<U, F>(self, f: F) -> Transition<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Self::Commit(value) => Transition::Commit(f(value)),
            Self::Unchanged => Transition::Unchanged,
        }
    }

    /// Returns `true` for [`Transition::Unchanged`].
    #[must_use]
    pub const fn is_unchanged(&self) -> bool {
        matches!(self, Self::Unchanged)
    }
}

/// Successful completion of [`AtomicUpdater::apply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// A new document was written.
    Committed {
        /// Version assigned by the store to the new document.
        version: Version,
        /// Attempts used, including the successful one.
        attempts: u32,
    },
    /// The transform reported no change and nothing was written.
    Unchanged {
        /// Attempts used, including the one that observed no change.
        attempts: u32,
    },
}

impl UpdateOutcome {
    /// Returns `true` when a write was committed.
    #[must_use]
    pub const fn is_committed(&self) -> bool {
        matches!(self, Self::Committed { .. })
    }

    /// Number of attempts the update took.
    #[must_use]
    pub const fn attempts(&self) -> u32 {
        match self {
            Self::Committed { attempts, .. } | Self::Unchanged { attempts } => *attempts,
        }
    }
}

/// Drives a [`CoordinationStore`] through the compare-and-set retry loop.
#[derive(Debug, Clone)]
pub struct AtomicUpdater<S> {
    store: S,
    policy: RetryPolicy,
    cancellation: CancellationToken,
}

impl<S> AtomicUpdater<S> {
    /// Creates an updater over `store` with the given retry budget.
    #[must_use]
    pub fn new(store: S, policy: RetryPolicy) -> Self {
        Self {
            store,
            policy,
            cancellation: CancellationToken::new(),
        }
    }

    /// Aborts updates when `cancellation` fires.
    #[must_use]
    pub fn with_cancellation(mut self, cancellation: CancellationToken) -> Self {
        self.cancellation = cancellation;
        self
    }

    /// Returns the underlying store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Returns the retry policy.
    #[must_use]
    pub const fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Returns the cancellation token observed by the loop.
    #[must_use]
    pub const fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }
}

impl<S: CoordinationStore> AtomicUpdater<S> {
    /// Applies `transform` to the document at `path` and commits the result
    /// atomically.
    ///
    /// A missing node is presented to the transform as an empty document. The
    /// transform may run several times when writers race, so it must be a
    /// pure function of its input.
    ///
    /// # Errors
    ///
    /// - [`UpdateError::Rejected`] when the transform fails; nothing is
    ///   written.
    /// - [`UpdateError::Contention`] when every attempt in the budget lost
    ///   its race.
    /// - [`UpdateError::Cancelled`] when the token fires or the store reports
    ///   interruption.
    /// - [`UpdateError::Store`] for any other store failure, without retry.
    /// - [`UpdateError::MalformedDocument`] when the stored bytes are not a
    ///   JSON object.
    pub fn apply<F, E>(&self, path: &str, mut transform: F) -> Result<UpdateOutcome, UpdateError<E>>
    where
        F: FnMut(ClusterDocument) -> Result<Transition<ClusterDocument>, E>,
    {
        let mut attempt = 0_u32;
        loop {
            attempt = attempt.saturating_add(1);
            self.ensure_active(path)?;

            let (data, expected) = self
                .store
                .get(path)
                .map_err(UpdateError::from_store)?
                .into_parts();
            let current = document::decode(data.as_deref()).map_err(|source| {
                UpdateError::MalformedDocument {
                    path: path.to_owned(),
                    source,
                }
            })?;
            debug!(
                target: UPDATER_TARGET,
                path,
                attempt,
                version = %expected,
                "applying document transform"
            );

            let updated = match transform(current).map_err(UpdateError::Rejected)? {
                Transition::Commit(updated) => updated,
                Transition::Unchanged => {
                    debug!(
                        target: UPDATER_TARGET,
                        path,
                        attempt,
                        "transform reported no change; skipping write"
                    );
                    return Ok(UpdateOutcome::Unchanged { attempts: attempt });
                }
            };
            let bytes = document::encode(&updated).map_err(|source| UpdateError::Encode {
                path: path.to_owned(),
                source,
            })?;

            self.ensure_active(path)?;
            match self.store.compare_and_set(path, expected, &bytes) {
                Ok(version) => {
                    info!(
                        target: UPDATER_TARGET,
                        path,
                        attempt,
                        version = %version,
                        "document committed"
                    );
                    return Ok(UpdateOutcome::Committed {
                        version,
                        attempts: attempt,
                    });
                }
                Err(error) if error.is_conflict() => {
                    if self.policy.is_exhausted(attempt) {
                        warn!(
                            target: UPDATER_TARGET,
                            path,
                            attempts = attempt,
                            "retry budget exhausted under contention"
                        );
                        return Err(UpdateError::Contention {
                            path: path.to_owned(),
                            attempts: attempt,
                        });
                    }
                    let delay = self.policy.backoff(attempt);
                    debug!(
                        target: UPDATER_TARGET,
                        path,
                        attempt,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        "version conflict; retrying with a fresh read"
                    );
                    self.cancellation
                        .sleep(delay)
                        .map_err(|_| UpdateError::Cancelled {
                            path: path.to_owned(),
                        })?;
                }
                Err(error) => return Err(UpdateError::from_store(error)),
            }
        }
    }

    fn ensure_active<E>(&self, path: &str) -> Result<(), UpdateError<E>> {
        self.cancellation
            .check()
            .map_err(|_| UpdateError::Cancelled {
                path: path.to_owned(),
            })
    }
}
