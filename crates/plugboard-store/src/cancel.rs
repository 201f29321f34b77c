//! Cooperative cancellation for blocking update loops.
//!
//! A [`CancellationToken`] is shared between the caller and the updater. The
//! updater checks it before every store call and sleeps on it between retry
//! attempts, so cancelling wakes a pending backoff immediately instead of
//! waiting for the delay to elapse.

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use thiserror::Error;

/// Returned when a wait ends because the token was cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("operation cancelled")]
pub struct Cancelled;

#[derive(Debug, Default)]
struct Shared {
    cancelled: Mutex<bool>,
    wake: Condvar,
}

/// Cloneable handle used to abort an in-flight update.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use plugboard_store::CancellationToken;
///
/// let token = CancellationToken::new();
/// let handle = token.clone();
/// handle.cancel();
/// assert!(token.is_cancelled());
/// assert!(token.sleep(Duration::from_secs(60)).is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    shared: Arc<Shared>,
}

impl CancellationToken {
    /// Creates a token that has not been cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancels the token and wakes every thread sleeping on it.
    pub fn cancel(&self) {
        let mut cancelled = self.flag();
        *cancelled = true;
        self.shared.wake.notify_all();
    }

    /// Returns `true` once [`cancel`](Self::cancel) has been called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.flag()
    }

    /// Checks the token without blocking.
    ///
    /// # Errors
    ///
    /// Returns [`Cancelled`] if the token has been cancelled.
    pub fn check(&self) -> Result<(), Cancelled> {
        if self.is_cancelled() {
            Err(Cancelled)
        } else {
            Ok(())
        }
    }

    /// Blocks for `duration` unless the token is cancelled first.
    ///
    /// # Errors
    ///
    /// Returns [`Cancelled`] if the token is cancelled before or during the
    /// wait.
    pub fn sleep(&self, duration: Duration) -> Result<(), Cancelled> {
        let guard = self.flag();
        let (cancelled, _) = self
            .shared
            .wake
            .wait_timeout_while(guard, duration, |cancelled| !*cancelled)
            .unwrap_or_else(PoisonError::into_inner);
        if *cancelled { Err(Cancelled) } else { Ok(()) }
    }

    fn flag(&self) -> MutexGuard<'_, bool> {
        self.shared
            .cancelled
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
