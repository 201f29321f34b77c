//! Cancels in-flight edits when the operator interrupts the process.

use std::io;

use plugboard_store::CancellationToken;

#[cfg(unix)]
mod unix {
    use std::io;
    use std::thread::{self, JoinHandle};

    use plugboard_store::CancellationToken;
    use signal_hook::consts::signal::{SIGINT, SIGTERM};
    use signal_hook::iterator::{Handle, Signals};
    use signal_hook::low_level::emulate_default_handler;
    use tracing::{info, warn};

    const INTERRUPT_TARGET: &str = "plugboard_cli::interrupt";

    /// What the listener does with a delivered signal.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub(super) enum Response {
        /// Ask the in-flight edit to stop.
        Cancel,
        /// Fall back to the default disposition and end the process.
        Terminate,
    }

    /// First signal cancels; any later one terminates.
    #[derive(Debug, Default)]
    pub(super) struct Escalation {
        received: u32,
    }

    impl Escalation {
        pub(super) const fn record(&mut self) -> Response {
            self.received = self.received.saturating_add(1);
            if self.received == 1 {
                Response::Cancel
            } else {
                Response::Terminate
            }
        }
    }

    /// Keeps the signal listener alive; dropping it stops the listener.
    pub(crate) struct InterruptGuard {
        handle: Handle,
        listener: Option<JoinHandle<()>>,
    }

    pub(crate) fn install(token: CancellationToken) -> io::Result<InterruptGuard> {
        let mut signals = Signals::new([SIGINT, SIGTERM])?;
        let handle = signals.handle();
        let listener = thread::spawn(move || {
            let mut escalation = Escalation::default();
            for signal in signals.forever() {
                match escalation.record() {
                    Response::Cancel => {
                        info!(target: INTERRUPT_TARGET, signal, "interrupt received; cancelling");
                        token.cancel();
                    }
                    Response::Terminate => {
                        warn!(target: INTERRUPT_TARGET, signal, "repeated interrupt; terminating");
                        if let Err(error) = emulate_default_handler(signal) {
                            warn!(
                                target: INTERRUPT_TARGET,
                                signal,
                                error = %error,
                                "failed to apply default signal handler"
                            );
                        }
                    }
                }
            }
        });
        Ok(InterruptGuard {
            handle,
            listener: Some(listener),
        })
    }

    impl Drop for InterruptGuard {
        fn drop(&mut self) {
            self.handle.close();
            if let Some(listener) = self.listener.take() {
                drop(listener.join());
            }
        }
    }
}

#[cfg(unix)]
pub(crate) use unix::InterruptGuard;

/// Placeholder guard on platforms without POSIX signals.
#[cfg(not(unix))]
pub(crate) struct InterruptGuard;

/// Cancels `token` when SIGINT or SIGTERM arrives while the guard lives.
pub(crate) fn cancel_on_interrupt(token: CancellationToken) -> io::Result<InterruptGuard> {
    #[cfg(unix)]
    {
        unix::install(token)
    }

    #[cfg(not(unix))]
    {
        drop(token);
        Ok(InterruptGuard)
    }
}
