//! Operator entrypoint for the plugboard cluster plugin registry.
//!
//! The binary delegates to [`plugboard_cli::run`], which parses arguments,
//! validates configuration, installs telemetry, and drives the plugin API
//! against the file-backed coordination store.

use std::io::{self, StderrLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    plugboard_cli::run(std::env::args_os(), &mut stdout, &mut stderr)
}
