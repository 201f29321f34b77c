//! Command-line runtime for the plugboard cluster plugin registry.
//!
//! [`run`] parses arguments, validates configuration, installs telemetry,
//! and executes one registry operation against the file-backed coordination
//! store. Output streams are injected so tests can drive the runtime without
//! spawning a process.
//!
//! Failed edits print one error per line on stderr and exit with status 1.
//! Usage and configuration problems exit with status 2.

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use plugboard::{ClassCatalogue, PluginDescriptor, PluginsApi};
use plugboard_config::Config;
use plugboard_store::{AtomicUpdater, CancellationToken, FileStore, RetryPolicy, UpdateOutcome};
use tracing::debug;

mod cli;
mod errors;
mod interrupt;
pub mod telemetry;

use cli::{Cli, CliCommand};
use errors::AppError;

/// Tracing target for CLI events.
const CLI_TARGET: &str = "plugboard_cli";

type FileApi = PluginsApi<FileStore, ClassCatalogue>;

/// Runs the CLI using the provided arguments and IO handles.
#[must_use]
pub fn run<I, T, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
    W: Write,
    E: Write,
{
    let result = Cli::try_parse_from(args)
        .map_err(AppError::CliUsage)
        .and_then(|cli| execute(cli, stdout));

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(AppError::CliUsage(error)) if !error.use_stderr() => {
            let _ = write!(stdout, "{error}");
            ExitCode::SUCCESS
        }
        Err(error) => {
            let _ = writeln!(stderr, "{error}");
            error.exit_code()
        }
    }
}

fn execute<W: Write>(cli: Cli, stdout: &mut W) -> Result<(), AppError> {
    let Cli { config, command } = cli;
    config.validate()?;
    telemetry::initialise(&config)?;

    let cancellation = CancellationToken::new();
    let _interrupt =
        interrupt::cancel_on_interrupt(cancellation.clone()).map_err(AppError::Interrupt)?;
    let api = build_api(&config, cancellation);
    debug!(
        target: CLI_TARGET,
        store_root = %config.store_root(),
        document_path = config.document_path(),
        "plugin API ready"
    );

    match command {
        CliCommand::List => {
            let body = api.handle_get()?;
            serde_json::to_writer_pretty(&mut *stdout, &body).map_err(AppError::Render)?;
            writeln!(stdout).map_err(AppError::Output)
        }
        CliCommand::Add { descriptor } => {
            let outcome = api.add(parse_descriptor(&descriptor)?)?;
            report(stdout, outcome)
        }
        CliCommand::Update { descriptor } => {
            let outcome = api.update(parse_descriptor(&descriptor)?)?;
            report(stdout, outcome)
        }
        CliCommand::Remove { name } => {
            let outcome = api.remove(name)?;
            report(stdout, outcome)
        }
        CliCommand::Apply { body } => {
            let response = api.handle_post(body.as_bytes());
            if response.is_success() {
                Ok(())
            } else {
                Err(AppError::Rejected(response.errors))
            }
        }
    }
}

fn build_api(config: &Config, cancellation: CancellationToken) -> FileApi {
    let store = FileStore::new(config.store_root().as_std_path());
    let policy = RetryPolicy::new(
        config.max_attempts(),
        config.initial_backoff(),
        config.max_backoff(),
    );
    let updater = AtomicUpdater::new(store, policy).with_cancellation(cancellation);
    PluginsApi::new(updater, catalogue(config.known_classes())).with_path(config.document_path())
}

fn catalogue(known_classes: &[String]) -> ClassCatalogue {
    if known_classes.is_empty() {
        return ClassCatalogue::permissive();
    }
    known_classes
        .iter()
        .fold(ClassCatalogue::new(), |catalogue, class| {
            catalogue.with_class(class.as_str(), ClassCatalogue::configured)
        })
}

fn parse_descriptor(raw: &str) -> Result<PluginDescriptor, AppError> {
    serde_json::from_str(raw).map_err(AppError::Descriptor)
}

fn report<W: Write>(stdout: &mut W, outcome: UpdateOutcome) -> Result<(), AppError> {
    let line = match outcome {
        UpdateOutcome::Committed { attempts, .. } => {
            format!("committed after {attempts} attempt(s)")
        }
        UpdateOutcome::Unchanged { .. } => "unchanged".to_owned(),
    };
    writeln!(stdout, "{line}").map_err(AppError::Output)
}
