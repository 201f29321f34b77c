//! Error types and exit status mapping for the CLI runtime.

use std::io;
use std::process::ExitCode;

use plugboard::PluginApiError;
use plugboard_config::ConfigError;
use thiserror::Error;

use crate::telemetry::TelemetryError;

/// Exit status for configuration and usage problems.
const USAGE_EXIT_STATUS: u8 = 2;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("{0}")]
    CliUsage(clap::Error),
    #[error("invalid configuration: {0}")]
    Configuration(#[from] ConfigError),
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    #[error("failed to install interrupt handler: {0}")]
    Interrupt(io::Error),
    #[error("plugin descriptor is not a JSON object: {0}")]
    Descriptor(serde_json::Error),
    #[error("{}", .0.messages().join("\n"))]
    Api(#[from] PluginApiError),
    #[error("{}", .0.join("\n"))]
    Rejected(Vec<String>),
    #[error("failed to render registry: {0}")]
    Render(serde_json::Error),
    #[error("failed to write output: {0}")]
    Output(io::Error),
}

impl AppError {
    /// Maps the failure onto the process exit status.
    pub(crate) fn exit_code(&self) -> ExitCode {
        match self {
            Self::CliUsage(error) => {
                ExitCode::from(u8::try_from(error.exit_code()).unwrap_or(USAGE_EXIT_STATUS))
            }
            Self::Configuration(_) | Self::Telemetry(_) | Self::Interrupt(_) => {
                ExitCode::from(USAGE_EXIT_STATUS)
            }
            Self::Descriptor(_)
            | Self::Api(_)
            | Self::Rejected(_)
            | Self::Render(_)
            | Self::Output(_) => ExitCode::FAILURE,
        }
    }
}
