//! Shared configuration for plugboard binaries.
//!
//! [`Config`] is assembled from three layers. Command-line flags win over
//! `PLUGBOARD_*` environment variables, which win over the built-in defaults
//! in [`defaults`]. Binaries flatten [`Config`] into their own clap parser;
//! [`Config::load_from_iter`] is the standalone entry point.
//!
//! Every loaded configuration is checked by [`Config::validate`] so a zero
//! retry budget or an inverted backoff range fails fast at start-up instead
//! of surfacing as odd behaviour under contention.

pub mod defaults;
pub mod logging;

use std::ffi::OsString;
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use clap::{Args, Parser};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use self::defaults::{
    DEFAULT_DOCUMENT_PATH, DEFAULT_INITIAL_BACKOFF_MS, DEFAULT_LOG_FILTER, DEFAULT_MAX_ATTEMPTS,
    DEFAULT_MAX_BACKOFF_MS, default_log_filter, default_log_format, default_store_root,
};
pub use self::logging::{LogFormat, LogFormatParseError};

/// Problems found while loading or validating a [`Config`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Flags or environment variables could not be parsed.
    #[error(transparent)]
    Cli(#[from] clap::Error),

    /// The retry budget allows no attempts at all.
    #[error("max_attempts must be at least 1")]
    ZeroAttempts,

    /// The log filter is blank.
    #[error("log filter must not be empty")]
    EmptyLogFilter,

    /// The document path is not absolute within the store.
    #[error("document path '{path}' must start with '/'")]
    RelativeDocumentPath {
        /// Offending path.
        path: String,
    },

    /// The first retry delay exceeds the ceiling.
    #[error("initial backoff ({initial_ms} ms) exceeds maximum backoff ({max_ms} ms)")]
    InvertedBackoff {
        /// Configured initial backoff.
        initial_ms: u64,
        /// Configured maximum backoff.
        max_ms: u64,
    },
}

/// Runtime configuration shared by plugboard binaries.
#[derive(Args, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Directory of the file-backed coordination store.
    #[arg(long, env = "PLUGBOARD_STORE_ROOT", default_value_t = default_store_root())]
    #[serde(default = "defaults::default_store_root")]
    pub store_root: Utf8PathBuf,

    /// Path of the cluster document inside the store.
    #[arg(long, env = "PLUGBOARD_DOCUMENT_PATH", default_value = DEFAULT_DOCUMENT_PATH)]
    #[serde(default = "defaults::default_document_path")]
    pub document_path: String,

    /// Tracing filter directive, for example `info` or `plugboard=debug`.
    #[arg(long, env = "PLUGBOARD_LOG_FILTER", default_value = DEFAULT_LOG_FILTER)]
    #[serde(default = "defaults::default_log_filter_string")]
    pub log_filter: String,

    /// Log output format: `json` or `compact`.
    #[arg(long, env = "PLUGBOARD_LOG_FORMAT", default_value_t = default_log_format())]
    #[serde(default = "defaults::default_log_format")]
    pub log_format: LogFormat,

    /// Compare-and-set attempts per edit before reporting contention.
    #[arg(long, env = "PLUGBOARD_MAX_ATTEMPTS", default_value_t = DEFAULT_MAX_ATTEMPTS)]
    #[serde(default = "defaults::default_max_attempts")]
    pub max_attempts: u32,

    /// Delay before the first retry, in milliseconds.
    #[arg(
        long,
        env = "PLUGBOARD_INITIAL_BACKOFF_MS",
        default_value_t = DEFAULT_INITIAL_BACKOFF_MS
    )]
    #[serde(default = "defaults::default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    /// Ceiling on the retry delay, in milliseconds.
    #[arg(long, env = "PLUGBOARD_MAX_BACKOFF_MS", default_value_t = DEFAULT_MAX_BACKOFF_MS)]
    #[serde(default = "defaults::default_max_backoff_ms")]
    pub max_backoff_ms: u64,

    /// Plugin classes the construction probe accepts. Empty accepts any.
    #[arg(
        long = "known-class",
        env = "PLUGBOARD_KNOWN_CLASSES",
        value_delimiter = ','
    )]
    #[serde(default)]
    pub known_classes: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_root: default_store_root(),
            document_path: defaults::default_document_path(),
            log_filter: defaults::default_log_filter_string(),
            log_format: default_log_format(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_backoff_ms: DEFAULT_INITIAL_BACKOFF_MS,
            max_backoff_ms: DEFAULT_MAX_BACKOFF_MS,
            known_classes: Vec::new(),
        }
    }
}

#[derive(Parser)]
#[command(name = "plugboard")]
struct Standalone {
    #[command(flatten)]
    config: Config,
}

impl Config {
    /// Loads configuration from `args` and the process environment, then
    /// validates it.
    ///
    /// The first item of `args` is the program name.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Cli`] when parsing fails and the matching
    /// validation variant when the values are inconsistent.
    pub fn load_from_iter<I, T>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let config = Standalone::try_parse_from(args)?.config;
        config.validate()?;
        Ok(config)
    }

    /// Checks the values for consistency.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_attempts == 0 {
            return Err(ConfigError::ZeroAttempts);
        }
        if self.log_filter.trim().is_empty() {
            return Err(ConfigError::EmptyLogFilter);
        }
        if !self.document_path.starts_with('/') {
            return Err(ConfigError::RelativeDocumentPath {
                path: self.document_path.clone(),
            });
        }
        if self.initial_backoff_ms > self.max_backoff_ms {
            return Err(ConfigError::InvertedBackoff {
                initial_ms: self.initial_backoff_ms,
                max_ms: self.max_backoff_ms,
            });
        }
        Ok(())
    }

    /// Directory of the file-backed store.
    #[must_use]
    pub fn store_root(&self) -> &Utf8Path {
        &self.store_root
    }

    /// Path of the cluster document.
    #[must_use]
    pub fn document_path(&self) -> &str {
        &self.document_path
    }

    /// Tracing filter directive.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Log output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Retry budget per edit.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay before the first retry.
    #[must_use]
    pub const fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.initial_backoff_ms)
    }

    /// Ceiling on the retry delay.
    #[must_use]
    pub const fn max_backoff(&self) -> Duration {
        Duration::from_millis(self.max_backoff_ms)
    }

    /// Classes the construction probe accepts; empty accepts any.
    #[must_use]
    pub fn known_classes(&self) -> &[String] {
        &self.known_classes
    }
}
