//! Built-in configuration defaults.

use std::env;

use camino::Utf8PathBuf;

use crate::logging::LogFormat;

/// Well-known path of the cluster document inside the store.
pub const DEFAULT_DOCUMENT_PATH: &str = "/clusterprops.json";

/// Default log filter expression.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Default number of compare-and-set attempts per edit.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 16;

/// Default delay before the first retry, in milliseconds.
pub const DEFAULT_INITIAL_BACKOFF_MS: u64 = 10;

/// Default ceiling on the retry delay, in milliseconds.
pub const DEFAULT_MAX_BACKOFF_MS: u64 = 1000;

/// Directory name used under the platform data directory.
const STORE_DIR_NAME: &str = "plugboard";

/// Default log filter expression.
#[must_use]
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value for serde defaults.
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default log format.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Json
}

/// Owned document path for serde defaults.
#[must_use]
pub fn default_document_path() -> String {
    DEFAULT_DOCUMENT_PATH.to_owned()
}

/// Default retry budget.
#[must_use]
pub const fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

/// Default initial backoff in milliseconds.
#[must_use]
pub const fn default_initial_backoff_ms() -> u64 {
    DEFAULT_INITIAL_BACKOFF_MS
}

/// Default maximum backoff in milliseconds.
#[must_use]
pub const fn default_max_backoff_ms() -> u64 {
    DEFAULT_MAX_BACKOFF_MS
}

/// Directory holding the file-backed store.
///
/// Uses the platform data directory when one exists and the temporary
/// directory otherwise.
#[must_use]
pub fn default_store_root() -> Utf8PathBuf {
    let mut base = dirs::data_dir()
        .and_then(|path| Utf8PathBuf::from_path_buf(path).ok())
        .unwrap_or_else(fallback_base_directory);
    base.push(STORE_DIR_NAME);
    base
}

fn fallback_base_directory() -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(env::temp_dir()).unwrap_or_else(|_| Utf8PathBuf::from("/tmp"))
}
