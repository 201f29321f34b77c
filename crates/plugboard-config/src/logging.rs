//! Log output format selection.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// How the operator CLI renders tracing events on stderr.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LogFormat {
    /// One flattened JSON object per event.
    #[default]
    Json,
    /// Single-line human-readable output.
    Compact,
}

/// Error returned when text names no known [`LogFormat`].
pub type LogFormatParseError = strum::ParseError;
