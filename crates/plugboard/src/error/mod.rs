//! Error taxonomy surfaced by the plugin API.
//!
//! Callers distinguish five kinds of failure: an invalid descriptor, a
//! command that conflicts with the registry, contention that exhausted the
//! retry budget, a store fault, and cancellation. Each carries enough context
//! to render the list of messages the API envelope returns.

use plugboard_store::{StoreError, UpdateError};
use thiserror::Error;

use crate::codec::CodecError;
use crate::command::CommandError;
use crate::validation::ValidationErrors;

/// Failure of a plugin API operation.
#[derive(Debug, Clone, Error)]
pub enum PluginApiError {
    /// The descriptor failed validation; the store was not touched.
    #[error("validation failed: {}", .errors.join("; "))]
    Validation {
        /// One message per problem.
        errors: Vec<String>,
    },

    /// The command does not fit the current registry.
    #[error("{message}")]
    Conflict {
        /// Conflict description.
        message: String,
    },

    /// Every compare-and-set attempt lost to a concurrent writer.
    #[error("registry update abandoned after {attempts} conflicting attempts")]
    Contention {
        /// Attempts made before giving up.
        attempts: u32,
    },

    /// The coordination store failed.
    #[error(transparent)]
    Store(StoreError),

    /// The operation was cancelled before it committed.
    #[error("operation cancelled")]
    Cancelled,

    /// The stored document or its registry has the wrong shape.
    #[error("malformed cluster document: {message}")]
    MalformedDocument {
        /// Description of the problem.
        message: String,
    },

    /// The request body could not be decoded into a command.
    #[error("{message}")]
    MalformedRequest {
        /// Description of the problem.
        message: String,
    },
}

impl PluginApiError {
    /// Classifies a store failure, mapping interruption to cancellation.
    #[must_use]
    pub fn from_store(error: StoreError) -> Self {
        if error.is_interrupted() {
            Self::Cancelled
        } else {
            Self::Store(error)
        }
    }

    /// Human-readable messages for the response envelope; never empty.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        match self {
            Self::Validation { errors } if !errors.is_empty() => errors.clone(),
            other => vec![other.to_string()],
        }
    }

    /// Returns `true` when retrying the whole command may succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Contention { .. })
    }
}

impl From<ValidationErrors> for PluginApiError {
    fn from(error: ValidationErrors) -> Self {
        Self::Validation {
            errors: error.into_messages(),
        }
    }
}

impl From<CommandError> for PluginApiError {
    fn from(error: CommandError) -> Self {
        match error {
            CommandError::MissingName => Self::Validation {
                errors: vec![error.to_string()],
            },
            CommandError::AlreadyExists { .. } | CommandError::NoSuchPlugin { .. } => {
                Self::Conflict {
                    message: error.to_string(),
                }
            }
        }
    }
}

impl From<CodecError> for PluginApiError {
    fn from(error: CodecError) -> Self {
        Self::MalformedDocument {
            message: error.to_string(),
        }
    }
}

impl From<UpdateError<Self>> for PluginApiError {
    fn from(error: UpdateError<Self>) -> Self {
        match error {
            UpdateError::Rejected(inner) => inner,
            UpdateError::Contention { attempts, .. } => Self::Contention { attempts },
            UpdateError::Cancelled { .. } => Self::Cancelled,
            UpdateError::Store(store) => Self::from_store(store),
            error @ (UpdateError::MalformedDocument { .. } | UpdateError::Encode { .. }) => {
                Self::MalformedDocument {
                    message: error.to_string(),
                }
            }
        }
    }
}
