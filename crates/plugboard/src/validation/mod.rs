//! Descriptor validation.
//!
//! [`Validator::validate`] runs three checks in order and reports every
//! problem it finds:
//!
//! 1. a packaged class (one containing `:` after its first character) must
//!    carry a `version`;
//! 2. the descriptor must have the registry's structural shape;
//! 3. the described plugin must actually be constructible, which is checked
//!    by building a throwaway instance through a [`PluginFactory`].
//!
//! The construction probe only runs when the first two checks pass. It never
//! touches the coordination store, and the probe instance is always released
//! before `validate` returns.

mod probe;

use serde_json::Value;
use thiserror::Error;

use crate::descriptor::{CLASS, CONFIG, NAME, PATH_PREFIX, PluginDescriptor, VERSION};
use crate::factory::PluginFactory;

/// Tracing target for validation events.
pub(crate) const VALIDATION_TARGET: &str = "plugboard::validation";

/// Message reported when a packaged class lacks a version.
pub const MISSING_VERSION: &str = "must provide version";

/// Every problem found in one descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid plugin descriptor: {}", .messages.join("; "))]
pub struct ValidationErrors {
    messages: Vec<String>,
}

impl ValidationErrors {
    /// Wraps a list of messages.
    #[must_use]
    pub const fn new(messages: Vec<String>) -> Self {
        Self { messages }
    }

    /// The individual messages, in the order they were found.
    #[must_use]
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Consumes the error, returning its messages.
    #[must_use]
    pub fn into_messages(self) -> Vec<String> {
        self.messages
    }
}

/// Checks descriptors before they are allowed near the store.
#[derive(Debug, Clone)]
pub struct Validator<F> {
    factory: F,
}

impl<F> Validator<F> {
    /// Creates a validator that probes construction through `factory`.
    #[must_use]
    pub const fn new(factory: F) -> Self {
        Self { factory }
    }

    /// Returns the factory used for construction probes.
    #[must_use]
    pub const fn factory(&self) -> &F {
        &self.factory
    }
}

impl<F: PluginFactory> Validator<F> {
    /// Validates `descriptor`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationErrors`] carrying one message per problem found.
    pub fn validate(&self, descriptor: &PluginDescriptor) -> Result<(), ValidationErrors> {
        let mut messages = Vec::new();
        if descriptor.is_packaged() && !descriptor.has_version() {
            messages.push(MISSING_VERSION.to_owned());
        }
        messages.extend(structural_errors(descriptor));

        if messages.is_empty()
            && let Err(error) = probe::probe(&self.factory, descriptor)
        {
            messages.push(error.to_string());
        }

        if messages.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors::new(messages))
        }
    }
}

fn structural_errors(descriptor: &PluginDescriptor) -> Vec<String> {
    let mut errors = Vec::new();

    match descriptor.field(NAME) {
        None => errors.push(format!("'{NAME}' is required")),
        Some(Value::String(name)) if name.is_empty() => {
            errors.push(format!("'{NAME}' must not be empty"));
        }
        Some(Value::String(name)) if name.contains('/') => {
            errors.push(format!("'{NAME}' must not contain '/'"));
        }
        Some(Value::String(_)) => {}
        Some(_) => errors.push(format!("'{NAME}' must be a string")),
    }

    match descriptor.field(CLASS) {
        None => errors.push(format!("'{CLASS}' is required")),
        Some(Value::String(class)) if class.is_empty() => {
            errors.push(format!("'{CLASS}' must not be empty"));
        }
        Some(Value::String(_)) => {}
        Some(_) => errors.push(format!("'{CLASS}' must be a string")),
    }

    for key in [VERSION, PATH_PREFIX] {
        if descriptor.field(key).is_some_and(|value| !value.is_string()) {
            errors.push(format!("'{key}' must be a string"));
        }
    }

    if descriptor.field(CONFIG).is_some_and(|value| !value.is_object()) {
        errors.push(format!("'{CONFIG}' must be a JSON object"));
    }

    errors
}
