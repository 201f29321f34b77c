//! Wire decoding of edit requests.
//!
//! The POST body selects exactly one command by key:
//! `{"add": <descriptor>}`, `{"remove": "<name>"}` or
//! `{"update": <descriptor>}`. Decoding is kept apart from
//! [`command::apply`](crate::command::apply) so the business logic never sees
//! raw JSON.

use serde_json::Value;

use crate::command::Command;
use crate::descriptor::PluginDescriptor;
use crate::error::PluginApiError;

/// Wire name of the add command.
pub const ADD: &str = "add";
/// Wire name of the remove command.
pub const REMOVE: &str = "remove";
/// Wire name of the update command.
pub const UPDATE: &str = "update";

/// Decoder for POST bodies.
#[derive(Debug, Clone, Copy, Default)]
pub struct EditRequest;

impl EditRequest {
    /// Decodes a request body into a [`Command`].
    ///
    /// # Errors
    ///
    /// Returns [`PluginApiError::MalformedRequest`] when the body is not a
    /// JSON object with exactly one known command key, or when the payload
    /// has the wrong type for its command.
    pub fn parse(body: &[u8]) -> Result<Command, PluginApiError> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|error| malformed(format!("request body is not valid JSON: {error}")))?;
        Self::from_value(value)
    }

    /// Decodes an already-parsed request body.
    ///
    /// # Errors
    ///
    /// See [`EditRequest::parse`].
    pub fn from_value(value: Value) -> Result<Command, PluginApiError> {
        let Value::Object(body) = value else {
            return Err(malformed("request body must be a JSON object".to_owned()));
        };
        let mut entries = body.into_iter();
        let (Some((key, payload)), None) = (entries.next(), entries.next()) else {
            return Err(malformed(
                "request body must contain exactly one command".to_owned(),
            ));
        };

        match key.as_str() {
            ADD => descriptor(&key, payload).map(Command::Add),
            UPDATE => descriptor(&key, payload).map(Command::Update),
            REMOVE => match payload {
                Value::String(name) => Ok(Command::Remove(name)),
                _ => Err(malformed(format!("'{REMOVE}' expects a plugin name"))),
            },
            _ => Err(malformed(format!("Unknown command: {key}"))),
        }
    }
}

fn descriptor(key: &str, payload: Value) -> Result<PluginDescriptor, PluginApiError> {
    match payload {
        Value::Object(fields) => Ok(PluginDescriptor::new(fields)),
        _ => Err(malformed(format!("'{key}' expects a plugin descriptor object"))),
    }
}

const fn malformed(message: String) -> PluginApiError {
    PluginApiError::MalformedRequest { message }
}
