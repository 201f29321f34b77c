//! Moves the plugin registry in and out of the cluster document.
//!
//! The registry is the object stored under [`PLUGIN_KEY`]. Decoding an
//! outer document without that key yields an empty registry. Encoding
//! replaces only that key, so sibling subsystems' entries survive every
//! round trip untouched.

use plugboard_store::ClusterDocument;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::descriptor::PluginDescriptor;
use crate::registry::PluginRegistry;

/// Key of the cluster document reserved for the plugin registry.
pub const PLUGIN_KEY: &str = "plugin";

/// The stored registry does not have the expected shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// The value under [`PLUGIN_KEY`] is not a JSON object.
    #[error("'{PLUGIN_KEY}' entry of the cluster document is not a JSON object")]
    RegistryNotObject,

    /// A registry entry is not a JSON object.
    #[error("registry entry '{name}' is not a JSON object")]
    EntryNotObject {
        /// Name of the offending entry.
        name: String,
    },
}

/// Extracts the plugin registry from the outer document.
///
/// # Errors
///
/// Returns a [`CodecError`] when the registry or one of its entries is not a
/// JSON object.
pub fn decode(document: &ClusterDocument) -> Result<PluginRegistry, CodecError> {
    let entries = match document.get(PLUGIN_KEY) {
        None | Some(Value::Null) => return Ok(PluginRegistry::new()),
        Some(Value::Object(entries)) => entries,
        Some(_) => return Err(CodecError::RegistryNotObject),
    };

    entries
        .iter()
        .map(|(name, value)| match value {
            Value::Object(fields) => Ok((name.clone(), PluginDescriptor::new(fields.clone()))),
            _ => Err(CodecError::EntryNotObject { name: name.clone() }),
        })
        .collect()
}

/// Replaces the registry in the outer document, leaving every other key as
/// it was.
pub fn encode(document: &mut ClusterDocument, registry: &PluginRegistry) {
    document.insert(PLUGIN_KEY.to_owned(), to_value(registry));
}

/// Renders the registry as the JSON object stored under [`PLUGIN_KEY`].
#[must_use]
pub fn to_value(registry: &PluginRegistry) -> Value {
    let entries: Map<String, Value> = registry
        .iter()
        .map(|(name, descriptor)| (name.to_owned(), Value::Object(descriptor.as_map().clone())))
        .collect();
    Value::Object(entries)
}
