//! Decoding and encoding of the shared cluster document.
//!
//! The document is a top-level JSON object mapping subsystem names to
//! subsystem-specific values. A node that does not exist yet decodes to an
//! empty object, so the first writer creates it lazily.

use serde_json::{Map, Value};

/// Decoded cluster document.
pub type ClusterDocument = Map<String, Value>;

/// Decodes node bytes, treating an absent node as an empty document.
///
/// # Errors
///
/// Returns the parse error when the bytes are not a JSON object.
pub fn decode(data: Option<&[u8]>) -> Result<ClusterDocument, serde_json::Error> {
    data.map_or_else(|| Ok(ClusterDocument::new()), |bytes| serde_json::from_slice(bytes))
}

/// Encodes a document for storage.
///
/// # Errors
///
/// Returns the serialisation error reported by `serde_json`.
pub fn encode(document: &ClusterDocument) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(document)
}
