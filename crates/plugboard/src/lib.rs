//! Cluster-wide plugin registry for plugboard.
//!
//! The `plugboard` crate maintains the named registry of plugin
//! configurations that every node of a cluster shares. The registry lives
//! under the `plugin` key of a single JSON document in the coordination
//! store; all edits go through the optimistic compare-and-set loop provided by
//! [`plugboard_store::AtomicUpdater`], so concurrent writers on different
//! machines never lose each other's updates.
//!
//! # Architecture
//!
//! An edit flows through three stages:
//!
//! 1. **Validation**: the [`Validator`] checks the descriptor's shape and
//!    runs a transient construction probe through a [`PluginFactory`]. Any
//!    failure aborts the edit before the store is touched.
//! 2. **Command processing**: [`command::apply`] is a pure function from the
//!    current [`PluginRegistry`] and a [`Command`] to either a new registry
//!    or "no change".
//! 3. **Commit**: the [`PluginsApi`] wraps the command in a document
//!    transform and hands it to the updater, which retries on version
//!    conflicts.
//!
//! # Example
//!
//! ```
//! use plugboard::{ClassCatalogue, PluginDescriptor, PluginsApi};
//! use plugboard_store::{AtomicUpdater, MemoryStore, RetryPolicy};
//!
//! let updater = AtomicUpdater::new(MemoryStore::new(), RetryPolicy::default());
//! let api = PluginsApi::new(updater, ClassCatalogue::permissive());
//!
//! let descriptor = PluginDescriptor::named("p1", "com.foo.P1").with_version("1");
//! api.add(descriptor).expect("add succeeds");
//! assert!(api.list().expect("list").contains("p1"));
//! ```

pub mod api;
pub mod codec;
pub mod command;
pub mod descriptor;
pub mod error;
pub mod factory;
pub mod registry;
pub mod request;
pub mod validation;

#[cfg(test)]
mod tests;

pub use self::api::{CLUSTER_PROPS_PATH, EditResponse, PluginsApi};
pub use self::codec::{CodecError, PLUGIN_KEY};
pub use self::command::{Command, CommandError};
pub use self::descriptor::PluginDescriptor;
pub use self::error::PluginApiError;
pub use self::factory::{ClassCatalogue, ConstructionError, PluginFactory, PluginInstance};
pub use self::registry::PluginRegistry;
pub use self::request::EditRequest;
pub use self::validation::{ValidationErrors, Validator};
