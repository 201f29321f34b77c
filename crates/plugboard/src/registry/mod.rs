//! In-memory view of the plugin registry.
//!
//! The [`PluginRegistry`] maps plugin names to their descriptors. It is a
//! plain value: commands take one registry and produce the next, and the
//! [`codec`](crate::codec) moves it in and out of the cluster document.

use std::collections::BTreeMap;

use crate::descriptor::PluginDescriptor;

/// Registry of plugin descriptors keyed by name.
///
/// # Example
///
/// ```
/// use plugboard::{PluginDescriptor, PluginRegistry};
///
/// let mut registry = PluginRegistry::new();
/// registry.insert("p1", PluginDescriptor::named("p1", "com.foo.P1"));
/// assert!(registry.contains("p1"));
/// assert_eq!(registry.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PluginRegistry {
    entries: BTreeMap<String, PluginDescriptor>,
}

impl PluginRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a plugin by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&PluginDescriptor> {
        self.entries.get(name)
    }

    /// Returns `true` when a plugin with the given name is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Inserts or replaces an entry, returning the previous descriptor.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        descriptor: PluginDescriptor,
    ) -> Option<PluginDescriptor> {
        self.entries.insert(name.into(), descriptor)
    }

    /// Removes an entry, returning its descriptor.
    pub fn remove(&mut self, name: &str) -> Option<PluginDescriptor> {
        self.entries.remove(name)
    }

    /// Iterates over entries in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PluginDescriptor)> {
        self.entries
            .iter()
            .map(|(name, descriptor)| (name.as_str(), descriptor))
    }

    /// Returns the registered names in order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    /// Returns the number of registered plugins.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when no plugins are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, PluginDescriptor)> for PluginRegistry {
    fn from_iter<I: IntoIterator<Item = (String, PluginDescriptor)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for PluginRegistry {
    type Item = (String, PluginDescriptor);
    type IntoIter = std::collections::btree_map::IntoIter<String, PluginDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
