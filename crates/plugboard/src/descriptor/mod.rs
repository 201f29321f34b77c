//! Plugin descriptors as stored in the shared registry.
//!
//! A [`PluginDescriptor`] is an opaque JSON object. Plugboard interprets only
//! a handful of well-known fields (`name`, `class`, `version`, `path-prefix`,
//! `config`); everything else is carried through untouched, and two
//! descriptors are equal exactly when their JSON objects are deep-equal.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field holding the plugin's registry name.
pub const NAME: &str = "name";

/// Field naming the implementation class.
pub const CLASS: &str = "class";

/// Field holding the package version of a packaged class.
pub const VERSION: &str = "version";

/// Field holding the URL path prefix the plugin is mounted under.
pub const PATH_PREFIX: &str = "path-prefix";

/// Field holding plugin-specific configuration.
pub const CONFIG: &str = "config";

/// Separates the package name from the class name in a packaged class.
pub const PACKAGE_SEPARATOR: char = ':';

/// Descriptor of one plugin's configuration.
///
/// # Example
///
/// ```
/// use plugboard::PluginDescriptor;
/// use serde_json::json;
///
/// let descriptor = PluginDescriptor::named("p1", "mypkg:com.foo.P1")
///     .with_version("1.2")
///     .with_field("config", json!({"threads": 4}));
///
/// assert_eq!(descriptor.name(), Some("p1"));
/// assert!(descriptor.is_packaged());
/// assert_eq!(descriptor.package(), Some("mypkg"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PluginDescriptor {
    fields: Map<String, Value>,
}

impl PluginDescriptor {
    /// Wraps an existing JSON object.
    #[must_use]
    pub const fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Creates a descriptor with the given name and class.
    #[must_use]
    pub fn named(name: impl Into<String>, class: impl Into<String>) -> Self {
        Self::default()
            .with_field(NAME, Value::String(name.into()))
            .with_field(CLASS, Value::String(class.into()))
    }

    /// Sets the package version.
    #[must_use]
    pub fn with_version(self, version: impl Into<String>) -> Self {
        self.with_field(VERSION, Value::String(version.into()))
    }

    /// Sets an arbitrary field.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.fields.insert(key.into(), value);
        self
    }

    /// Returns the plugin name when it is a string.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.string_field(NAME)
    }

    /// Returns the implementation class when it is a string.
    #[must_use]
    pub fn class(&self) -> Option<&str> {
        self.string_field(CLASS)
    }

    /// Returns the package version when it is a string.
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.string_field(VERSION)
    }

    /// Returns `true` when a non-null `version` value is present.
    #[must_use]
    pub fn has_version(&self) -> bool {
        self.field(VERSION).is_some()
    }

    /// Returns a field, treating JSON `null` as absent.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key).filter(|value| !value.is_null())
    }

    /// Returns `true` when the class names a packaged implementation, that
    /// is when it contains the package separator after at least one
    /// character.
    #[must_use]
    pub fn is_packaged(&self) -> bool {
        self.package().is_some()
    }

    /// Returns the package part of a packaged class.
    #[must_use]
    pub fn package(&self) -> Option<&str> {
        self.class()
            .and_then(|class| class.split_once(PACKAGE_SEPARATOR))
            .map(|(package, _)| package)
            .filter(|package| !package.is_empty())
    }

    /// Returns the underlying JSON object.
    #[must_use]
    pub const fn as_map(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Consumes the descriptor, returning its JSON object.
    #[must_use]
    pub fn into_map(self) -> Map<String, Value> {
        self.fields
    }

    fn string_field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }
}

impl From<Map<String, Value>> for PluginDescriptor {
    fn from(fields: Map<String, Value>) -> Self {
        Self::new(fields)
    }
}

impl From<PluginDescriptor> for Value {
    fn from(descriptor: PluginDescriptor) -> Self {
        Self::Object(descriptor.fields)
    }
}
