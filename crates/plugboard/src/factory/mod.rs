//! Construction of plugin instances from descriptors.
//!
//! Validation needs to know whether a descriptor actually describes a plugin
//! that can be built. A [`PluginFactory`] turns a descriptor into a live
//! [`PluginInstance`]; the [`ClassCatalogue`] is the stock factory, mapping
//! class names to constructor functions.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::descriptor::{CONFIG, PluginDescriptor};

/// Errors raised while building or initialising a plugin instance.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstructionError {
    /// No constructor is registered for the class.
    #[error("unknown plugin class '{class}'")]
    UnknownClass {
        /// Requested class.
        class: String,
    },

    /// The descriptor's configuration is not usable by the plugin.
    #[error("invalid plugin configuration: {message}")]
    InvalidConfig {
        /// Description of the problem.
        message: String,
    },

    /// The constructor or initialiser failed.
    #[error("failed to construct '{class}': {message}")]
    Failed {
        /// Class being constructed.
        class: String,
        /// Failure description.
        message: String,
    },
}

/// A live plugin object.
///
/// Both lifecycle hooks default to doing nothing.
pub trait PluginInstance: Send {
    /// Runs the instance's own setup.
    ///
    /// # Errors
    ///
    /// Returns a [`ConstructionError`] when setup fails.
    fn init(&mut self) -> Result<(), ConstructionError> {
        Ok(())
    }

    /// Releases resources held by the instance.
    ///
    /// # Errors
    ///
    /// Returns a [`ConstructionError`] when release fails.
    fn close(&mut self) -> Result<(), ConstructionError> {
        Ok(())
    }
}

/// Builds plugin instances from descriptors.
pub trait PluginFactory {
    /// Constructs an instance described by `descriptor`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConstructionError`] when the class is unknown or the
    /// constructor fails.
    fn construct(
        &self,
        descriptor: &PluginDescriptor,
    ) -> Result<Box<dyn PluginInstance>, ConstructionError>;
}

impl<F: PluginFactory + ?Sized> PluginFactory for &F {
    fn construct(
        &self,
        descriptor: &PluginDescriptor,
    ) -> Result<Box<dyn PluginInstance>, ConstructionError> {
        (**self).construct(descriptor)
    }
}

impl<F: PluginFactory + ?Sized> PluginFactory for Arc<F> {
    fn construct(
        &self,
        descriptor: &PluginDescriptor,
    ) -> Result<Box<dyn PluginInstance>, ConstructionError> {
        self.as_ref().construct(descriptor)
    }
}

/// Constructor function registered in a [`ClassCatalogue`].
pub type Constructor =
    fn(&PluginDescriptor) -> Result<Box<dyn PluginInstance>, ConstructionError>;

/// Factory that resolves classes through a table of constructors.
///
/// # Example
///
/// ```
/// use plugboard::{ClassCatalogue, ConstructionError, PluginDescriptor, PluginFactory};
///
/// let catalogue = ClassCatalogue::new().with_class("com.foo.P1", ClassCatalogue::configured);
///
/// assert!(catalogue.construct(&PluginDescriptor::named("p1", "com.foo.P1")).is_ok());
/// assert!(matches!(
///     catalogue.construct(&PluginDescriptor::named("p2", "com.foo.Missing")),
///     Err(ConstructionError::UnknownClass { .. })
/// ));
/// ```
#[derive(Clone, Default)]
pub struct ClassCatalogue {
    constructors: HashMap<String, Constructor>,
    fallback: Option<Constructor>,
}

impl ClassCatalogue {
    /// Creates a catalogue that knows no classes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a catalogue that builds a configuration-only instance for any
    /// class it does not explicitly know.
    #[must_use]
    pub fn permissive() -> Self {
        Self {
            constructors: HashMap::new(),
            fallback: Some(Self::configured),
        }
    }

    /// Registers `constructor` for `class`, consuming the catalogue.
    #[must_use]
    pub fn with_class(mut self, class: impl Into<String>, constructor: Constructor) -> Self {
        self.register(class, constructor);
        self
    }

    /// Registers `constructor` for `class`, replacing any earlier entry.
    pub fn register(&mut self, class: impl Into<String>, constructor: Constructor) {
        self.constructors.insert(class.into(), constructor);
    }

    /// Returns `true` when `class` has an explicit constructor.
    #[must_use]
    pub fn contains(&self, class: &str) -> bool {
        self.constructors.contains_key(class)
    }

    /// Returns `true` when unknown classes are accepted.
    #[must_use]
    pub const fn is_permissive(&self) -> bool {
        self.fallback.is_some()
    }

    /// Stock constructor: accepts any descriptor whose `config`, if present,
    /// is a JSON object.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructionError::InvalidConfig`] for a non-object
    /// `config`.
    pub fn configured(
        descriptor: &PluginDescriptor,
    ) -> Result<Box<dyn PluginInstance>, ConstructionError> {
        let config = match descriptor.field(CONFIG) {
            None => serde_json::Map::new(),
            Some(Value::Object(config)) => config.clone(),
            Some(_) => {
                return Err(ConstructionError::InvalidConfig {
                    message: format!("'{CONFIG}' must be a JSON object"),
                });
            }
        };
        Ok(Box::new(ConfiguredPlugin { config }))
    }
}

impl fmt::Debug for ClassCatalogue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut classes: Vec<&str> = self.constructors.keys().map(String::as_str).collect();
        classes.sort_unstable();
        f.debug_struct("ClassCatalogue")
            .field("classes", &classes)
            .field("permissive", &self.is_permissive())
            .finish()
    }
}

impl PluginFactory for ClassCatalogue {
    fn construct(
        &self,
        descriptor: &PluginDescriptor,
    ) -> Result<Box<dyn PluginInstance>, ConstructionError> {
        let class = descriptor.class().unwrap_or_default();
        self.constructors
            .get(class)
            .or(self.fallback.as_ref())
            .map_or_else(
                || {
                    Err(ConstructionError::UnknownClass {
                        class: class.to_owned(),
                    })
                },
                |constructor| constructor(descriptor),
            )
    }
}

/// Instance holding only its configuration.
#[derive(Debug)]
struct ConfiguredPlugin {
    config: serde_json::Map<String, Value>,
}

impl PluginInstance for ConfiguredPlugin {
    fn close(&mut self) -> Result<(), ConstructionError> {
        self.config.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests;
