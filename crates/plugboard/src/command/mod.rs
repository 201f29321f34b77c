//! Registry edit commands.
//!
//! A [`Command`] is the decoded form of one edit request. [`apply`] is the
//! single dispatch point: a pure function from the current registry to the
//! next one, or to [`Transition::Unchanged`] when there is nothing to write.
//! It never touches the store, so the updater can safely re-run it against a
//! fresh registry after losing a compare-and-set race.

use plugboard_store::Transition;
use thiserror::Error;

use crate::descriptor::PluginDescriptor;
use crate::registry::PluginRegistry;

/// One edit of the plugin registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Register a new plugin.
    Add(PluginDescriptor),
    /// Delete the named plugin.
    Remove(String),
    /// Replace an existing plugin's descriptor.
    Update(PluginDescriptor),
}

impl Command {
    /// Wire name of the command.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Add(_) => "add",
            Self::Remove(_) => "remove",
            Self::Update(_) => "update",
        }
    }

    /// Descriptor carried by `add` and `update`.
    #[must_use]
    pub const fn descriptor(&self) -> Option<&PluginDescriptor> {
        match self {
            Self::Add(descriptor) | Self::Update(descriptor) => Some(descriptor),
            Self::Remove(_) => None,
        }
    }

    /// Name of the plugin the command addresses.
    #[must_use]
    pub fn target(&self) -> Option<&str> {
        match self {
            Self::Add(descriptor) | Self::Update(descriptor) => descriptor.name(),
            Self::Remove(name) => Some(name),
        }
    }
}

/// A command that does not fit the current registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// `add` named a plugin that is already registered.
    #[error("{name} already exists")]
    AlreadyExists {
        /// Plugin name.
        name: String,
    },

    /// `remove` or `update` named a plugin that is not registered.
    #[error("No such plugin: {name}")]
    NoSuchPlugin {
        /// Plugin name.
        name: String,
    },

    /// The descriptor carries no string `name`. This is a malformed
    /// descriptor rather than a registry conflict.
    #[error("'name' is required")]
    MissingName,
}

/// Applies `command` to `registry`.
///
/// # Errors
///
/// Returns a [`CommandError`] when the target already exists (`add`), does
/// not exist (`remove`, `update`), or cannot be named.
pub fn apply(
    mut registry: PluginRegistry,
    command: &Command,
) -> Result<Transition<PluginRegistry>, CommandError> {
    match command {
        Command::Add(descriptor) => {
            let name = name_of(descriptor)?;
            if registry.contains(name) {
                return Err(CommandError::AlreadyExists {
                    name: name.to_owned(),
                });
            }
            registry.insert(name, descriptor.clone());
        }
        Command::Remove(name) => {
            if registry.remove(name).is_none() {
                return Err(no_such_plugin(name));
            }
        }
        Command::Update(descriptor) => {
            let name = name_of(descriptor)?;
            match registry.get(name) {
                None => return Err(no_such_plugin(name)),
                Some(existing) if existing == descriptor => return Ok(Transition::Unchanged),
                Some(_) => {
                    registry.insert(name, descriptor.clone());
                }
            }
        }
    }
    Ok(Transition::Commit(registry))
}

fn name_of(descriptor: &PluginDescriptor) -> Result<&str, CommandError> {
    descriptor.name().ok_or(CommandError::MissingName)
}

fn no_such_plugin(name: &str) -> CommandError {
    CommandError::NoSuchPlugin {
        name: name.to_owned(),
    }
}
