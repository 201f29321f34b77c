//! The plugin API facade.
//!
//! [`PluginsApi`] is what a binding layer (HTTP routes, the CLI) talks to.
//! Reads decode the registry from the current document. Edits validate the
//! descriptor first, and only a valid command is turned into a document
//! transform and handed to the [`AtomicUpdater`].

use plugboard_store::{AtomicUpdater, ClusterDocument, CoordinationStore, Transition, UpdateOutcome};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::codec::{self, PLUGIN_KEY};
use crate::command::{self, Command};
use crate::descriptor::PluginDescriptor;
use crate::error::PluginApiError;
use crate::factory::PluginFactory;
use crate::registry::PluginRegistry;
use crate::request::EditRequest;
use crate::validation::Validator;

/// Tracing target for API events.
const API_TARGET: &str = "plugboard::api";

/// Well-known path of the cluster document.
pub const CLUSTER_PROPS_PATH: &str = "/clusterprops.json";

/// Response envelope of an edit request.
///
/// `errors` is empty on success and lists every problem otherwise.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditResponse {
    /// Human-readable failure messages.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl EditResponse {
    /// Returns `true` when the edit succeeded.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

impl From<Result<UpdateOutcome, PluginApiError>> for EditResponse {
    fn from(result: Result<UpdateOutcome, PluginApiError>) -> Self {
        Self {
            errors: result.err().map(|error| error.messages()).unwrap_or_default(),
        }
    }
}

/// Reads and edits the shared plugin registry.
#[derive(Debug, Clone)]
pub struct PluginsApi<S, F> {
    updater: AtomicUpdater<S>,
    validator: Validator<F>,
    path: String,
}

impl<S, F> PluginsApi<S, F> {
    /// Creates an API over the document at [`CLUSTER_PROPS_PATH`].
    #[must_use]
    pub fn new(updater: AtomicUpdater<S>, factory: F) -> Self {
        Self {
            updater,
            validator: Validator::new(factory),
            path: CLUSTER_PROPS_PATH.to_owned(),
        }
    }

    /// Uses the document at `path` instead.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Path of the cluster document.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The updater driving edits.
    #[must_use]
    pub const fn updater(&self) -> &AtomicUpdater<S> {
        &self.updater
    }
}

impl<S: CoordinationStore, F: PluginFactory> PluginsApi<S, F> {
    /// Returns the current registry.
    ///
    /// A missing document or registry key yields an empty registry.
    ///
    /// # Errors
    ///
    /// Returns [`PluginApiError::Store`] when the store cannot be read and
    /// [`PluginApiError::MalformedDocument`] when the stored document has the
    /// wrong shape.
    pub fn list(&self) -> Result<PluginRegistry, PluginApiError> {
        let snapshot = self
            .updater
            .store()
            .get(&self.path)
            .map_err(PluginApiError::from_store)?;
        let document = plugboard_store::document::decode(snapshot.data()).map_err(|error| {
            PluginApiError::MalformedDocument {
                message: format!("document at '{}' is not a JSON object: {error}", self.path),
            }
        })?;
        Ok(codec::decode(&document)?)
    }

    /// Validates and commits `command`.
    ///
    /// # Errors
    ///
    /// Returns the [`PluginApiError`] matching the failure: validation and
    /// conflict errors leave the document untouched.
    pub fn execute(&self, command: &Command) -> Result<UpdateOutcome, PluginApiError> {
        if let Some(descriptor) = command.descriptor()
            && let Err(errors) = self.validator.validate(descriptor)
        {
            warn!(
                target: API_TARGET,
                command = command.name(),
                plugin = command.target().unwrap_or_default(),
                error = %errors,
                "rejected invalid descriptor"
            );
            return Err(errors.into());
        }

        debug!(
            target: API_TARGET,
            command = command.name(),
            plugin = command.target().unwrap_or_default(),
            "submitting registry edit"
        );
        let outcome = self
            .updater
            .apply(&self.path, |document| edit(document, command))?;
        info!(
            target: API_TARGET,
            command = command.name(),
            plugin = command.target().unwrap_or_default(),
            committed = outcome.is_committed(),
            attempts = outcome.attempts(),
            "registry edit complete"
        );
        Ok(outcome)
    }

    /// Registers a new plugin.
    ///
    /// # Errors
    ///
    /// See [`PluginsApi::execute`].
    pub fn add(&self, descriptor: PluginDescriptor) -> Result<UpdateOutcome, PluginApiError> {
        self.execute(&Command::Add(descriptor))
    }

    /// Removes the named plugin.
    ///
    /// # Errors
    ///
    /// See [`PluginsApi::execute`].
    pub fn remove(&self, name: impl Into<String>) -> Result<UpdateOutcome, PluginApiError> {
        self.execute(&Command::Remove(name.into()))
    }

    /// Replaces an existing plugin's descriptor.
    ///
    /// # Errors
    ///
    /// See [`PluginsApi::execute`].
    pub fn update(&self, descriptor: PluginDescriptor) -> Result<UpdateOutcome, PluginApiError> {
        self.execute(&Command::Update(descriptor))
    }

    /// Answers a read request with `{"plugin": {...}}`.
    ///
    /// # Errors
    ///
    /// See [`PluginsApi::list`].
    pub fn handle_get(&self) -> Result<Value, PluginApiError> {
        let registry = self.list()?;
        let mut body = Map::new();
        body.insert(PLUGIN_KEY.to_owned(), codec::to_value(&registry));
        Ok(Value::Object(body))
    }

    /// Answers an edit request body.
    #[must_use]
    pub fn handle_post(&self, body: &[u8]) -> EditResponse {
        EditResponse::from(EditRequest::parse(body).and_then(|command| self.execute(&command)))
    }
}

fn edit(
    mut document: ClusterDocument,
    command: &Command,
) -> Result<Transition<ClusterDocument>, PluginApiError> {
    let registry = codec::decode(&document)?;
    Ok(command::apply(registry, command)?.map(|next| {
        codec::encode(&mut document, &next);
        document
    }))
}

#[cfg(test)]
mod tests;
