//! Transient construction probe.

use tracing::{error, warn};

use super::VALIDATION_TARGET;
use crate::descriptor::PluginDescriptor;
use crate::factory::{ConstructionError, PluginFactory, PluginInstance};

/// Owns a probe instance and closes it when dropped.
struct ProbeGuard<'a> {
    plugin: &'a str,
    instance: Box<dyn PluginInstance>,
}

impl Drop for ProbeGuard<'_> {
    fn drop(&mut self) {
        if let Err(error) = self.instance.close() {
            warn!(
                target: VALIDATION_TARGET,
                plugin = self.plugin,
                error = %error,
                "failed to release probe instance"
            );
        }
    }
}

/// Builds and initialises a throwaway instance of the described plugin.
///
/// The instance is closed on every path out of this function, including a
/// failing `init`.
pub(super) fn probe<F: PluginFactory>(
    factory: &F,
    descriptor: &PluginDescriptor,
) -> Result<(), ConstructionError> {
    let plugin = descriptor.name().unwrap_or_default();
    let result = factory.construct(descriptor).and_then(|instance| {
        let mut guard = ProbeGuard { plugin, instance };
        guard.instance.init()
    });
    if let Err(failure) = &result {
        error!(
            target: VALIDATION_TARGET,
            plugin,
            error = %failure,
            "error instantiating plugin"
        );
    }
    result
}
