//! Command-line argument definitions.

use clap::{Parser, Subcommand};
use plugboard_config::Config;

/// Command-line interface for the plugboard registry.
#[derive(Parser, Debug)]
#[command(name = "plugboard", version, disable_help_subcommand = true)]
pub(crate) struct Cli {
    /// Store, logging, and retry settings.
    #[command(flatten)]
    pub(crate) config: Config,
    /// Registry operation to perform.
    #[command(subcommand)]
    pub(crate) command: CliCommand,
}

/// Registry operations.
#[derive(Subcommand, Debug, Clone)]
pub(crate) enum CliCommand {
    /// Prints the current registry as `{"plugin": {...}}`.
    List,
    /// Registers a plugin from a JSON descriptor.
    Add {
        /// Plugin descriptor, for example `{"name":"p1","class":"com.foo.P1"}`.
        #[arg(value_name = "DESCRIPTOR")]
        descriptor: String,
    },
    /// Replaces a registered plugin's descriptor.
    Update {
        /// Replacement plugin descriptor.
        #[arg(value_name = "DESCRIPTOR")]
        descriptor: String,
    },
    /// Removes a plugin by name.
    Remove {
        /// Name of the plugin to remove.
        #[arg(value_name = "NAME")]
        name: String,
    },
    /// Applies a raw edit request such as `{"remove":"p1"}`.
    Apply {
        /// Request body selecting exactly one of `add`, `remove`, `update`.
        #[arg(value_name = "BODY")]
        body: String,
    },
}
