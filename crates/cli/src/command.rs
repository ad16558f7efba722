//! Command trait for the hookgate CLI
//!
//! Every subcommand that needs the loaded configuration implements
//! [`Command`]. Commands that only touch the repository (`install`,
//! `uninstall`) or nothing at all (`sample-config`) are plain functions.

use crate::common::RuntimeContext;
use crate::error::Result;

/// A subcommand that runs against a loaded configuration
///
/// `Output` is what the caller needs to pick an exit code: `run` returns its
/// [`RunReport`](hookgate_engine::RunReport), `validate-config` the number of
/// resolved hooks.
pub trait Command {
    type Output;

    /// # Errors
    ///
    /// Returns a `CommandError` when hooks cannot be resolved or the command
    /// cannot complete.
    fn execute(&self, context: &RuntimeContext) -> Result<Self::Output>;
}
