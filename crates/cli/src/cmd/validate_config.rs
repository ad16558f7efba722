//! Validate-config command implementation
//!
//! Loading the configuration already validates its structure; this command
//! also resolves every hook, so unknown ids, bad arguments and missing tools
//! are reported without touching any file.

use anyhow::Context;
use clap::Args;
use hookgate_engine::HookRegistry;

use crate::command::Command;
use crate::common::RuntimeContext;
use crate::error::Result;
use crate::ui::StatusIcon;

/// Load and resolve the configuration
#[derive(Debug, Default, Args)]
pub struct ValidateConfigCommand;

impl Command for ValidateConfigCommand {
    /// Number of resolved hooks
    type Output = usize;

    fn execute(&self, context: &RuntimeContext) -> Result<usize> {
        let hooks = HookRegistry::new()
            .resolve(&context.config, context.repo_root())
            .context("Failed to resolve hooks")?;

        println!(
            "{} {} is valid ({} hooks from {} repositories)",
            StatusIcon::Success,
            context.config_path().display(),
            hooks.len(),
            context.config.repos.len()
        );
        Ok(hooks.len())
    }
}
