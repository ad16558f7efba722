//! List command implementation
//!
//! Shows every declared hook as it resolves: its source, capability and file
//! selection.

use anyhow::Context;
use clap::{Args, ValueEnum};
use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use hookgate_engine::{Capability, HookRegistry, ResolvedHook};
use serde::Serialize;

use crate::command::Command;
use crate::common::RuntimeContext;
use crate::error::Result;

/// Output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ListFormat {
    #[default]
    Table,
    Json,
}

/// List the resolved hooks
#[derive(Debug, Default, Args)]
pub struct ListCommand {
    /// Output format
    #[arg(long, value_enum, default_value_t)]
    pub format: ListFormat,
}

/// Serializable view of a resolved hook
#[derive(Debug, Serialize)]
pub struct HookSummary {
    pub id: String,
    pub name: String,
    pub repo: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    pub capability: Capability,
    pub args: Vec<String>,
    pub types: Vec<String>,
    pub always_run: bool,
}

impl From<&ResolvedHook> for HookSummary {
    fn from(hook: &ResolvedHook) -> Self {
        Self {
            id: hook.id.clone(),
            name: hook.name.clone(),
            repo: hook.source.url().to_string(),
            rev: hook.source.rev().map(str::to_string),
            capability: hook.capability(),
            args: hook.args.clone(),
            types: hook.filter.types().to_vec(),
            always_run: hook.always_run,
        }
    }
}

impl Command for ListCommand {
    type Output = ();

    fn execute(&self, context: &RuntimeContext) -> Result<()> {
        let hooks = HookRegistry::new()
            .resolve(&context.config, context.repo_root())
            .context("Failed to resolve hooks")?;
        let summaries: Vec<HookSummary> = hooks.iter().map(HookSummary::from).collect();

        match self.format {
            ListFormat::Json => {
                let json = serde_json::to_string_pretty(&summaries)
                    .context("Failed to serialize hooks")?;
                println!("{json}");
            }
            ListFormat::Table => {
                if summaries.is_empty() {
                    println!("No hooks configured.");
                } else {
                    println!("{}", render_table(&summaries));
                }
            }
        }
        Ok(())
    }
}

fn render_table(summaries: &[HookSummary]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["#", "Hook", "Kind", "Source", "Args", "Types"]);

    for (index, hook) in summaries.iter().enumerate() {
        let source = match &hook.rev {
            Some(rev) => format!("{}@{rev}", hook.repo),
            None => hook.repo.clone(),
        };
        table.add_row(vec![
            (index + 1).to_string(),
            hook.id.clone(),
            hook.capability.to_string(),
            source,
            hook.args.join(" "),
            hook.types.join(", "),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use hookgate_config::PipelineConfig;
    use tempfile::TempDir;

    fn summaries(yaml: &str) -> Vec<HookSummary> {
        let config = PipelineConfig::from_yaml_str(yaml).unwrap();
        let temp = TempDir::new().unwrap();
        HookRegistry::new()
            .resolve(&config, temp.path())
            .unwrap()
            .iter()
            .map(HookSummary::from)
            .collect()
    }

    const CONFIG: &str = r"
repos:
  - repo: https://github.com/pre-commit/pre-commit-hooks
    rev: v4.3.0
    hooks:
      - id: pretty-format-json
        args: [--autofix, --indent=4]
      - id: check-yaml
";

    #[test]
    fn test_summary_fields() {
        let hooks = summaries(CONFIG);
        assert_eq!(hooks.len(), 2);
        assert_eq!(hooks[0].id, "pretty-format-json");
        assert_eq!(hooks[0].capability, Capability::Fixer);
        assert_eq!(hooks[0].rev.as_deref(), Some("v4.3.0"));
        assert_eq!(hooks[0].args, vec!["--autofix", "--indent=4"]);
        assert_eq!(hooks[1].types, vec!["yaml"]);
    }

    #[test]
    fn test_json_output() {
        let json = serde_json::to_value(summaries(CONFIG)).unwrap();
        assert_eq!(json[0]["id"], "pretty-format-json");
        assert_eq!(json[0]["capability"], "fixer");
        assert_eq!(json[1]["capability"], "validator");
    }

    #[test]
    fn test_table_lists_every_hook() {
        let table = render_table(&summaries(CONFIG)).to_string();
        assert!(table.contains("pretty-format-json"));
        assert!(table.contains("check-yaml"));
        assert!(table.contains("--autofix"));
    }
}
