//! hookgate CLI library
//!
//! Argument parsing and command dispatch for the `hookgate` binary, kept in a
//! library so commands can be tested directly.

pub mod cmd;
pub mod command;
pub mod common;
pub mod error;
pub mod ui;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::LazyLock;

use cmd::install::{InstallCommand, Installed, Uninstalled};
use command::Command;
use common::RuntimeContext;
use ui::StatusIcon;

/// Exit code when every hook passed without modifying anything
pub const EXIT_SUCCESS: i32 = 0;
/// Exit code when a hook failed or modified files
pub const EXIT_HOOKS_FAILED: i32 = 1;
/// Exit code for configuration and runtime errors
pub const EXIT_ERROR: i32 = 2;

/// Version plus build metadata from `build.rs`
static LONG_VERSION: LazyLock<String> = LazyLock::new(|| {
    format!(
        "{}\ncommit: {}\nrustc: {}",
        env!("CARGO_PKG_VERSION"),
        option_env!("VERGEN_GIT_SHA").unwrap_or("unknown"),
        option_env!("VERGEN_RUSTC_SEMVER").unwrap_or("unknown"),
    )
});

/// hookgate - run pre-commit hooks over the files of a commit
#[derive(Parser)]
#[command(name = "hookgate")]
#[command(about = "Run pre-commit hooks over the files of a commit")]
#[command(version, long_version = LONG_VERSION.as_str())]
#[command(long_about = "Run pre-commit hooks over the files of a commit

Hooks are declared in .pre-commit-config.yaml at the repository root and run
one after another in declaration order. Fixers rewrite files in place, so
later hooks see their output. Files that are not syntactically valid or that
contain merge markers are never modified.

Exit codes:
  0  all hooks passed
  1  a hook failed or modified files
  2  configuration or runtime error")]
pub struct Cli {
    /// Path to the configuration file
    #[arg(long, global = true, env = "HOOKGATE_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Run as if started in this directory
    #[arg(short = 'C', long = "repo", global = true, value_name = "DIR")]
    pub repo: Option<PathBuf>,

    /// Enable verbose output (shows DEBUG level logs)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Write logs to a file (useful for debugging)
    #[arg(long, global = true, env = "HOOKGATE_LOG_FILE", value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Run the hooks over staged files
    #[command(long_about = "Run the hooks over staged files

By default only files staged for the next commit are checked. Hooks read
the working-tree content of those files, so unstaged edits to a staged file
are checked too; a warning names such files. Fixers write their changes to
the working tree; re-stage the files and commit again.

Examples:
  • hookgate run
      → Check the staged files

  • hookgate run --all-files
      → Check every tracked file

  • hookgate run --files src/app.py setup.cfg
      → Check the given files only

  • hookgate run --hook check-json --show-diff-on-failure
      → Run one hook and print what fixers changed")]
    Run(cmd::run::RunCommand),

    /// Show the configured hooks
    List(cmd::list::ListCommand),

    /// Check that the configuration loads and every hook resolves
    ValidateConfig(cmd::validate_config::ValidateConfigCommand),

    /// Print a starter configuration
    SampleConfig,

    /// Install hookgate as the git pre-commit hook
    Install(InstallCommand),

    /// Remove the git pre-commit hook installed by hookgate
    Uninstall,
}

/// Main entry point for the CLI application
///
/// Returns the process exit code: [`EXIT_SUCCESS`] or [`EXIT_HOOKS_FAILED`].
/// Errors are mapped to [`EXIT_ERROR`] by the binary.
///
/// # Errors
///
/// Returns an error if logging cannot be initialized, the repository or
/// configuration cannot be loaded, or the command fails.
pub fn run(cli: Cli) -> Result<i32> {
    hookgate_config::logging::init(cli.verbose, cli.log_file.as_deref())
        .context("Failed to initialize logging")?;

    // Needs neither a repository nor a configuration
    if matches!(cli.command, Commands::SampleConfig) {
        cmd::sample_config::write_sample(&mut std::io::stdout().lock())?;
        return Ok(EXIT_SUCCESS);
    }

    let start = match &cli.repo {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().context("Failed to get current directory")?,
    };
    let repo_root = common::resolve_repo_root(&start)?;
    tracing::debug!(root = %repo_root.display(), "Resolved repository root");

    // Hook management only needs the repository
    match &cli.command {
        Commands::Install(install) => {
            report_install(&install.install(&repo_root)?);
            return Ok(EXIT_SUCCESS);
        }
        Commands::Uninstall => {
            report_uninstall(&cmd::install::uninstall(&repo_root)?);
            return Ok(EXIT_SUCCESS);
        }
        _ => {}
    }

    let config_path = common::config_path(&repo_root, cli.config.as_deref());
    let context = RuntimeContext::load(repo_root, config_path)?;

    execute_command(&cli.command, &context)
}

fn execute_command(command: &Commands, context: &RuntimeContext) -> Result<i32> {
    match command {
        Commands::Run(run_cmd) => {
            let report = run_cmd.execute(context)?;
            Ok(report.exit_code())
        }
        Commands::List(list_cmd) => {
            list_cmd.execute(context)?;
            Ok(EXIT_SUCCESS)
        }
        Commands::ValidateConfig(validate_cmd) => {
            validate_cmd.execute(context)?;
            Ok(EXIT_SUCCESS)
        }
        Commands::SampleConfig | Commands::Install(_) | Commands::Uninstall => {
            unreachable!("handled before the configuration is loaded")
        }
    }
}

fn report_install(outcome: &Installed) {
    match outcome {
        Installed::Created(hook) => {
            println!("{} pre-commit installed at {}", StatusIcon::Success, hook.display());
        }
        Installed::Updated(hook) => {
            println!("{} pre-commit updated at {}", StatusIcon::Success, hook.display());
        }
        Installed::Replaced { hook, legacy } => {
            println!("{} pre-commit installed at {}", StatusIcon::Success, hook.display());
            println!(
                "{} previous hook kept as {}",
                StatusIcon::Warning,
                legacy.display()
            );
        }
    }
}

fn report_uninstall(outcome: &Uninstalled) {
    match outcome {
        Uninstalled::Removed(hook) => {
            println!("{} {} uninstalled", StatusIcon::Success, hook.display());
        }
        Uninstalled::Restored(hook) => {
            println!(
                "{} {} uninstalled, previous hook restored",
                StatusIcon::Success,
                hook.display()
            );
        }
        Uninstalled::Missing => println!("{} No pre-commit hook installed", StatusIcon::Info),
        Uninstalled::Foreign(hook) => println!(
            "{} {} was not installed by hookgate, leaving it in place",
            StatusIcon::Warning,
            hook.display()
        ),
    }
}
