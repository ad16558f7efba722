//! Install and uninstall the git pre-commit hook
//!
//! The installed script calls back into `hookgate run`. Scripts written by
//! hookgate carry a marker line; anything without it belongs to someone else
//! and is only replaced with `--overwrite`, after being kept as
//! `pre-commit.legacy`.

use anyhow::Context;
use clap::Args;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{CommandError, Result};

/// Marker identifying scripts written by hookgate
pub const HOOK_MARKER: &str = "# File generated by hookgate install";

const HOOK_NAME: &str = "pre-commit";
const LEGACY_SUFFIX: &str = ".legacy";

/// Install the pre-commit hook
#[derive(Debug, Default, Args)]
pub struct InstallCommand {
    /// Replace an existing hook not written by hookgate (it is kept as pre-commit.legacy)
    #[arg(long)]
    pub overwrite: bool,
}

/// What `install` did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Installed {
    /// New script written
    Created(PathBuf),
    /// Previous hookgate script refreshed
    Updated(PathBuf),
    /// Foreign script moved aside to the given path
    Replaced { hook: PathBuf, legacy: PathBuf },
}

/// What `uninstall` did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Uninstalled {
    Removed(PathBuf),
    /// Removed, and the previously replaced hook put back
    Restored(PathBuf),
    /// No hook installed
    Missing,
    /// The hook is not ours and was left alone
    Foreign(PathBuf),
}

impl InstallCommand {
    /// Write the hook script into the hooks directory of the repository at `root`
    ///
    /// # Errors
    ///
    /// Returns an error if `root` is not a git repository, a foreign hook
    /// exists and `overwrite` is off, or the script cannot be written.
    pub fn install(&self, root: &Path) -> Result<Installed> {
        let hooks_dir = hookgate_engine::git::hooks_dir(root)?;
        fs::create_dir_all(&hooks_dir)
            .with_context(|| format!("Failed to create {}", hooks_dir.display()))?;

        let hook = hooks_dir.join(HOOK_NAME);
        let existing = read_existing(&hook)?;

        let outcome = match existing {
            None => Installed::Created(hook.clone()),
            Some(content) if content.contains(HOOK_MARKER) => Installed::Updated(hook.clone()),
            Some(_) if self.overwrite => {
                let legacy = legacy_path(&hook);
                fs::rename(&hook, &legacy)
                    .with_context(|| format!("Failed to move {} aside", hook.display()))?;
                Installed::Replaced {
                    hook: hook.clone(),
                    legacy,
                }
            }
            Some(_) => return Err(CommandError::ForeignHook(hook)),
        };

        write_script(&hook, &hook_script())?;
        info!(path = %hook.display(), "Installed pre-commit hook");
        Ok(outcome)
    }
}

/// Remove the hook script written by `install`
///
/// # Errors
///
/// Returns an error if `root` is not a git repository or the files cannot be
/// removed or restored.
pub fn uninstall(root: &Path) -> Result<Uninstalled> {
    let hook = hookgate_engine::git::hooks_dir(root)?.join(HOOK_NAME);

    match read_existing(&hook)? {
        None => Ok(Uninstalled::Missing),
        Some(content) if !content.contains(HOOK_MARKER) => Ok(Uninstalled::Foreign(hook)),
        Some(_) => {
            fs::remove_file(&hook)
                .with_context(|| format!("Failed to remove {}", hook.display()))?;
            info!(path = %hook.display(), "Removed pre-commit hook");

            let legacy = legacy_path(&hook);
            if legacy.exists() {
                fs::rename(&legacy, &hook)
                    .with_context(|| format!("Failed to restore {}", legacy.display()))?;
                return Ok(Uninstalled::Restored(hook));
            }
            Ok(Uninstalled::Removed(hook))
        }
    }
}

/// The script body: prefer the binary that installed it, fall back to `PATH`
fn hook_script() -> String {
    let exe = std::env::current_exe()
        .map(|p| p.display().to_string())
        .unwrap_or_default();

    format!(
        "#!/usr/bin/env sh\n\
         {HOOK_MARKER}\n\
         HOOKGATE={}\n\
         if [ ! -x \"$HOOKGATE\" ]; then\n    HOOKGATE=hookgate\nfi\n\
         exec \"$HOOKGATE\" run \"$@\"\n",
        sh_quote(&exe)
    )
}

/// Quote for POSIX sh
fn sh_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

fn legacy_path(hook: &Path) -> PathBuf {
    let mut name = hook.as_os_str().to_os_string();
    name.push(LEGACY_SUFFIX);
    PathBuf::from(name)
}

/// Content of an existing hook, `None` when there is none
///
/// Binary hooks are read lossily; they never contain the marker.
fn read_existing(hook: &Path) -> Result<Option<String>> {
    match fs::read(hook) {
        Ok(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(anyhow::Error::new(e)
            .context(format!("Failed to read {}", hook.display()))
            .into()),
    }
}

fn write_script(hook: &Path, script: &str) -> Result<()> {
    fs::write(hook, script).with_context(|| format!("Failed to write {}", hook.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perm = fs::metadata(hook)?.permissions();
        perm.set_mode(0o755);
        fs::set_permissions(hook, perm)?;
    }

    Ok(())
}
