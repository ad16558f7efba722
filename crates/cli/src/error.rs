//! Error types for CLI commands
//!
//! Library errors arrive as `hookgate_core::Error`; this module adds the
//! failures that only make sense at the command line.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during command execution
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum CommandError {
    /// `--hook` named a hook that is not declared
    #[error("No hook with id '{0}' in the configuration")]
    UnknownHook(String),

    /// A `--files` argument outside the repository
    #[error("Path {} is not inside the repository {}", path.display(), root.display())]
    PathOutsideRepository {
        /// The offending path
        path: PathBuf,
        /// Repository root
        root: PathBuf,
    },

    /// A pre-commit hook not written by hookgate is in the way
    #[error(
        "A pre-commit hook not managed by hookgate already exists at {}. Use --overwrite to replace it",
        .0.display()
    )]
    ForeignHook(PathBuf),

    /// Library error
    #[error(transparent)]
    Core(#[from] hookgate_core::Error),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Generic error with context
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for command operations
pub type Result<T> = std::result::Result<T, CommandError>;

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use std::io;

    #[test]
    fn test_unknown_hook_error() {
        let error = CommandError::UnknownHook("black".to_string());
        assert_eq!(
            error.to_string(),
            "No hook with id 'black' in the configuration"
        );
    }

    #[test]
    fn test_path_outside_repository_error() {
        let error = CommandError::PathOutsideRepository {
            path: PathBuf::from("/tmp/elsewhere.txt"),
            root: PathBuf::from("/work/repo"),
        };

        let error_msg = error.to_string();
        assert!(error_msg.contains("/tmp/elsewhere.txt"));
        assert!(error_msg.contains("/work/repo"));
    }

    #[test]
    fn test_foreign_hook_error_mentions_overwrite() {
        let error = CommandError::ForeignHook(PathBuf::from(".git/hooks/pre-commit"));
        assert!(error.to_string().contains("--overwrite"));
    }

    #[test]
    fn test_core_error_is_transparent() {
        let core = hookgate_core::Error::Config("bad".to_string());
        let error: CommandError = core.into();
        assert_eq!(error.to_string(), "Configuration error: bad");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let error: CommandError = io_error.into();
        assert!(error.to_string().contains("IO error"));
    }

    #[test]
    fn test_anyhow_error_conversion() {
        let error: CommandError = anyhow::anyhow!("something went wrong").into();
        assert!(error.to_string().contains("something went wrong"));
    }
}
