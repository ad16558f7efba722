//! Errors shared by the hookgate crates

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading configuration, resolving hooks, or touching the working tree
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error reading a file of the working tree
    #[error("Failed to read file {}: {source}", path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error writing a file of the working tree
    #[error("Failed to write file {}: {source}", path.display())]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Path is not absolute
    #[error("Path must be absolute: {}", path.display())]
    PathNotAbsolute { path: PathBuf },

    /// Path is not relative
    #[error("Path must be relative: {}", path.display())]
    PathNotRelative { path: PathBuf },

    /// Path does not live below the repository root
    #[error("{} is outside {}", path.display(), root.display())]
    OutsideRoot { path: PathBuf, root: PathBuf },

    /// Configuration file could not be parsed
    #[error("Failed to parse {}: {message}", path.display())]
    ConfigParse { path: PathBuf, message: String },

    /// Configuration is well-formed but invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// A declared hook could not be mapped to a handler
    #[error("Cannot resolve hook '{hook_id}' from {repo}: {reason}")]
    HookResolution {
        hook_id: String,
        repo: String,
        reason: String,
    },

    /// A hook was declared with arguments it does not accept
    #[error("Invalid arguments for hook '{hook_id}': {message}")]
    HookArgs { hook_id: String, message: String },

    /// Hook execution error
    #[error("Hook execution error: {0}")]
    HookExecution(String),

    /// Git repository error
    #[error("Git error: {0}")]
    Git(String),

    /// Generic error message
    #[error("{0}")]
    Message(String),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;

    #[test]
    fn test_hook_resolution_message() {
        let err = Error::HookResolution {
            hook_id: "black".to_string(),
            repo: "https://github.com/psf/black@22.3.0".to_string(),
            reason: "'black' not found on PATH".to_string(),
        };

        let msg = err.to_string();
        assert!(msg.contains("'black'"));
        assert!(msg.contains("psf/black@22.3.0"));
        assert!(msg.contains("not found on PATH"));
    }

    #[test]
    fn test_file_write_keeps_source() {
        use std::error::Error as _;

        let err = Error::FileWrite {
            path: PathBuf::from("src/lib.rs"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
        };

        assert!(err.to_string().contains("src/lib.rs"));
        assert!(err.source().is_some());
    }
}
