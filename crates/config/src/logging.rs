//! Diagnostic logging
//!
//! Hook reports go to stdout; tracing events go to stderr so the two never
//! interleave in a pipe. `RUST_LOG` overrides the level chosen here.

use crate::Result;
use std::fs::{File, OpenOptions};
use std::path::Path;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const CRATES: [&str; 3] = ["hookgate", "hookgate_config", "hookgate_engine"];

/// Install the global subscriber
///
/// `verbose` lowers the terminal threshold from `warn` to `debug` and adds
/// timestamps. With `log_file`, every event at `debug` or above is also
/// appended there, with source locations.
///
/// # Errors
///
/// Returns an error if `RUST_LOG` holds an invalid filter or the log file
/// cannot be opened.
pub fn init(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_directives(verbose))
            .map_err(|e| hookgate_core::Error::Message(format!("Invalid log filter: {e}")))?,
    };

    let terminal = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact();
    let terminal = if verbose {
        terminal.with_filter(filter).boxed()
    } else {
        terminal.without_time().with_filter(filter).boxed()
    };

    let file = log_file.map(open_log).transpose()?.map(|file| {
        fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_file(true)
            .with_line_number(true)
            .with_filter(EnvFilter::new("debug"))
    });

    tracing_subscriber::registry()
        .with(terminal)
        .with(file)
        .init();
    Ok(())
}

fn open_log(path: &Path) -> Result<File> {
    Ok(OpenOptions::new().create(true).append(true).open(path)?)
}

/// `crate=level` for each hookgate crate
fn default_directives(verbose: bool) -> String {
    let level = if verbose { "debug" } else { "warn" };
    CRATES
        .iter()
        .map(|krate| format!("{krate}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives() {
        assert_eq!(
            default_directives(false),
            "hookgate=warn,hookgate_config=warn,hookgate_engine=warn"
        );
        assert!(default_directives(true).split(',').all(|d| d.ends_with("=debug")));
    }

    #[test]
    fn test_default_directives_parse() {
        assert!(EnvFilter::try_new(default_directives(true)).is_ok());
    }
}
