//! Bundled hooks
//!
//! The hooks of the pre-commit-hooks repository that hookgate implements
//! natively. Each entry names its capability, the file types it applies to
//! when a declaration gives none, and a constructor that parses the hook's
//! arguments.

mod case_conflict;
mod end_of_file;
mod json;
mod line_ending;
mod merge_conflict;
mod python_ast;
mod syntax;
mod whitespace;

pub use case_conflict::CaseConflict;
pub use end_of_file::EndOfFileFixer;
pub use json::{CheckJson, PrettyFormatJson};
pub use line_ending::{LineEndingFix, MixedLineEnding};
pub use merge_conflict::MergeConflict;
pub use python_ast::CheckAst;
pub use syntax::{CheckToml, CheckYaml};
pub use whitespace::TrailingWhitespace;

use crate::hooks::{Capability, Handler};
use hookgate_config::PipelineConfig;
use hookgate_core::{Error, Result};

/// Everything a constructor may need to build a handler
pub struct BuildContext<'a> {
    /// Hook id, used in error messages
    pub hook_id: &'a str,
    /// Declared arguments
    pub args: &'a [String],
    /// The loaded configuration (for `default_language_version`)
    pub config: &'a PipelineConfig,
}

/// A bundled hook
pub struct BuiltinSpec {
    pub id: &'static str,
    pub capability: Capability,
    /// Types applied when the declaration has none
    pub default_types: &'static [&'static str],
    pub build: fn(&BuildContext<'_>) -> Result<Handler>,
}

/// All bundled hooks
pub const BUILTINS: &[BuiltinSpec] = &[
    BuiltinSpec {
        id: "trailing-whitespace",
        capability: Capability::Fixer,
        default_types: &["text"],
        build: |ctx| Ok(Handler::Fixer(Box::new(TrailingWhitespace::from_args(ctx)?))),
    },
    BuiltinSpec {
        id: "end-of-file-fixer",
        capability: Capability::Fixer,
        default_types: &["text"],
        build: |ctx| Ok(Handler::Fixer(Box::new(EndOfFileFixer::from_args(ctx)?))),
    },
    BuiltinSpec {
        id: "mixed-line-ending",
        capability: Capability::Fixer,
        default_types: &["text"],
        build: |ctx| Ok(Handler::Fixer(Box::new(MixedLineEnding::from_args(ctx)?))),
    },
    BuiltinSpec {
        id: "pretty-format-json",
        capability: Capability::Fixer,
        default_types: &["json"],
        build: |ctx| Ok(Handler::Fixer(Box::new(PrettyFormatJson::from_args(ctx)?))),
    },
    BuiltinSpec {
        id: "check-json",
        capability: Capability::Validator,
        default_types: &["json"],
        build: |ctx| Ok(Handler::Validator(Box::new(CheckJson::from_args(ctx)?))),
    },
    BuiltinSpec {
        id: "check-toml",
        capability: Capability::Validator,
        default_types: &["toml"],
        build: |ctx| Ok(Handler::Validator(Box::new(CheckToml::from_args(ctx)?))),
    },
    BuiltinSpec {
        id: "check-yaml",
        capability: Capability::Validator,
        default_types: &["yaml"],
        build: |ctx| Ok(Handler::Validator(Box::new(CheckYaml::from_args(ctx)?))),
    },
    BuiltinSpec {
        id: "check-ast",
        capability: Capability::Validator,
        default_types: &["python"],
        build: |ctx| Ok(Handler::Validator(Box::new(CheckAst::from_args(ctx)?))),
    },
    BuiltinSpec {
        id: "check-merge-conflict",
        capability: Capability::Validator,
        default_types: &["text"],
        build: |ctx| Ok(Handler::Validator(Box::new(MergeConflict::from_args(ctx)?))),
    },
    BuiltinSpec {
        id: "check-case-conflict",
        capability: Capability::Validator,
        default_types: &[],
        build: |ctx| Ok(Handler::Validator(Box::new(CaseConflict::from_args(ctx)?))),
    },
];

/// Parse hook arguments with a clap parser
///
/// Unknown or malformed arguments become [`Error::HookArgs`].
pub(crate) fn parse_args<T: clap::Parser>(ctx: &BuildContext<'_>) -> Result<T> {
    let argv = std::iter::once(ctx.hook_id).chain(ctx.args.iter().map(String::as_str));
    T::try_parse_from(argv).map_err(|e| Error::HookArgs {
        hook_id: ctx.hook_id.to_string(),
        message: e
            .to_string()
            .lines()
            .next()
            .unwrap_or_default()
            .trim_start_matches("error: ")
            .to_string(),
    })
}

/// Split a comma separated argument value, dropping empty items
pub(crate) fn comma_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Split content into lines, each keeping its terminator (`\n`, `\r\n` or `\r`)
pub(crate) fn split_lines(content: &[u8]) -> Vec<&[u8]> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < content.len() {
        match content[i] {
            b'\n' => {
                lines.push(&content[start..=i]);
                start = i + 1;
            }
            b'\r' => {
                let end = if content.get(i + 1) == Some(&b'\n') {
                    i + 1
                } else {
                    i
                };
                lines.push(&content[start..=end]);
                i = end;
                start = end + 1;
            }
            _ => {}
        }
        i += 1;
    }

    if start < content.len() {
        lines.push(&content[start..]);
    }
    lines
}

/// Split one line into its body and its terminator
pub(crate) fn split_ending(line: &[u8]) -> (&[u8], &[u8]) {
    if line.ends_with(b"\r\n") {
        line.split_at(line.len() - 2)
    } else if line.ends_with(b"\n") || line.ends_with(b"\r") {
        line.split_at(line.len() - 1)
    } else {
        (line, &[])
    }
}
