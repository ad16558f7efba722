//! `check-toml` and `check-yaml`

use super::{BuildContext, parse_args};
use crate::fileset::FileRef;
use crate::hooks::{Finding, ValidationContext, Validator};
use hookgate_core::Result;
use serde::Deserialize;

/// Decode content as UTF-8 or report it
fn utf8(file: FileRef<'_>) -> std::result::Result<&str, Finding> {
    std::str::from_utf8(file.content).map_err(|e| {
        let line = file.content[..e.valid_up_to()]
            .iter()
            .filter(|&&b| b == b'\n')
            .count()
            + 1;
        Finding::syntax(file.path, "File is not valid UTF-8").at_line(line)
    })
}

/// 1-based line containing byte `offset`
fn line_of(text: &str, offset: usize) -> usize {
    text.as_bytes()[..offset.min(text.len())]
        .iter()
        .filter(|&&b| b == b'\n')
        .count()
        + 1
}

#[derive(clap::Parser, Debug)]
struct TomlArgs {}

/// Fails on files that are not valid TOML
#[derive(Debug)]
pub struct CheckToml;

impl CheckToml {
    pub(crate) fn from_args(ctx: &BuildContext<'_>) -> Result<Self> {
        let TomlArgs {} = parse_args(ctx)?;
        Ok(Self)
    }

    fn check(file: FileRef<'_>) -> Option<Finding> {
        let text = match utf8(file) {
            Ok(text) => text,
            Err(finding) => return Some(finding),
        };

        let err = toml::from_str::<toml::Table>(text).err()?;
        let message = err.message().trim().to_string();
        let finding = Finding::syntax(file.path, message);
        Some(match err.span() {
            Some(span) => finding.at_line(line_of(text, span.start)),
            None => finding,
        })
    }
}

impl Validator for CheckToml {
    fn validate(&self, files: &[FileRef<'_>], _: &ValidationContext<'_>) -> Result<Vec<Finding>> {
        Ok(files.iter().filter_map(|f| Self::check(*f)).collect())
    }
}

#[derive(clap::Parser, Debug)]
struct YamlArgs {
    /// Accept streams with several `---` documents
    #[arg(short = 'm', long = "allow-multiple-documents", visible_alias = "multi")]
    allow_multiple_documents: bool,

    /// Only check syntax (tags are never constructed, accepted for compatibility)
    #[arg(long = "unsafe")]
    unsafe_: bool,
}

/// Fails on files that are not valid YAML
#[derive(Debug)]
pub struct CheckYaml {
    allow_multiple_documents: bool,
}

impl CheckYaml {
    pub(crate) fn from_args(ctx: &BuildContext<'_>) -> Result<Self> {
        let args: YamlArgs = parse_args(ctx)?;
        if args.unsafe_ {
            tracing::debug!(hook = ctx.hook_id, "--unsafe has no effect, only syntax is checked");
        }
        Ok(Self {
            allow_multiple_documents: args.allow_multiple_documents,
        })
    }

    fn check(&self, file: FileRef<'_>) -> Option<Finding> {
        let mut documents = 0usize;

        for document in serde_yaml::Deserializer::from_slice(file.content) {
            if let Err(e) = serde_yaml::Value::deserialize(document) {
                let finding = Finding::syntax(file.path, e.to_string());
                return Some(match e.location() {
                    Some(location) => finding.at_line(location.line()),
                    None => finding,
                });
            }
            documents += 1;
        }

        if documents > 1 && !self.allow_multiple_documents {
            return Some(Finding::syntax(
                file.path,
                "expected a single document in the stream (use --allow-multiple-documents)",
            ));
        }
        None
    }
}

impl Validator for CheckYaml {
    fn validate(&self, files: &[FileRef<'_>], _: &ValidationContext<'_>) -> Result<Vec<Finding>> {
        Ok(files.iter().filter_map(|f| self.check(*f)).collect())
    }
}
