//! `check-ast`
//!
//! Python syntax can only be judged by Python itself, so the files are handed
//! to an interpreter in batches and the reported errors are parsed back.

use super::{BuildContext, parse_args};
use crate::fileset::FileRef;
use crate::hooks::{ExternalCommand, Finding, ValidationContext, Validator};
use hookgate_core::{Error, RelPath, Result};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Prints `name<TAB>line<TAB>message` for every file that fails to parse
const CHECK_SCRIPT: &str = r#"
import ast, sys
failed = False
for name in sys.argv[1:]:
    with open(name, "rb") as f:
        source = f.read()
    try:
        ast.parse(source, filename=name)
    except SyntaxError as e:
        failed = True
        print("%s\t%s\t%s" % (name, e.lineno or 1, str(e.msg).replace("\n", " ")))
    except ValueError as e:
        failed = True
        print("%s\t1\t%s" % (name, str(e).replace("\n", " ")))
sys.exit(1 if failed else 0)
"#;

#[derive(clap::Parser, Debug)]
struct Args {}

/// Fails on Python files that do not parse
#[derive(Debug)]
pub struct CheckAst {
    candidates: Vec<String>,
}

impl CheckAst {
    pub(crate) fn from_args(ctx: &BuildContext<'_>) -> Result<Self> {
        let Args {} = parse_args(ctx)?;

        let mut candidates = Vec::new();
        if let Some(version) = ctx.config.language_version("python") {
            // `3.8` is shorthand for `python3.8`
            if version.chars().all(|c| c.is_ascii_digit() || c == '.') {
                candidates.push(format!("python{version}"));
            } else {
                candidates.push(version.to_string());
            }
        }
        candidates.push("python3".to_string());
        candidates.push("python".to_string());

        Ok(Self { candidates })
    }

    /// First candidate interpreter found on `PATH`
    fn interpreter(&self) -> Result<PathBuf> {
        for candidate in &self.candidates {
            match which::which(candidate) {
                Ok(path) => {
                    tracing::debug!(interpreter = %path.display(), "Using Python interpreter");
                    return Ok(path);
                }
                Err(_) => tracing::debug!(candidate = %candidate, "Python interpreter not found"),
            }
        }
        Err(Error::HookExecution(format!(
            "No Python interpreter found (tried {})",
            self.candidates.join(", ")
        )))
    }
}

impl Validator for CheckAst {
    fn validate(&self, files: &[FileRef<'_>], ctx: &ValidationContext<'_>) -> Result<Vec<Finding>> {
        if files.is_empty() {
            return Ok(Vec::new());
        }

        let command = ExternalCommand::new(
            self.interpreter()?,
            vec!["-c".to_string(), CHECK_SCRIPT.to_string()],
            true,
        );
        let paths: Vec<RelPath> = files.iter().map(|f| f.path.clone()).collect();
        let run = command.run(ctx.root, &paths)?;

        let by_name: BTreeMap<String, &RelPath> =
            paths.iter().map(|p| (p.to_slash(), p)).collect();

        let findings: Vec<Finding> = run
            .output
            .lines()
            .filter_map(|line| {
                let mut parts = line.splitn(3, '\t');
                let path = by_name.get(parts.next()?)?;
                let lineno = parts.next()?.parse().ok()?;
                let message = parts.next()?;
                Some(Finding::syntax(path, message).at_line(lineno))
            })
            .collect();

        if !run.success && findings.is_empty() {
            return Err(Error::HookExecution(format!(
                "Python interpreter failed: {}",
                run.output.trim()
            )));
        }
        Ok(findings)
    }
}
