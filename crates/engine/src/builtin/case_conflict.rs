//! `check-case-conflict`

use super::{BuildContext, parse_args};
use crate::fileset::FileRef;
use crate::hooks::{Finding, ValidationContext, Validator};
use hookgate_core::{RelPath, Result};
use std::collections::{BTreeMap, BTreeSet};

#[derive(clap::Parser, Debug)]
struct Args {}

/// Fails when two paths differ only by case
///
/// Such paths cannot coexist on case-insensitive filesystems. Directories
/// count too: `Docs/a.md` conflicts with `docs/b.md`.
#[derive(Debug)]
pub struct CaseConflict;

impl CaseConflict {
    pub(crate) fn from_args(ctx: &BuildContext<'_>) -> Result<Self> {
        let Args {} = parse_args(ctx)?;
        Ok(Self)
    }
}

/// The paths themselves plus every parent directory
fn with_parents<'a>(paths: impl IntoIterator<Item = &'a RelPath>) -> BTreeSet<RelPath> {
    let mut all = BTreeSet::new();
    for path in paths {
        let mut current = Some(path.clone());
        while let Some(p) = current {
            current = p.parent();
            if !all.insert(p) {
                break;
            }
        }
    }
    all
}

fn lower(path: &RelPath) -> String {
    path.to_slash().to_lowercase()
}

impl Validator for CaseConflict {
    fn validate(&self, files: &[FileRef<'_>], ctx: &ValidationContext<'_>) -> Result<Vec<Finding>> {
        let relevant = with_parents(files.iter().map(|f| f.path));
        let others: BTreeSet<String> = with_parents(ctx.known_paths)
            .difference(&relevant)
            .map(lower)
            .collect();

        // Lowercased name -> the relevant paths sharing it
        let mut groups: BTreeMap<String, Vec<&RelPath>> = BTreeMap::new();
        for path in &relevant {
            groups.entry(lower(path)).or_default().push(path);
        }

        // Every path of a colliding group, directories included
        let mut conflicting: BTreeMap<&RelPath, &str> = BTreeMap::new();
        for (name, paths) in &groups {
            if paths.len() > 1 || others.contains(name) {
                conflicting.extend(paths.iter().map(|p| (*p, name.as_str())));
            }
        }

        // Report on each file at or below a colliding path, so all of them are locked
        let mut findings = Vec::new();
        for file in files {
            let mut current = Some(file.path.clone());
            while let Some(path) = current {
                if let Some(name) = conflicting.get(&path) {
                    findings.push(Finding::conflict(
                        file.path,
                        format!("Case-insensitivity conflict found: {name}"),
                    ));
                }
                current = path.parent();
            }
        }
        Ok(findings)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::super::test_support::rel;
    use super::*;
    use std::path::Path;

    fn run(selected: &[&str], known: &[&str]) -> Vec<String> {
        findings(selected, known)
            .into_iter()
            .map(|f| f.message)
            .collect()
    }

    fn findings(selected: &[&str], known: &[&str]) -> Vec<Finding> {
        let paths: Vec<RelPath> = selected.iter().map(|p| rel(p)).collect();
        let files: Vec<FileRef<'_>> = paths
            .iter()
            .map(|path| FileRef {
                path,
                content: b"",
            })
            .collect();
        let known: BTreeSet<RelPath> = known.iter().map(|p| rel(p)).collect();
        let ctx = ValidationContext {
            root: Path::new("."),
            known_paths: &known,
        };
        CaseConflict.validate(&files, &ctx).unwrap()
    }

    fn paths(findings: &[Finding]) -> Vec<String> {
        findings
            .iter()
            .map(|f| f.path.as_ref().unwrap().to_slash())
            .collect()
    }

    #[test]
    fn test_conflict_within_selection() {
        let found = findings(&["src/README.md", "src/readme.md"], &[]);
        assert_eq!(paths(&found), vec!["src/README.md", "src/readme.md"]);
        assert!(
            found
                .iter()
                .all(|f| f.message == "Case-insensitivity conflict found: src/readme.md")
        );
    }

    #[test]
    fn test_conflict_with_tracked_file() {
        let messages = run(&["Setup.py"], &["setup.py", "other.py"]);
        assert_eq!(messages, vec!["Case-insensitivity conflict found: setup.py"]);
    }

    #[test]
    fn test_conflicting_directories() {
        let found = findings(&["Docs/new.md"], &["docs/index.md"]);
        assert_eq!(paths(&found), vec!["Docs/new.md"]);
        assert_eq!(found[0].message, "Case-insensitivity conflict found: docs");
    }

    #[test]
    fn test_every_file_below_a_colliding_directory_is_reported() {
        let found = findings(&["Docs/a.md", "Docs/b.md", "docs/c.md"], &[]);
        assert_eq!(paths(&found), vec!["Docs/a.md", "Docs/b.md", "docs/c.md"]);
    }

    #[test]
    fn test_same_path_tracked_is_not_a_conflict() {
        assert!(run(&["src/a.py"], &["src/a.py", "src/b.py"]).is_empty());
    }
}
