//! `check-merge-conflict`

use super::{BuildContext, parse_args, split_ending, split_lines};
use crate::fileset::FileRef;
use crate::hooks::{Finding, ValidationContext, Validator};
use hookgate_core::Result;

const OPEN: &[u8] = b"<<<<<<< ";
const CLOSE: &[u8] = b">>>>>>> ";
const SEPARATOR: &[u8] = b"=======";

#[derive(clap::Parser, Debug)]
struct Args {
    /// Accepted for compatibility; markers are always checked
    #[arg(long)]
    assume_in_merge: bool,
}

/// Fails on files containing unresolved merge conflict markers
///
/// A bare `=======` line is common in reStructuredText and Markdown, so it only
/// counts when the file also carries an opening or closing marker.
#[derive(Debug)]
pub struct MergeConflict;

impl MergeConflict {
    pub(crate) fn from_args(ctx: &BuildContext<'_>) -> Result<Self> {
        let Args { assume_in_merge: _ } = parse_args(ctx)?;
        Ok(Self)
    }

    fn check(file: FileRef<'_>, findings: &mut Vec<Finding>) {
        let mut markers = Vec::new();
        let mut separators = Vec::new();

        for (i, line) in split_lines(file.content).into_iter().enumerate() {
            let (body, _) = split_ending(line);
            if body.starts_with(OPEN) || body == OPEN.trim_ascii_end() {
                markers.push((i + 1, "<<<<<<<"));
            } else if body.starts_with(CLOSE) || body == CLOSE.trim_ascii_end() {
                markers.push((i + 1, ">>>>>>>"));
            } else if body == SEPARATOR || body.starts_with(b"======= ") {
                separators.push((i + 1, "======="));
            }
        }

        if markers.is_empty() {
            return;
        }

        markers.extend(separators);
        markers.sort_unstable();
        findings.extend(markers.into_iter().map(|(line, marker)| {
            Finding::conflict(file.path, format!("Merge conflict string '{marker}' found"))
                .at_line(line)
        }));
    }
}

impl Validator for MergeConflict {
    fn validate(&self, files: &[FileRef<'_>], _: &ValidationContext<'_>) -> Result<Vec<Finding>> {
        let mut findings = Vec::new();
        for file in files {
            Self::check(*file, &mut findings);
        }
        Ok(findings)
    }
}
