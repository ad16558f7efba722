//! `end-of-file-fixer`

use super::{BuildContext, parse_args};
use crate::fileset::FileRef;
use crate::hooks::{FixOutcome, Fixer};
use hookgate_core::Result;

#[derive(clap::Parser, Debug)]
struct Args {}

/// Makes every non-empty file end with exactly one line ending
///
/// Extra blank lines at the end are removed, keeping the line ending that
/// terminates the last line of content. A missing ending is added using the
/// first line ending found in the file (LF if there is none). A file made of
/// line endings only becomes empty.
#[derive(Debug)]
pub struct EndOfFileFixer;

impl EndOfFileFixer {
    pub(crate) fn from_args(ctx: &BuildContext<'_>) -> Result<Self> {
        let Args {} = parse_args(ctx)?;
        Ok(Self)
    }
}

fn is_eol(b: u8) -> bool {
    b == b'\n' || b == b'\r'
}

fn first_ending(content: &[u8]) -> &'static [u8] {
    match content.iter().position(|&b| is_eol(b)) {
        Some(i) if content[i] == b'\r' && content.get(i + 1) == Some(&b'\n') => b"\r\n",
        Some(i) if content[i] == b'\r' => b"\r",
        _ => b"\n",
    }
}

impl Fixer for EndOfFileFixer {
    fn fix(&self, file: FileRef<'_>) -> Result<FixOutcome> {
        let content = file.content;
        if content.is_empty() {
            return Ok(FixOutcome::Unchanged);
        }

        let body_len = content
            .iter()
            .rposition(|&b| !is_eol(b))
            .map_or(0, |i| i + 1);

        if body_len == 0 {
            return Ok(FixOutcome::Fixed(Vec::new()));
        }

        let (body, tail) = content.split_at(body_len);
        let ending: &[u8] = if tail.starts_with(b"\r\n") {
            b"\r\n"
        } else if let Some(&b) = tail.first() {
            if b == b'\r' { b"\r" } else { b"\n" }
        } else {
            first_ending(body)
        };

        if tail == ending {
            return Ok(FixOutcome::Unchanged);
        }

        let mut out = Vec::with_capacity(body.len() + ending.len());
        out.extend_from_slice(body);
        out.extend_from_slice(ending);
        Ok(FixOutcome::Fixed(out))
    }
}
