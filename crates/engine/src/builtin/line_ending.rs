//! `mixed-line-ending`

use super::{BuildContext, parse_args, split_ending, split_lines};
use crate::fileset::FileRef;
use crate::hooks::{Finding, FixOutcome, Fixer};
use hookgate_core::Result;

/// Target line ending
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEndingFix {
    /// Convert mixed files to their most common ending
    #[default]
    Auto,
    Lf,
    Crlf,
    /// Report mixed files without touching them
    No,
}

#[derive(clap::Parser, Debug)]
struct Args {
    #[arg(short, long, value_enum, default_value_t = LineEndingFix::Auto)]
    fix: LineEndingFix,
}

/// Index of each ending in the count array, in tie-break preference order
const LF: usize = 0;
const CRLF: usize = 1;
const CR: usize = 2;
const ENDINGS: [&[u8]; 3] = [b"\n", b"\r\n", b"\r"];

/// Detects and normalizes mixed line endings
#[derive(Debug)]
pub struct MixedLineEnding {
    fix: LineEndingFix,
}

impl MixedLineEnding {
    pub(crate) fn from_args(ctx: &BuildContext<'_>) -> Result<Self> {
        let args: Args = parse_args(ctx)?;
        Ok(Self { fix: args.fix })
    }

    fn rewrite(content: &[u8], target: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(content.len());
        for line in split_lines(content) {
            let (body, ending) = split_ending(line);
            out.extend_from_slice(body);
            if !ending.is_empty() {
                out.extend_from_slice(target);
            }
        }
        out
    }
}

fn ending_index(ending: &[u8]) -> Option<usize> {
    ENDINGS.iter().position(|e| *e == ending)
}

impl Fixer for MixedLineEnding {
    fn fix(&self, file: FileRef<'_>) -> Result<FixOutcome> {
        let mut counts = [0usize; 3];
        for line in split_lines(file.content) {
            if let Some(i) = ending_index(split_ending(line).1) {
                counts[i] += 1;
            }
        }
        let mixed = counts.iter().filter(|&&c| c > 0).count() > 1;

        let target: &[u8] = match self.fix {
            LineEndingFix::No => {
                return Ok(if mixed {
                    FixOutcome::Rejected(Finding::warning(file.path, "Mixed line endings"))
                } else {
                    FixOutcome::Unchanged
                });
            }
            LineEndingFix::Auto if !mixed => return Ok(FixOutcome::Unchanged),
            LineEndingFix::Auto => {
                // First maximum wins, so ties prefer LF, then CRLF
                let mut best = LF;
                for i in [CRLF, CR] {
                    if counts[i] > counts[best] {
                        best = i;
                    }
                }
                ENDINGS[best]
            }
            LineEndingFix::Lf => ENDINGS[LF],
            LineEndingFix::Crlf => ENDINGS[CRLF],
        };

        let out = Self::rewrite(file.content, target);
        if out == file.content {
            Ok(FixOutcome::Unchanged)
        } else {
            Ok(FixOutcome::Fixed(out))
        }
    }
}
