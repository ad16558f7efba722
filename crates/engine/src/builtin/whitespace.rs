//! `trailing-whitespace`

use super::{BuildContext, comma_list, parse_args, split_ending, split_lines};
use crate::fileset::FileRef;
use crate::hooks::{FixOutcome, Fixer};
use hookgate_core::Result;

const DEFAULT_CHARS: &[u8] = b" \t\x0b\x0c";

#[derive(clap::Parser, Debug)]
struct Args {
    /// Markdown extensions whose hard line breaks (two trailing spaces) are kept, `*` for all
    #[arg(long = "markdown-linebreak-ext")]
    markdown_linebreak_ext: Vec<String>,

    /// Characters to strip instead of all whitespace
    #[arg(long)]
    chars: Option<String>,
}

/// Strips whitespace at the end of every line, preserving line endings
#[derive(Debug)]
pub struct TrailingWhitespace {
    markdown_exts: Vec<String>,
    chars: Vec<u8>,
}

impl TrailingWhitespace {
    pub(crate) fn from_args(ctx: &BuildContext<'_>) -> Result<Self> {
        let args: Args = parse_args(ctx)?;

        let markdown_exts = args
            .markdown_linebreak_ext
            .iter()
            .flat_map(|v| comma_list(v))
            .map(|ext| ext.trim_start_matches('.').to_ascii_lowercase())
            .collect();

        let chars = args
            .chars
            .map_or_else(|| DEFAULT_CHARS.to_vec(), String::into_bytes);

        Ok(Self {
            markdown_exts,
            chars,
        })
    }

    fn is_markdown(&self, file: FileRef<'_>) -> bool {
        if self.markdown_exts.iter().any(|e| e == "*") {
            return true;
        }
        file.path
            .extension()
            .is_some_and(|ext| self.markdown_exts.contains(&ext))
    }

    fn strip<'a>(&self, mut body: &'a [u8]) -> &'a [u8] {
        while let Some((last, rest)) = body.split_last() {
            if !self.chars.contains(last) {
                break;
            }
            body = rest;
        }
        body
    }
}

impl Fixer for TrailingWhitespace {
    fn fix(&self, file: FileRef<'_>) -> Result<FixOutcome> {
        let markdown = self.is_markdown(file);
        let mut out = Vec::with_capacity(file.content.len());

        for line in split_lines(file.content) {
            let (body, ending) = split_ending(line);
            let blank = body.iter().all(u8::is_ascii_whitespace);

            if markdown && !blank && body.ends_with(b"  ") {
                out.extend_from_slice(self.strip(&body[..body.len() - 2]));
                out.extend_from_slice(b"  ");
            } else {
                out.extend_from_slice(self.strip(body));
            }
            out.extend_from_slice(ending);
        }

        if out == file.content {
            Ok(FixOutcome::Unchanged)
        } else {
            Ok(FixOutcome::Fixed(out))
        }
    }
}
