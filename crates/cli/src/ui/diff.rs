//! Unified diffs of the files hooks modified (`--show-diff-on-failure`)

use super::Palette;
use hookgate_engine::{FileSet, RelPath};
use owo_colors::{OwoColorize, Style};
use similar::{ChangeTag, TextDiff};
use std::io::{self, Write};

const CONTEXT_LINES: usize = 3;

/// Write a diff for every file whose content changed during the run
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn render_changes<W: Write>(writer: &mut W, files: &FileSet, palette: Palette) -> io::Result<()> {
    let mut any = false;
    for (path, original, current) in files.changed() {
        if !any {
            writeln!(writer)?;
            writeln!(
                writer,
                "{}",
                "All changes made by hooks:".style(palette.style(Style::new().bold()))
            )?;
            any = true;
        }
        render_file(writer, path, original, current, palette)?;
    }
    Ok(())
}

fn render_file<W: Write>(
    writer: &mut W,
    path: &RelPath,
    original: &[u8],
    current: &[u8],
    palette: Palette,
) -> io::Result<()> {
    let header = palette.style(Style::new().bold());
    writeln!(writer, "{}", format!("diff a/{path} b/{path}").style(header))?;

    let (Ok(old), Ok(new)) = (std::str::from_utf8(original), std::str::from_utf8(current)) else {
        return writeln!(writer, "Binary file {path} changed");
    };

    writeln!(writer, "{}", format!("--- a/{path}").style(header))?;
    writeln!(writer, "{}", format!("+++ b/{path}").style(header))?;

    let diff = TextDiff::from_lines(old, new);
    for group in diff.grouped_ops(CONTEXT_LINES) {
        if let Some(first) = group.first()
            && let Some(last) = group.last()
        {
            let old_start = first.old_range().start + 1;
            let old_len = last.old_range().end - first.old_range().start;
            let new_start = first.new_range().start + 1;
            let new_len = last.new_range().end - first.new_range().start;
            writeln!(
                writer,
                "{}",
                format!("@@ -{old_start},{old_len} +{new_start},{new_len} @@")
                    .style(palette.style(Style::new().cyan()))
            )?;
        }

        for op in &group {
            for change in diff.iter_changes(op) {
                let (sign, style) = match change.tag() {
                    ChangeTag::Delete => ('-', Style::new().red()),
                    ChangeTag::Insert => ('+', Style::new().green()),
                    ChangeTag::Equal => (' ', Style::new()),
                };
                // Line terminators are shown escaped so CRLF fixes stay visible
                let value = change.value();
                let line = value.trim_end_matches(['\n', '\r']);
                let ending = &value[line.len()..];
                let shown = if ending.starts_with('\r') {
                    format!("{sign}{line}\\r")
                } else {
                    format!("{sign}{line}")
                };
                writeln!(writer, "{}", shown.style(palette.style(style)))?;
                if ending.is_empty() {
                    writeln!(writer, "\\ No newline at end of file")?;
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use tempfile::TempDir;

    fn render(files: &FileSet) -> String {
        let mut out = Vec::new();
        render_changes(&mut out, files, Palette::new(false)).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn file_set(temp: &TempDir, path: &str, content: &[u8]) -> (FileSet, RelPath) {
        std::fs::write(temp.path().join(path), content).unwrap();
        let rel = RelPath::from_slash(path).unwrap();
        let files = FileSet::load(temp.path(), vec![rel.clone()]).unwrap();
        (files, rel)
    }

    #[test]
    fn test_unchanged_files_print_nothing() {
        let temp = TempDir::new().unwrap();
        let (files, _) = file_set(&temp, "a.txt", b"same\n");
        assert_eq!(render(&files), "");
    }

    #[test]
    fn test_added_newline_diff() {
        let temp = TempDir::new().unwrap();
        let (mut files, rel) = file_set(&temp, "a.txt", b"one\ntwo");
        files.replace(&rel, b"one\ntwo\n".to_vec()).unwrap();

        let text = render(&files);
        assert!(text.contains("--- a/a.txt\n+++ b/a.txt\n"));
        assert!(text.contains("@@ -1,2 +1,2 @@\n one\n-two\n\\ No newline at end of file\n+two\n"));
    }

    #[test]
    fn test_crlf_is_visible() {
        let temp = TempDir::new().unwrap();
        let (mut files, rel) = file_set(&temp, "a.txt", b"one\r\n");
        files.replace(&rel, b"one\n".to_vec()).unwrap();

        let text = render(&files);
        assert!(text.contains("-one\\r\n+one\n"));
    }

    #[test]
    fn test_binary_change() {
        let temp = TempDir::new().unwrap();
        let (mut files, rel) = file_set(&temp, "blob.bin", &[0xff, 0x00, 0x01]);
        files.replace(&rel, vec![0xff, 0x00]).unwrap();

        assert!(render(&files).contains("Binary file blob.bin changed"));
    }
}
