//! Run report rendering
//!
//! ```text
//! 1. trailing-whitespace: Fixed
//! 1.1. notes.md: Fixed
//! 2. check-json: Failed
//! 2.1. data.json:4: Expecting ',' delimiter
//!
//! A file is not syntactically valid. ...
//! ```

use super::Palette;
use hookgate_engine::{HookOutcome, HookResult, RunReport};
use owo_colors::{OwoColorize, Style};
use std::io::{self, Write};

/// Write the numbered report of `report`
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn render_report<W: Write>(writer: &mut W, report: &RunReport, palette: Palette) -> io::Result<()> {
    for (index, result) in report.results.iter().enumerate() {
        render_result(writer, index + 1, result, palette)?;
    }

    let modified = report.modified_files();
    if !modified.is_empty() {
        writeln!(writer)?;
        writeln!(
            writer,
            "{}",
            "Files were modified by hooks:".style(palette.style(Style::new().bold()))
        )?;
        for path in modified {
            writeln!(writer, "  {path}")?;
        }
    }

    let closing = if report.passed() {
        Style::new().green()
    } else {
        Style::new().red().bold()
    };
    writeln!(writer)?;
    writeln!(writer, "{}", report.resolution().style(palette.style(closing)))
}

fn render_result<W: Write>(
    writer: &mut W,
    number: usize,
    result: &HookResult,
    palette: Palette,
) -> io::Result<()> {
    let (label, style) = match result.outcome {
        HookOutcome::Pass => ("Passed", Style::new().green()),
        HookOutcome::Fixed => ("Fixed", Style::new().yellow()),
        HookOutcome::Fail => ("Failed", Style::new().red()),
    };

    write!(
        writer,
        "{number}. {}: {}",
        result.hook_id,
        label.style(palette.style(style))
    )?;
    if result.files_checked == 0 && result.outcome.is_pass() {
        write!(
            writer,
            " {}",
            "(no files to check)".style(palette.style(Style::new().dimmed()))
        )?;
    }
    writeln!(writer)?;

    for (index, finding) in result.findings.iter().enumerate() {
        writeln!(writer, "{number}.{}. {finding}", index + 1)?;
    }

    // Tool output only matters when the tool did not pass
    if !result.outcome.is_pass() {
        for line in result.output.lines() {
            writeln!(writer, "    {}", line.style(palette.style(Style::new().dimmed())))?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use hookgate_engine::{Finding, RelPath};

    fn rel(path: &str) -> RelPath {
        RelPath::from_slash(path).unwrap()
    }

    fn render(report: &RunReport) -> String {
        let mut out = Vec::new();
        render_report(&mut out, report, Palette::new(false)).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn result(id: &str, outcome: HookOutcome, findings: Vec<Finding>) -> HookResult {
        HookResult {
            outcome,
            findings,
            files_checked: 1,
            ..HookResult::skipped(id, id)
        }
    }

    #[test]
    fn test_passing_report() {
        let report = RunReport {
            results: vec![
                result("trailing-whitespace", HookOutcome::Pass, vec![]),
                HookResult::skipped("check-json", "check-json"),
            ],
        };

        assert_eq!(
            render(&report),
            "1. trailing-whitespace: Passed\n\
             2. check-json: Passed (no files to check)\n\
             \n\
             All hooks passed.\n"
        );
    }

    #[test]
    fn test_failures_are_numbered_and_nested() {
        let data = rel("data.json");
        let notes = rel("notes.md");
        let mut fixed = result(
            "trailing-whitespace",
            HookOutcome::Fixed,
            vec![Finding::warning(&notes, "Fixed")],
        );
        fixed.modified_files.insert(notes.clone());

        let report = RunReport {
            results: vec![
                fixed,
                result(
                    "check-json",
                    HookOutcome::Fail,
                    vec![Finding::syntax(&data, "Expecting value").at_line(4)],
                ),
            ],
        };

        let text = render(&report);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "1. trailing-whitespace: Fixed");
        assert_eq!(lines[1], "1.1. notes.md: Fixed");
        assert_eq!(lines[2], "2. check-json: Failed");
        assert_eq!(lines[3], "2.1. data.json:4: Expecting value");
        assert!(text.contains("Files were modified by hooks:\n  notes.md\n"));
        assert!(text.ends_with(&format!("{}\n", report.resolution())));
    }

    #[test]
    fn test_external_output_shown_on_failure_only() {
        let mut failed = result("black", HookOutcome::Fail, vec![]);
        failed.output = "would reformat a.py\n".to_string();
        let mut passed = result("isort", HookOutcome::Pass, vec![]);
        passed.output = "Skipped 1 files\n".to_string();

        let text = render(&RunReport {
            results: vec![failed, passed],
        });
        assert!(text.contains("    would reformat a.py\n"));
        assert!(!text.contains("Skipped 1 files"));
    }

    #[test]
    fn test_no_escape_codes_without_color() {
        let report = RunReport {
            results: vec![result("check-yaml", HookOutcome::Fail, vec![])],
        };
        assert!(!render(&report).contains('\u{1b}'));
    }
}
