//! Terminal output for hookgate
//!
//! - Run report (numbered hook results, findings, resolution)
//! - Unified diffs of files changed by fixers
//! - Status icons

pub mod diff;
pub mod icons;
pub mod report;

pub use diff::render_changes;
pub use icons::StatusIcon;
pub use report::render_report;

use owo_colors::Style;

/// Decides whether output is colored
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    color: bool,
}

impl Palette {
    #[must_use]
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    /// Color when writing to a terminal
    #[must_use]
    pub fn for_stdout() -> Self {
        use std::io::IsTerminal;
        Self::new(std::io::stdout().is_terminal())
    }

    /// `style` when color is enabled, a plain style otherwise
    #[must_use]
    pub fn style(self, style: Style) -> Style {
        if self.color { style } else { Style::new() }
    }
}
