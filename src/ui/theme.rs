//! Visual theme and styling.

use console::Style;

/// Tag that prefixes every diagnostic line.
pub const DIAGNOSTIC_TAG: &str = "[PyPkg Dependency Checker]";

/// Diagnostic styling.
#[derive(Debug, Clone)]
pub struct CheckerTheme {
    /// Style for failure diagnostics (red).
    pub error: Style,
}

impl Default for CheckerTheme {
    fn default() -> Self {
        Self::new()
    }
}

impl CheckerTheme {
    /// Create the colored theme.
    ///
    /// Styling is forced on: callers usually capture stderr through a pipe,
    /// and whether color appears is decided by [`CheckerTheme::for_color`].
    pub fn new() -> Self {
        Self {
            error: Style::new().red().force_styling(true),
        }
    }

    /// Create a theme without colors (for `NO_COLOR` or `--no-color`).
    pub fn plain() -> Self {
        Self {
            error: Style::new(),
        }
    }

    /// Pick the colored or plain theme.
    pub fn for_color(color: bool) -> Self {
        if color {
            Self::new()
        } else {
            Self::plain()
        }
    }

    /// Format a tagged diagnostic line.
    pub fn format_diagnostic(&self, msg: &str) -> String {
        format!(
            "{}",
            self.error.apply_to(format!("{} {}", DIAGNOSTIC_TAG, msg))
        )
    }
}
