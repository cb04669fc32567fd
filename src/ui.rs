//! Centralized UI formatting and color utilities
//!
//! Colors, icons and small text helpers shared by the report formatters and
//! the command handlers.

use colored::{ColoredString, Colorize};

use crate::score::Rating;
use crate::shapes::ShapeSeverity;

/// Environment variable set by `--quiet`.
pub const QUIET_ENV: &str = "MQA_QUIET";

/// Check if quiet mode is enabled via environment variable or --quiet flag
pub fn is_quiet() -> bool {
    std::env::var(QUIET_ENV)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// Colored rating label.
///
/// - Excellent: green
/// - Good: blue
/// - Sufficient: yellow
/// - Poor: red
pub fn rating_label(rating: Rating) -> ColoredString {
    let text = rating.to_string();
    match rating {
        Rating::Excellent => text.green().bold(),
        Rating::Good => text.blue().bold(),
        Rating::Sufficient => text.yellow().bold(),
        Rating::Poor => text.red().bold(),
    }
}

/// Colored severity marker for shape results.
pub fn severity_icon(severity: ShapeSeverity) -> ColoredString {
    match severity {
        ShapeSeverity::Violation => "✗".red(),
        ShapeSeverity::Warning => "⚠".yellow(),
        ShapeSeverity::Info => "ℹ".blue(),
    }
}

/// Marker for a metric line: full, partial, none, or not scored.
pub fn compliance_icon(compliant: usize, total: usize, scored: bool) -> ColoredString {
    if !scored {
        "○".dimmed()
    } else if total > 0 && compliant == total {
        "●".green()
    } else if compliant > 0 {
        "◐".yellow()
    } else {
        "✗".red()
    }
}

/// Color scheme for status-related text output
pub mod colors {
    use colored::{ColoredString, Colorize};

    /// Green for success
    pub fn success(text: &str) -> ColoredString {
        text.green()
    }

    /// Yellow for warnings
    pub fn warning(text: &str) -> ColoredString {
        text.yellow()
    }

    /// Red for errors/failures
    pub fn error(text: &str) -> ColoredString {
        text.red()
    }

    /// Cyan for identifiers (metric ids, profile names)
    pub fn identifier(text: &str) -> ColoredString {
        text.cyan()
    }

    /// Dimmed for secondary text
    pub fn secondary(text: &str) -> ColoredString {
        text.dimmed()
    }

    /// Bold for headings
    pub fn heading(text: &str) -> ColoredString {
        text.bold()
    }
}

/// Common text formatting patterns
pub mod format {
    /// Horizontal bar for a ratio in `[0, 1]`.
    pub fn bar(ratio: f64, width: usize) -> String {
        let ratio = if ratio.is_finite() {
            ratio.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let filled = (ratio * width as f64).round() as usize;
        format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
    }

    /// Underline of the same width as `title`.
    pub fn underline(title: &str) -> String {
        "─".repeat(title.chars().count())
    }

    /// Score with up to three decimals and no trailing zeros.
    pub fn score(value: f64) -> String {
        let s = format!("{:.3}", value);
        let s = s.trim_end_matches('0').trim_end_matches('.');
        if s == "-0" {
            "0".to_string()
        } else {
            s.to_string()
        }
    }

    /// Truncate to `max_len` characters with an ellipsis.
    pub fn truncate(text: &str, max_len: usize) -> String {
        if text.chars().count() <= max_len {
            text.to_string()
        } else {
            let kept: String = text.chars().take(max_len.saturating_sub(3)).collect();
            format!("{}...", kept)
        }
    }
}
