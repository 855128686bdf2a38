//! Color and styling helpers for CLI output.
//!
//! Semantic Color Theme:
//!   - Success:   green   (APPROVED, passed checks, compliant)
//!   - Warning:   yellow  (REVIEWING, MAJOR, warnings)
//!   - Error:     red     (REJECTED, CRITICAL, failed checks, violations)
//!   - Reference: cyan    (review and node ids)
//!   - Muted:     dimmed  (field labels, MINOR)

use crate::domain::{ReviewStatus, Severity};
use colored::Colorize;

use super::OutputConfig;

/// Apply semantic "success" color (green) to text.
pub fn success(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.green().to_string()
}

/// Apply semantic "error" color (red) to text.
pub fn error(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.red().to_string()
}

/// Apply semantic "warning" color (yellow) to text.
pub fn warning(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.yellow().to_string()
}

/// Colorize an id (cyan).
pub(crate) fn colorize_id(id: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return id.to_string();
    }
    id.cyan().to_string()
}

/// Dim a field label.
pub(crate) fn dimmed(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.dimmed().to_string()
}

/// Bold a header.
pub(crate) fn bold(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.bold().to_string()
}

/// Apply color to a review status.
pub(crate) fn colorize_status(status: ReviewStatus, config: &OutputConfig) -> String {
    let text = status.to_string();
    if !config.use_colors {
        return text;
    }
    match status {
        ReviewStatus::Draft => text.white().to_string(),
        ReviewStatus::Reviewing => text.yellow().to_string(),
        ReviewStatus::Approved => text.green().to_string(),
        ReviewStatus::Rejected => text.red().to_string(),
    }
}

/// Apply color to a rule severity.
pub(crate) fn colorize_severity(severity: Severity, config: &OutputConfig) -> String {
    let text = severity.to_string();
    if !config.use_colors {
        return text;
    }
    match severity {
        Severity::Critical => text.red().bold().to_string(),
        Severity::Major => text.yellow().to_string(),
        Severity::Minor => text.dimmed().to_string(),
    }
}

/// Pass/fail marker for a check, with ASCII fallback.
pub(crate) fn check_icon(passed: bool, config: &OutputConfig) -> String {
    let icon = match (passed, config.use_ascii) {
        (true, true) => "+",
        (false, true) => "x",
        (true, false) => "✓",
        (false, false) => "✗",
    };
    if passed {
        success(icon, config)
    } else {
        error(icon, config)
    }
}
