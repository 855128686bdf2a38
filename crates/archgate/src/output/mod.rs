//! Output formatting for CLI commands.
//!
//! Every printer has a text form, written through [`color`] helpers, and a
//! JSON form that serializes the domain value with `serde_json`. Text writers
//! take any `io::Write` so tests can render into a buffer.

pub mod color;

use crate::domain::{ComplianceCheck, ImpactResult, Review, ReviewEvent, SubmitOutcome};
use crate::dr::{DrFinding, DrReport};
use crate::storage::ReviewRecord;
use serde::Serialize;
use std::env;
use std::io::{self, Write};

pub use color::{error, success, warning};

use color::{bold, check_icon, colorize_id, colorize_severity, colorize_status, dimmed};

/// Output format selected by the global `--json` flag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable text format
    Text,
    /// JSON format for programmatic use
    Json,
}

/// Settings for text output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    /// Whether to use ASCII-only icons instead of Unicode.
    pub use_ascii: bool,
    /// Whether to use colors in output.
    pub use_colors: bool,
}

impl OutputConfig {
    /// Read settings from the environment.
    ///
    /// - `NO_COLOR`: any value disables colors
    /// - `ARCHGATE_COLOR`: "0" or "false" disables colors
    /// - `ARCHGATE_ASCII`: "1" or "true" selects ASCII icons
    #[must_use]
    pub fn from_env() -> Self {
        let use_ascii = env::var("ARCHGATE_ASCII")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        let use_colors = env::var("NO_COLOR").is_err()
            && env::var("ARCHGATE_COLOR")
                .map(|v| v != "0" && !v.eq_ignore_ascii_case("false"))
                .unwrap_or(true);
        Self {
            use_ascii,
            use_colors,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            use_ascii: false,
            use_colors: true,
        }
    }
}

/// Print any serializable value as pretty JSON on stdout.
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    serde_json::to_writer_pretty(&mut handle, value)?;
    writeln!(handle)
}

fn print_with<T, F>(value: &T, mode: OutputMode, text: F) -> io::Result<()>
where
    T: Serialize + ?Sized,
    F: FnOnce(&mut dyn Write, &T, &OutputConfig) -> io::Result<()>,
{
    match mode {
        OutputMode::Json => print_json(value),
        OutputMode::Text => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            text(&mut handle as &mut dyn Write, value, &OutputConfig::from_env())
        }
    }
}

/// Print an impact result.
///
/// # Errors
///
/// Returns an error if writing to stdout fails.
pub fn print_impact(result: &ImpactResult, mode: OutputMode) -> io::Result<()> {
    print_with(result, mode, write_impact_text)
}

/// Print a review with its checks.
///
/// # Errors
///
/// Returns an error if writing to stdout fails.
pub fn print_review(record: &ReviewRecord, mode: OutputMode) -> io::Result<()> {
    match mode {
        OutputMode::Json => print_json(&serde_json::json!({
            "review": record.review,
            "checks": record.checks,
            "version": record.version,
        })),
        OutputMode::Text => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            write_review_text(&mut handle, record, &OutputConfig::from_env())
        }
    }
}

/// Print a list of reviews.
///
/// # Errors
///
/// Returns an error if writing to stdout fails.
pub fn print_reviews(reviews: &[Review], mode: OutputMode) -> io::Result<()> {
    print_with(reviews, mode, write_reviews_text)
}

/// Print the outcome of a submission.
///
/// # Errors
///
/// Returns an error if writing to stdout fails.
pub fn print_submit_outcome(outcome: &SubmitOutcome, mode: OutputMode) -> io::Result<()> {
    print_with(outcome, mode, |w, outcome, config| {
        writeln!(w, "Status: {}", colorize_status(outcome.status, config))?;
        if outcome.blocked {
            writeln!(
                w,
                "{}",
                error("Blocked: a CRITICAL compliance check failed", config)
            )?;
        }
        write_checks_text(w, &outcome.checks, config)
    })
}

/// Print a fresh check set.
///
/// # Errors
///
/// Returns an error if writing to stdout fails.
pub fn print_checks(checks: &[ComplianceCheck], mode: OutputMode) -> io::Result<()> {
    print_with(checks, mode, write_checks_text)
}

/// Print an audit trail.
///
/// # Errors
///
/// Returns an error if writing to stdout fails.
pub fn print_events(events: &[ReviewEvent], mode: OutputMode) -> io::Result<()> {
    print_with(events, mode, write_events_text)
}

/// Print a disaster-recovery report.
///
/// # Errors
///
/// Returns an error if writing to stdout fails.
pub fn print_dr_report(report: &DrReport, mode: OutputMode) -> io::Result<()> {
    print_with(report, mode, write_dr_text)
}

fn write_impact_text(
    w: &mut dyn Write,
    result: &ImpactResult,
    config: &OutputConfig,
) -> io::Result<()> {
    writeln!(
        w,
        "{} of {} (depth {})",
        bold(&format!("Impact {}", result.direction), config),
        colorize_id(result.root.as_str(), config),
        result.depth
    )?;
    if result.is_empty() {
        writeln!(w, "  {}", dimmed("no affected nodes", config))?;
        return Ok(());
    }
    for level in 1..=result.max_level() {
        writeln!(w, "  {}", dimmed(&format!("level {level}"), config))?;
        for entry in result.at_level(level) {
            writeln!(
                w,
                "    {}  via {} -> {} [{:?}, {:?}]",
                colorize_id(entry.reached.as_str(), config),
                entry.edge.source,
                entry.edge.target,
                entry.edge.edge_type,
                entry.edge.criticality,
            )?;
        }
    }
    if result.truncated {
        writeln!(
            w,
            "{}",
            warning("Result truncated at the configured node cap", config)
        )?;
    }
    Ok(())
}

fn write_review_text(
    w: &mut dyn Write,
    record: &ReviewRecord,
    config: &OutputConfig,
) -> io::Result<()> {
    let review = &record.review;
    writeln!(
        w,
        "{} {}",
        colorize_id(review.id.as_str(), config),
        bold(&review.title, config)
    )?;
    let label = |name: &str| dimmed(&format!("{name:<11}"), config);
    writeln!(w, "  {} {}", label("Status:"), colorize_status(review.status, config))?;
    writeln!(w, "  {} {}", label("Type:"), review.change_type)?;
    writeln!(
        w,
        "  {} {} (level {})",
        label("Target:"),
        review.target_system,
        review.target_level
    )?;
    writeln!(w, "  {} {}", label("Applicant:"), review.applicant)?;
    if let Some(submitted) = review.submitted_date {
        writeln!(
            w,
            "  {} {}",
            label("Submitted:"),
            submitted.format("%Y-%m-%d %H:%M UTC")
        )?;
    }
    writeln!(w, "  {} {}", label("Version:"), record.version)?;
    write_checks_text(w, &record.checks, config)
}

fn write_reviews_text(
    w: &mut dyn Write,
    reviews: &[Review],
    config: &OutputConfig,
) -> io::Result<()> {
    if reviews.is_empty() {
        return writeln!(w, "No reviews found.");
    }
    for review in reviews {
        writeln!(
            w,
            "{} [{}] {} ({})",
            colorize_id(review.id.as_str(), config),
            colorize_status(review.status, config),
            review.title,
            review.target_system
        )?;
    }
    Ok(())
}

fn write_checks_text(
    w: &mut dyn Write,
    checks: &[ComplianceCheck],
    config: &OutputConfig,
) -> io::Result<()> {
    if checks.is_empty() {
        return writeln!(w, "  {}", dimmed("Checks: not evaluated", config));
    }
    let passed = checks.iter().filter(|c| c.passed).count();
    writeln!(w, "  Checks: {passed}/{} passed", checks.len())?;
    for check in checks {
        writeln!(
            w,
            "    {} {} {}: {}",
            check_icon(check.passed, config),
            colorize_severity(check.severity, config),
            check.rule_id,
            check.message
        )?;
    }
    Ok(())
}

fn write_events_text(
    w: &mut dyn Write,
    events: &[ReviewEvent],
    config: &OutputConfig,
) -> io::Result<()> {
    if events.is_empty() {
        return writeln!(w, "No events.");
    }
    for event in events {
        writeln!(
            w,
            "#{:<5} {} {:<13} {} ({}) -> {}",
            event.sequence_id,
            dimmed(&event.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(), config),
            event.action.to_string(),
            event.actor,
            event.actor_role,
            colorize_status(event.snapshot.review.status, config)
        )?;
    }
    Ok(())
}

fn write_dr_text(w: &mut dyn Write, report: &DrReport, config: &OutputConfig) -> io::Result<()> {
    let finding = |f: &DrFinding| {
        format!(
            "{} {} ({} site{})",
            colorize_id(f.system_id.as_str(), config),
            f.name,
            f.site_count,
            if f.site_count == 1 { "" } else { "s" }
        )
    };

    if report.core_compliant {
        writeln!(w, "{}", success("Core systems: compliant", config))?;
    } else {
        writeln!(w, "{}", error("Core systems: NOT compliant", config))?;
        for violation in &report.core_violations {
            writeln!(w, "  {}", finding(violation))?;
        }
    }
    if !report.important_warnings.is_empty() {
        writeln!(w, "{}", warning("Important systems below two sites:", config))?;
        for item in &report.important_warnings {
            writeln!(w, "  {}", finding(item))?;
        }
    }
    Ok(())
}
