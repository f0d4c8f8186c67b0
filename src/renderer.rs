//! # Report Rendering
//!
//! Turns an ISS fix and its phase evaluation into the terminal report, or into
//! a JSON object for scripting.

use crate::config::DisplayConfig;
use crate::phase::{ClassificationMode, PhaseLabel, PhaseResult};
use crate::IssFix;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::fmt::Write;

const HEADER: &str = "--------------- ISS location ----------------";

/// Used when the configured pattern cannot be rendered
const FALLBACK_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Format a phase delta as zero-padded `HH:MM`.
///
/// Hours wrap at 24; seconds and fractions of a second are dropped.
///
/// # Example
/// ```
/// use chrono::Duration;
/// use iss_observer_lib::renderer::format_delta;
///
/// assert_eq!(format_delta(Duration::minutes(90)), "01:30");
/// ```
pub fn format_delta(delta: Duration) -> String {
    let seconds = delta.num_seconds().abs();
    format!("{:02}:{:02}", seconds / 3600 % 24, seconds / 60 % 60)
}

/// Format the observation instant with a strftime pattern.
pub fn format_observed_at(at: DateTime<Utc>, pattern: &str) -> String {
    let mut text = String::new();
    if write!(text, "{}", at.format(pattern)).is_err() {
        text = at.format(FALLBACK_DATETIME_FORMAT).to_string();
    }
    text
}

fn day_night(result: &PhaseResult) -> &'static str {
    if result.is_day {
        "day"
    } else {
        "night"
    }
}

fn verdict(result: &PhaseResult) -> &'static str {
    if result.is_ideal {
        "ideal"
    } else {
        "not ideal"
    }
}

/// Render the two-column text report.
pub fn render_text(fix: &IssFix, result: &PhaseResult, display: &DisplayConfig) -> String {
    let rows = [
        ("latitude:", format!("{:>8}", fix.position.latitude)),
        ("longitude:", format!("{:>8}", fix.position.longitude)),
        (
            "UTC time:",
            format_observed_at(fix.observed_at, &display.datetime_format),
        ),
        ("day/night:", day_night(result).to_string()),
        (
            "day phase:",
            format!("{} {}", format_delta(result.delta), result.label),
        ),
        ("observation conditions:", verdict(result).to_string()),
    ];

    let mut report = format!("\n{}\n", HEADER);
    for (label, value) in rows {
        report.push_str(&format!("{:<25} {}\n", label, value));
    }
    report
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    latitude: &'a str,
    longitude: &'a str,
    observed_at: DateTime<Utc>,
    mode: ClassificationMode,
    day_night: &'static str,
    phase: PhaseLabel,
    phase_delta: String,
    phase_delta_seconds: i64,
    ideal: bool,
}

/// Render the report as a pretty-printed JSON object.
pub fn render_json(
    fix: &IssFix,
    result: &PhaseResult,
    mode: ClassificationMode,
) -> Result<String, serde_json::Error> {
    let report = JsonReport {
        latitude: &fix.position.latitude,
        longitude: &fix.position.longitude,
        observed_at: fix.observed_at,
        mode,
        day_night: day_night(result),
        phase: result.label,
        phase_delta: format_delta(result.delta),
        // Whole seconds, truncated
        phase_delta_seconds: result.delta.num_seconds(),
        ideal: result.is_ideal,
    };
    serde_json::to_string_pretty(&report)
}

/// Print the text report to stdout.
pub fn draw_ascii(fix: &IssFix, result: &PhaseResult, display: &DisplayConfig) {
    print!("{}", render_text(fix, result, display));
}
