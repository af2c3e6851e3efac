//! Shared utilities for CLI commands.

use std::io::Read;
use std::path::Path;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use regex::Regex;
use wl_core::{RecordBatch, TrackedItem, decode_records, decode_tickets};

/// Pre-compiled regex for relative time parsing.
static RELATIVE_TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\s+(minute|hour|day|week)s?\s+ago$").unwrap());

/// Conservative bounds for relative time parsing (~1000 years in minutes).
const MAX_RELATIVE_MINUTES: i64 = 1000 * 365 * 24 * 60;

/// Parse a datetime string as either ISO 8601 or relative time.
///
/// Supports:
/// - ISO 8601: "2026-01-15T10:30:00Z"
/// - Relative: "2 hours ago", "30 minutes ago", "1 day ago", "1 week ago"
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>> {
    parse_datetime_at(s, Utc::now())
}

fn parse_datetime_at(s: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    let Some(caps) = RELATIVE_TIME_RE.captures(s.trim()) else {
        anyhow::bail!(
            "Invalid datetime: {s}. Use ISO 8601 (e.g., 2026-01-15T10:30:00Z) or relative (e.g., '2 hours ago')"
        );
    };

    let n: i64 = caps[1]
        .parse()
        .context("failed to parse number in relative time")?;

    let (max_for_unit, minutes_per_unit) = match &caps[2] {
        "minute" => (MAX_RELATIVE_MINUTES, 1),
        "hour" => (MAX_RELATIVE_MINUTES / 60, 60),
        "day" => (MAX_RELATIVE_MINUTES / (60 * 24), 60 * 24),
        "week" => (MAX_RELATIVE_MINUTES / (60 * 24 * 7), 60 * 24 * 7),
        unit => anyhow::bail!("Unknown time unit: {unit}"),
    };

    if n > max_for_unit {
        anyhow::bail!("Relative time value too large: {n} {}", &caps[2]);
    }

    Ok(now - Duration::minutes(n * minutes_per_unit))
}

/// Read a whole input file, or stdin when the path is `-`.
fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        return Ok(buf);
    }

    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Load activity records, keeping only those at or after `since`.
pub fn load_records(path: &Path, since: Option<&str>) -> Result<RecordBatch> {
    let json = read_input(path)?;
    let batch = decode_records(&json)
        .with_context(|| format!("failed to decode records from {}", path.display()))?;

    let batch = match since {
        Some(since) => batch.since(parse_datetime(since)?),
        None => batch,
    };

    tracing::debug!(
        records = batch.records.len(),
        skipped = batch.warnings.len(),
        "loaded activity records"
    );
    Ok(batch)
}

pub fn load_tickets(path: &Path) -> Result<Vec<TrackedItem>> {
    let json = read_input(path)?;
    let tickets = decode_tickets(&json)
        .with_context(|| format!("failed to decode tickets from {}", path.display()))?;
    tracing::debug!(tickets = tickets.len(), "loaded tickets");
    Ok(tickets)
}

/// Formats seconds as "Xh Ym", or "Ym" under an hour.
pub fn format_duration(secs: i64) -> String {
    wl_core::worklog::format_time_spent(secs)
}
