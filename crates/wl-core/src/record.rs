//! Activity records as delivered by the time-tracking source.
//!
//! Records arrive as loosely-typed JSON. Each one is decoded on its own so a
//! single bad timestamp costs one record, never the whole batch.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Project name used when a record carries no project.
pub const UNKNOWN_PROJECT: &str = "Unknown";

/// Naive timestamp layouts accepted after RFC 3339 fails. Read as UTC.
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Why a single record was rejected.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("missing {field} timestamp")]
    MissingTimestamp { field: &'static str },
    #[error("invalid {field} timestamp {value:?}")]
    InvalidTimestamp { field: &'static str, value: String },
    #[error("malformed record: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Errors for a payload that cannot be read at all.
#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A record that was skipped, surfaced to the caller instead of aborting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordWarning {
    /// Position of the record in the submitted batch.
    pub index: usize,
    pub message: String,
}

/// A single timed activity with its descriptive text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Tracked seconds as reported by the source. Not derived from
    /// `end - start` and may disagree with it.
    pub duration_secs: i64,
    pub project: String,
    pub title: String,
    pub notes: String,
}

impl ActivityRecord {
    /// Creates a record whose duration equals its span, with no text.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start,
            end,
            duration_secs: (end - start).num_seconds(),
            project: UNKNOWN_PROJECT.to_string(),
            title: String::new(),
            notes: String::new(),
        }
    }

    #[must_use]
    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.project = project.into();
        self
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    #[must_use]
    pub const fn with_duration(mut self, duration_secs: i64) -> Self {
        self.duration_secs = duration_secs;
        self
    }
}

/// Project reference: either `{"title": ...}` or a bare name.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ProjectRef {
    Named { title: Option<String> },
    Plain(String),
}

/// Wire shape of a record before timestamp validation.
#[derive(Debug, Deserialize)]
struct RawActivityRecord {
    #[serde(default, alias = "start_date")]
    start: Option<String>,
    #[serde(default, alias = "end_date")]
    end: Option<String>,
    #[serde(default)]
    duration: Option<f64>,
    #[serde(default)]
    project: Option<ProjectRef>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    notes: Option<String>,
}

impl TryFrom<RawActivityRecord> for ActivityRecord {
    type Error = RecordError;

    fn try_from(raw: RawActivityRecord) -> Result<Self, Self::Error> {
        let start = parse_timestamp("start", raw.start.as_deref())?;
        let end = parse_timestamp("end", raw.end.as_deref())?;

        let project = match raw.project {
            Some(ProjectRef::Named { title: Some(title) } | ProjectRef::Plain(title)) => title,
            Some(ProjectRef::Named { title: None }) | None => UNKNOWN_PROJECT.to_string(),
        };

        #[expect(
            clippy::cast_possible_truncation,
            reason = "tracked durations are far below i64::MAX seconds"
        )]
        let duration_secs = raw.duration.map_or(0, |d| d.trunc() as i64);

        Ok(Self {
            start,
            end,
            duration_secs,
            project,
            title: raw.title.unwrap_or_default(),
            notes: raw.notes.unwrap_or_default(),
        })
    }
}

/// Parse an ISO-8601 timestamp.
///
/// RFC 3339 (with `Z` or an offset) is preferred; a timestamp with no offset
/// is taken to be UTC.
pub fn parse_timestamp(
    field: &'static str,
    value: Option<&str>,
) -> Result<DateTime<Utc>, RecordError> {
    let value = value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(RecordError::MissingTimestamp { field })?;

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| RecordError::InvalidTimestamp {
            field,
            value: value.to_string(),
        })
}

/// Records that decoded cleanly plus a warning for each one that did not.
#[derive(Debug, Clone, Default)]
pub struct RecordBatch {
    pub records: Vec<ActivityRecord>,
    pub warnings: Vec<RecordWarning>,
}

impl RecordBatch {
    /// Decode each JSON value independently.
    pub fn from_values(values: Vec<serde_json::Value>) -> Self {
        let mut batch = Self::default();

        for (index, value) in values.into_iter().enumerate() {
            let decoded = serde_json::from_value::<RawActivityRecord>(value)
                .map_err(RecordError::from)
                .and_then(ActivityRecord::try_from);

            match decoded {
                Ok(record) => batch.records.push(record),
                Err(e) => {
                    tracing::warn!(index, error = %e, "skipping activity record");
                    batch.warnings.push(RecordWarning {
                        index,
                        message: e.to_string(),
                    });
                }
            }
        }

        batch
    }

    /// Keep only records starting at or after `since`.
    #[must_use]
    pub fn since(mut self, since: DateTime<Utc>) -> Self {
        self.records.retain(|r| r.start >= since);
        self
    }
}

impl From<Vec<ActivityRecord>> for RecordBatch {
    fn from(records: Vec<ActivityRecord>) -> Self {
        Self {
            records,
            warnings: Vec::new(),
        }
    }
}

/// Record payloads come either as a bare array or wrapped in `data`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RecordsPayload {
    List(Vec<serde_json::Value>),
    Wrapped {
        #[serde(default)]
        data: Option<Vec<serde_json::Value>>,
    },
}

/// Decode a record payload.
///
/// Only a payload that is not JSON, or has neither accepted shape, is an
/// error. Individual bad records become warnings on the batch.
pub fn decode_records(json: &str) -> Result<RecordBatch, PayloadError> {
    let values = match serde_json::from_str::<RecordsPayload>(json)? {
        RecordsPayload::List(values) => values,
        RecordsPayload::Wrapped { data } => data.unwrap_or_default(),
    };
    Ok(RecordBatch::from_values(values))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn parses_rfc3339_with_offset() {
        let ts = parse_timestamp("start", Some("2025-01-15T10:00:00+01:00")).unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2025, 1, 15, 9, 0, 0).unwrap());
    }

    #[test]
    fn parses_naive_timestamp_as_utc() {
        let ts = parse_timestamp("end", Some("2025-01-15T09:20:00.000")).unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2025, 1, 15, 9, 20, 0).unwrap());
    }

    #[test]
    fn rejects_garbage_and_missing_timestamps() {
        let err = parse_timestamp("start", Some("yesterday-ish")).unwrap_err();
        assert_eq!(err.to_string(), "invalid start timestamp \"yesterday-ish\"");

        let err = parse_timestamp("end", None).unwrap_err();
        assert_eq!(err.to_string(), "missing end timestamp");
    }

    #[test]
    fn decodes_timing_style_entries() {
        let json = r#"{"data": [{
            "start_date": "2025-01-15T09:00:00Z",
            "end_date": "2025-01-15T09:20:00Z",
            "duration": 1200.0,
            "project": {"title": "webapp"},
            "title": "Fix login bug",
            "notes": null
        }]}"#;

        let batch = decode_records(json).unwrap();
        assert!(batch.warnings.is_empty());
        let record = &batch.records[0];
        assert_eq!(record.duration_secs, 1200);
        assert_eq!(record.project, "webapp");
        assert_eq!(record.title, "Fix login bug");
        assert_eq!(record.notes, "");
    }

    #[test]
    fn missing_project_becomes_unknown() {
        let json = r#"[
            {"start": "2025-01-15T09:00:00Z", "end": "2025-01-15T09:20:00Z"},
            {"start": "2025-01-15T09:30:00Z", "end": "2025-01-15T09:40:00Z", "project": {"title": null}},
            {"start": "2025-01-15T09:45:00Z", "end": "2025-01-15T09:50:00Z", "project": "cli"}
        ]"#;

        let batch = decode_records(json).unwrap();
        let projects: Vec<_> = batch.records.iter().map(|r| r.project.as_str()).collect();
        assert_eq!(projects, vec![UNKNOWN_PROJECT, UNKNOWN_PROJECT, "cli"]);
        assert_eq!(batch.records[0].duration_secs, 0);
    }

    #[test]
    fn bad_records_become_warnings() {
        let json = r#"[
            {"start": "2025-01-15T09:00:00Z", "end": "2025-01-15T09:20:00Z"},
            {"start": "not a time", "end": "2025-01-15T09:40:00Z"},
            {"end": "2025-01-15T09:40:00Z"},
            {"start": "2025-01-15T10:00:00Z", "end": "2025-01-15T10:20:00Z", "duration": "long"}
        ]"#;

        let batch = decode_records(json).unwrap();
        assert_eq!(batch.records.len(), 1);
        let indices: Vec<_> = batch.warnings.iter().map(|w| w.index).collect();
        assert_eq!(indices, vec![1, 2, 3]);
        assert!(batch.warnings[0].message.contains("invalid start timestamp"));
    }

    #[test]
    fn empty_payloads_are_not_errors() {
        assert!(decode_records("[]").unwrap().records.is_empty());
        assert!(decode_records(r#"{"data": null}"#).unwrap().records.is_empty());
        assert!(decode_records("{}").unwrap().records.is_empty());
    }

    #[test]
    fn non_json_payload_is_an_error() {
        assert!(decode_records("<html>").is_err());
        assert!(decode_records("42").is_err());
    }

    #[test]
    fn since_drops_earlier_records() {
        let at = |m| Utc.with_ymd_and_hms(2025, 1, 15, 9, m, 0).unwrap();
        let batch = RecordBatch::from(vec![
            ActivityRecord::new(at(0), at(10)),
            ActivityRecord::new(at(30), at(40)),
        ])
        .since(at(15));

        assert_eq!(batch.records.len(), 1);
        assert_eq!(batch.records[0].start, at(30));
    }
}
