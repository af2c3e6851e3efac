//! Session summaries.
//!
//! Turns a raw session (an ordered run of records) into a [`WorkSession`]:
//! elapsed span, dominant project and title, a short human summary, and any
//! ticket reference written verbatim in the session's text.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::analysis::AnalysisConfig;
use crate::record::ActivityRecord;

/// Title used when no record in the session has one.
pub const DEFAULT_TITLE: &str = "Work Session";

/// Notes must be longer than this (after whitespace cleanup) to count as an activity.
const MIN_NOTE_CHARS: usize = 10;

/// Ticket prefixes, in the order they are tried.
const TICKET_PREFIXES: &[&str] = &["PROJ", "DEV", "BUG", "FEAT"];

static TICKET_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    TICKET_PREFIXES
        .iter()
        .map(|prefix| {
            let re = Regex::new(&format!(r"(?i){prefix}-\d+")).expect("ticket pattern is valid");
            (*prefix, re)
        })
        .collect()
});

/// A contiguous stretch of work with its derived attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkSession {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Elapsed seconds from first start to last end. Not the sum of record durations.
    pub total_duration_secs: i64,
    pub primary_project: String,
    pub primary_title: String,
    pub related_projects: BTreeSet<String>,
    pub work_summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticket_reference: Option<String>,
    pub records: Vec<ActivityRecord>,
}

/// Summarize one raw session.
///
/// Returns `None` for an empty session or one whose elapsed span is below
/// `min_session_duration_secs`. Short sessions are dropped, never padded.
pub fn summarize_session(
    records: Vec<ActivityRecord>,
    config: &AnalysisConfig,
) -> Option<WorkSession> {
    let start_time = records.first()?.start;
    let end_time = records.last()?.end;
    let total_duration_secs = (end_time - start_time).num_seconds();

    if total_duration_secs < config.min_session_duration_secs {
        tracing::debug!(
            %start_time,
            duration_secs = total_duration_secs,
            "dropping short session"
        );
        return None;
    }

    let primary_project = heaviest(records.iter().map(|r| (r.project.as_str(), r.duration_secs)))
        .unwrap_or_default()
        .to_string();

    let primary_title = heaviest(
        records
            .iter()
            .filter(|r| !r.title.is_empty())
            .map(|r| (r.title.as_str(), r.duration_secs)),
    )
    .unwrap_or(DEFAULT_TITLE)
    .to_string();

    let related_projects = records.iter().map(|r| r.project.clone()).collect();
    let activities = collect_activities(&records);
    let work_summary = format_work_summary(&activities, &primary_title);
    let ticket_reference = extract_ticket_reference(&records);

    Some(WorkSession {
        start_time,
        end_time,
        total_duration_secs,
        primary_project,
        primary_title,
        related_projects,
        work_summary,
        ticket_reference,
        records,
    })
}

/// Sum weights per name and return the heaviest name.
///
/// Ties go to the name seen first.
fn heaviest<'a>(items: impl Iterator<Item = (&'a str, i64)>) -> Option<&'a str> {
    let mut totals: Vec<(&'a str, i64)> = Vec::new();
    for (name, weight) in items {
        match totals.iter_mut().find(|(n, _)| *n == name) {
            Some((_, total)) => *total += weight,
            None => totals.push((name, weight)),
        }
    }

    let mut best: Option<(&'a str, i64)> = None;
    for (name, total) in totals {
        if best.is_none_or(|(_, best_total)| total > best_total) {
            best = Some((name, total));
        }
    }
    best.map(|(name, _)| name)
}

/// Distinct titles and meaningful notes, in first-seen order.
fn collect_activities(records: &[ActivityRecord]) -> Vec<String> {
    let mut activities: Vec<String> = Vec::new();
    let mut push = |activity: String| {
        if !activities.contains(&activity) {
            activities.push(activity);
        }
    };

    for record in records {
        if !record.title.is_empty() {
            push(record.title.clone());
        }

        let note = normalize_whitespace(&record.notes);
        if note.chars().count() > MIN_NOTE_CHARS {
            push(note);
        }
    }

    activities
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Render the one-line summary for a session's activities.
pub fn format_work_summary(activities: &[String], primary_title: &str) -> String {
    match activities {
        [only] => format!("Focused on: {only}"),
        _ if activities.len() <= 3 => format!("Worked on: {}", activities.join(", ")),
        _ => format!(
            "Multi-tasked across {} activities, primarily: {primary_title}",
            activities.len()
        ),
    }
}

/// Find the first ticket identifier written in the records.
///
/// Each record is checked title first, then notes, then project name; within
/// a field the prefixes are tried in declared order.
pub fn extract_ticket_reference(records: &[ActivityRecord]) -> Option<String> {
    records
        .iter()
        .flat_map(|r| [r.title.as_str(), r.notes.as_str(), r.project.as_str()])
        .find_map(|text| {
            TICKET_PATTERNS.iter().find_map(|(prefix, re)| {
                let found = re.find(text)?;
                tracing::trace!(prefix = *prefix, reference = found.as_str(), "found ticket reference");
                Some(found.as_str().to_string())
            })
        })
}
