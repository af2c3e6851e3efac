//! One analysis pass: records → sessions → summaries → matches → report.
//!
//! The pass is a pure, single-threaded transform over already-fetched data,
//! so the report is identical for identical input.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::matcher::{MatchConfig, MatchResult, match_session};
use crate::record::{ActivityRecord, RecordBatch, RecordWarning};
use crate::segment::segment_records;
use crate::summary::{WorkSession, summarize_session};
use crate::ticket::TrackedItem;
use crate::types::ValidationError;
use crate::worklog::WorklogDraft;

/// Configuration for segmentation and summarization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Idle minutes allowed between records of one session. Default: 15.
    pub max_gap_minutes: i64,

    /// Sessions spanning fewer seconds are dropped. Default: 300 (5 min).
    pub min_session_duration_secs: i64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_gap_minutes: 15,
            min_session_duration_secs: 300,
        }
    }
}

impl AnalysisConfig {
    /// Rejects negative gap and duration settings.
    pub const fn validate(&self) -> Result<(), ValidationError> {
        if self.max_gap_minutes < 0 {
            return Err(ValidationError::Negative {
                field: "max_gap_minutes",
                value: self.max_gap_minutes,
            });
        }
        if self.min_session_duration_secs < 0 {
            return Err(ValidationError::Negative {
                field: "min_session_duration_secs",
                value: self.min_session_duration_secs,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityStatus {
    NoActivity,
    HasActivity,
}

/// The project that took the most session time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimaryFocus {
    pub project: String,
    pub time_spent_secs: i64,
    pub total_time_secs: i64,
    /// `time_spent / total_time`, 0 when nothing was tracked.
    pub share: f64,
    pub session_count: usize,
}

/// Scored-match outcome for one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionOutcome {
    pub session: usize,
    #[serde(rename = "match")]
    pub matched: Option<MatchResult>,
}

/// A session that names a ticket directly in its text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketUpdate {
    pub ticket: String,
    pub session: usize,
    pub time_spent_secs: i64,
    pub summary: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub projects: Vec<String>,
}

/// Result of one analysis pass.
///
/// Scored matches (`outcomes`) and direct references (`ticket_updates`) are
/// independent; a session can appear in both with different tickets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub generated_at: DateTime<Utc>,
    pub status: ActivityStatus,
    pub session_count: usize,
    pub total_work_secs: i64,
    pub summary: String,
    pub primary_focus: Option<PrimaryFocus>,
    pub sessions: Vec<WorkSession>,
    pub outcomes: Vec<SessionOutcome>,
    pub unmatched_sessions: Vec<usize>,
    pub ticket_updates: Vec<TicketUpdate>,
    pub worklogs: Vec<WorklogDraft>,
    pub warnings: Vec<RecordWarning>,
}

impl AnalysisReport {
    pub const fn has_activity(&self) -> bool {
        matches!(self.status, ActivityStatus::HasActivity)
    }

    /// Scored matches in session order.
    pub fn matches(&self) -> impl Iterator<Item = &MatchResult> {
        self.outcomes.iter().filter_map(|o| o.matched.as_ref())
    }

    pub fn matched_count(&self) -> usize {
        self.matches().count()
    }
}

/// Segment and summarize records, dropping undersized sessions.
pub fn build_sessions(records: Vec<ActivityRecord>, config: &AnalysisConfig) -> Vec<WorkSession> {
    segment_records(records, config)
        .into_iter()
        .filter_map(|raw| summarize_session(raw, config))
        .collect()
}

/// Run a full analysis pass.
///
/// An empty batch, or one whose sessions are all too short, yields a report
/// with [`ActivityStatus::NoActivity`]. An empty candidate list leaves every
/// session unmatched.
pub fn analyze(
    batch: RecordBatch,
    candidates: &[TrackedItem],
    config: &AnalysisConfig,
    match_config: &MatchConfig,
    generated_at: DateTime<Utc>,
) -> AnalysisReport {
    let RecordBatch { records, warnings } = batch;
    let sessions = build_sessions(records, config);

    let outcomes: Vec<SessionOutcome> = sessions
        .iter()
        .enumerate()
        .map(|(index, session)| SessionOutcome {
            session: index,
            matched: match_session(index, session, candidates, match_config),
        })
        .collect();

    let unmatched_sessions = outcomes
        .iter()
        .filter(|o| o.matched.is_none())
        .map(|o| o.session)
        .collect();

    let worklogs = outcomes
        .iter()
        .filter_map(|o| o.matched.as_ref())
        .map(|m| WorklogDraft::for_match(m, &sessions[m.session], generated_at))
        .collect();

    let status = if sessions.is_empty() {
        ActivityStatus::NoActivity
    } else {
        ActivityStatus::HasActivity
    };

    tracing::debug!(
        sessions = sessions.len(),
        warnings = warnings.len(),
        "analysis pass complete"
    );

    AnalysisReport {
        generated_at,
        status,
        session_count: sessions.len(),
        total_work_secs: total_work_secs(&sessions),
        summary: format_overall_summary(&sessions),
        primary_focus: primary_focus(&sessions),
        ticket_updates: ticket_updates(&sessions),
        outcomes,
        unmatched_sessions,
        worklogs,
        sessions,
        warnings,
    }
}

pub fn total_work_secs(sessions: &[WorkSession]) -> i64 {
    sessions.iter().map(|s| s.total_duration_secs).sum()
}

/// Sum elapsed time per primary project and return the largest.
///
/// Ties go to the project whose session came first.
pub fn primary_focus(sessions: &[WorkSession]) -> Option<PrimaryFocus> {
    let mut totals: Vec<(&str, i64)> = Vec::new();
    for session in sessions {
        let project = session.primary_project.as_str();
        match totals.iter_mut().find(|(p, _)| *p == project) {
            Some((_, total)) => *total += session.total_duration_secs,
            None => totals.push((project, session.total_duration_secs)),
        }
    }

    let total_time_secs: i64 = totals.iter().map(|(_, t)| t).sum();
    let (project, time_spent_secs) = totals
        .into_iter()
        .reduce(|best, next| if next.1 > best.1 { next } else { best })?;

    #[expect(
        clippy::cast_precision_loss,
        reason = "second counts are far below 2^52"
    )]
    let share = if total_time_secs > 0 {
        time_spent_secs as f64 / total_time_secs as f64
    } else {
        0.0
    };

    Some(PrimaryFocus {
        project: project.to_string(),
        time_spent_secs,
        total_time_secs,
        share,
        session_count: sessions.len(),
    })
}

/// Sessions that carry a directly extracted ticket reference.
pub fn ticket_updates(sessions: &[WorkSession]) -> Vec<TicketUpdate> {
    sessions
        .iter()
        .enumerate()
        .filter_map(|(index, session)| {
            let ticket = session.ticket_reference.clone()?;
            Some(TicketUpdate {
                ticket,
                session: index,
                time_spent_secs: session.total_duration_secs,
                summary: session.work_summary.clone(),
                start_time: session.start_time,
                end_time: session.end_time,
                projects: session.related_projects.iter().cloned().collect(),
            })
        })
        .collect()
}

/// One line describing all sessions of the pass.
pub fn format_overall_summary(sessions: &[WorkSession]) -> String {
    let total_minutes = total_work_secs(sessions) / 60;

    match sessions {
        [] => "No work sessions detected".to_string(),
        [session] => format!(
            "Worked for {total_minutes} minutes on {} ({})",
            session.primary_title, session.primary_project
        ),
        _ => {
            let mut projects: Vec<&str> = Vec::new();
            for session in sessions {
                if !projects.contains(&session.primary_project.as_str()) {
                    projects.push(&session.primary_project);
                }
            }

            let count = sessions.len();
            if let [project] = projects.as_slice() {
                format!("Worked for {total_minutes} minutes across {count} sessions on {project}")
            } else {
                format!(
                    "Worked for {total_minutes} minutes across {count} sessions on {} different projects",
                    projects.len()
                )
            }
        }
    }
}
