//! Worklog comments for matched tickets.
//!
//! Only renders the text; posting it to the tracker is the caller's job.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::matcher::MatchResult;
use crate::summary::WorkSession;
use crate::types::{Confidence, TicketKey};

/// A comment ready to post on a ticket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorklogDraft {
    pub ticket_key: TicketKey,
    pub confidence: Confidence,
    pub time_spent_secs: i64,
    pub summary: String,
    pub body: String,
}

impl WorklogDraft {
    pub fn for_match(
        matched: &MatchResult,
        session: &WorkSession,
        completed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            ticket_key: matched.ticket_key.clone(),
            confidence: matched.confidence,
            time_spent_secs: session.total_duration_secs,
            summary: session.work_summary.clone(),
            body: render_comment(&session.work_summary, session.total_duration_secs, completed_at),
        }
    }
}

/// Formats seconds as "Xh Ym", or "Ym" under an hour.
/// Negative values render as "0m".
pub fn format_time_spent(secs: i64) -> String {
    let total_minutes = secs.max(0) / 60;
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;

    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

/// Render the comment body posted to a ticket.
pub fn render_comment(summary: &str, time_spent_secs: i64, completed_at: DateTime<Utc>) -> String {
    format!(
        "Work completed: {summary}\n\n**Time spent:** {}\n**Completed at:** {}\n\n{summary}",
        format_time_spent(time_spent_secs),
        completed_at.format("%Y-%m-%d %H:%M"),
    )
}
