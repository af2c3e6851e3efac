//! Session segmentation.
//!
//! Splits activity into contiguous sessions: records are sorted by start time
//! and a new session begins whenever the idle gap between the end of the
//! previous record and the start of the next exceeds the configured threshold.

use chrono::TimeDelta;

use crate::analysis::AnalysisConfig;
use crate::record::ActivityRecord;

/// Group records into chronologically ordered sessions.
///
/// Input order does not matter. Overlapping records (negative gap) always
/// continue the current session. Every returned session is non-empty.
pub fn segment_records(
    mut records: Vec<ActivityRecord>,
    config: &AnalysisConfig,
) -> Vec<Vec<ActivityRecord>> {
    records.sort_by_key(|r| r.start);

    // Gaps beyond what chrono can represent never split a session
    let max_gap = TimeDelta::try_minutes(config.max_gap_minutes).unwrap_or(TimeDelta::MAX);
    let mut sessions: Vec<Vec<ActivityRecord>> = Vec::new();
    let mut current: Vec<ActivityRecord> = Vec::new();

    for record in records {
        let continues = current
            .last()
            .is_none_or(|last| record.start - last.end <= max_gap);

        if !continues {
            sessions.push(std::mem::take(&mut current));
        }
        current.push(record);
    }

    if !current.is_empty() {
        sessions.push(current);
    }

    tracing::debug!(session_count = sessions.len(), "segmented activity records");
    sessions
}
