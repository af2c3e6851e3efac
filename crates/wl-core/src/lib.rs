//! Core domain logic for worklink.
//!
//! This crate contains the fundamental types and logic for:
//! - Records: decoding activity records from the time-tracking source
//! - Segmentation: grouping records into sessions by idle gaps
//! - Summaries: dominant project and title, work summary, ticket references
//! - Matching: scoring tickets against a session and picking the best one
//! - Worklogs: rendering comments for matched tickets

pub mod analysis;
pub mod matcher;
pub mod record;
mod segment;
pub mod summary;
pub mod ticket;
pub mod types;
pub mod worklog;

pub use analysis::{
    ActivityStatus, AnalysisConfig, AnalysisReport, PrimaryFocus, SessionOutcome, TicketUpdate,
    analyze, build_sessions,
};
pub use matcher::{MatchConfig, MatchResult, match_session};
pub use record::{
    ActivityRecord, PayloadError, RecordBatch, RecordError, RecordWarning, decode_records,
};
pub use segment::segment_records;
pub use summary::{WorkSession, summarize_session};
pub use ticket::{TrackedItem, decode_tickets, filter_by_assignee, filter_by_status};
pub use types::{Confidence, TicketKey, ValidationError};
pub use worklog::WorklogDraft;
