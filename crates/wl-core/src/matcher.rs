//! Ticket matching.
//!
//! Scores every candidate ticket against a summarized session and keeps the
//! single best one above a threshold. The score is a sum of independent
//! signals:
//!
//! | Signal       | Weight | Rule                                                   |
//! |--------------|--------|--------------------------------------------------------|
//! | keyword hit  | 0.30   | per distinct session keyword found in the ticket text  |
//! | work type    | 0.20   | session work type appears in the ticket's issue type   |
//! | project      | 0.25   | ticket project is one of the session's projects        |
//! | priority     | 0.10   | session priority class appears in the ticket priority  |
//!
//! The sum is kept in whole hundredths and clamped to 1.0 only at the end,
//! so keyword hits alone can saturate it. Candidates are never modified; which keywords hit is part of
//! the returned [`CandidateScore`].

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::summary::WorkSession;
use crate::ticket::TrackedItem;
use crate::types::{Confidence, TicketKey};

/// Signal weights in hundredths. Totals are summed as integers so that
/// 0.20 + 0.10 is exactly 0.30.
const KEYWORD_WEIGHT: u32 = 30;
const WORK_TYPE_WEIGHT: u32 = 20;
const PROJECT_WEIGHT: u32 = 25;
const PRIORITY_WEIGHT: u32 = 10;
const FULL_SCORE: u32 = 100;

/// Keywords shorter than this many characters are ignored.
const MIN_KEYWORD_CHARS: usize = 3;

const STOP_WORDS: &[&str] = &[
    "the", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
];

/// Work types in priority order. The first type with any keyword present wins.
const WORK_TYPES: &[(&str, &[&str])] = &[
    ("bug", &["bug", "fix", "issue", "error", "crash", "broken", "debug"]),
    ("feature", &["feature", "implement", "develop", "build", "create", "add"]),
    ("test", &["test", "testing", "qa", "quality", "verify", "validate"]),
    ("documentation", &["doc", "document", "write", "update", "create"]),
    ("review", &["review", "code review", "pr", "pull request", "feedback"]),
    ("meeting", &["meeting", "call", "discussion", "planning", "sync"]),
    ("research", &["research", "investigate", "explore", "analyze", "study"]),
];

/// Priority classes in priority order.
const PRIORITIES: &[(&str, &[&str])] = &[
    ("high", &["urgent", "critical", "blocker", "high priority", "asap"]),
    ("medium", &["normal", "medium", "standard"]),
    ("low", &["low priority", "nice to have", "enhancement"]),
];

static WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\w+").expect("word pattern is valid"));

/// Configuration for ticket matching.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchConfig {
    /// A best score must be strictly above this to count as a match.
    /// Default: 0.3.
    pub min_confidence: f64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.3,
        }
    }
}

/// The chosen ticket for one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Index of the session within the report's session list.
    pub session: usize,
    pub ticket_key: TicketKey,
    pub confidence: Confidence,
    pub matched_keywords: Vec<String>,
    pub ticket_summary: String,
    pub ticket_status: String,
}

/// Score of one candidate, with the evidence behind it.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateScore {
    pub confidence: Confidence,
    pub matched_keywords: Vec<String>,
}

/// Everything about a session that scoring needs, computed once per session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSignals {
    /// Distinct keywords in first-seen order.
    pub keywords: Vec<String>,
    pub work_type: Option<&'static str>,
    pub priority: Option<&'static str>,
    /// Lower-cased related project names.
    pub projects: Vec<String>,
}

impl SessionSignals {
    pub fn from_session(session: &WorkSession) -> Self {
        let text = work_text(session);

        let mut keywords: Vec<String> = Vec::new();
        for keyword in extract_keywords(&text) {
            if !keywords.contains(&keyword) {
                keywords.push(keyword);
            }
        }

        Self {
            keywords,
            work_type: classify(&text, WORK_TYPES),
            priority: classify(&text, PRIORITIES),
            projects: session
                .related_projects
                .iter()
                .map(|p| p.to_lowercase())
                .collect(),
        }
    }
}

/// All session text used for matching: primary title, summary, then every
/// record's title and notes. Lower-cased.
pub fn work_text(session: &WorkSession) -> String {
    let mut parts = vec![session.primary_title.as_str(), session.work_summary.as_str()];
    for record in &session.records {
        parts.push(&record.title);
        parts.push(&record.notes);
    }
    parts.join(" ").to_lowercase()
}

/// Split text into keywords, dropping stop words and very short tokens.
///
/// Duplicates are kept.
pub fn extract_keywords(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    WORD_RE
        .find_iter(&lower)
        .map(|m| m.as_str())
        .filter(|w| w.chars().count() >= MIN_KEYWORD_CHARS && !STOP_WORDS.contains(w))
        .map(String::from)
        .collect()
}

/// First label in `table` whose keywords occur anywhere in `text`.
fn classify(text: &str, table: &[(&'static str, &[&str])]) -> Option<&'static str> {
    table
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| text.contains(k)))
        .map(|(label, _)| *label)
}

/// Score a single candidate.
///
/// Signals are summed in the order of the module table, then clamped.
pub fn score_candidate(signals: &SessionSignals, candidate: &TrackedItem) -> CandidateScore {
    let mut score: u32 = 0;
    let ticket_text = candidate.match_text();

    let matched_keywords: Vec<String> = signals
        .keywords
        .iter()
        .filter(|k| ticket_text.contains(k.as_str()))
        .cloned()
        .collect();
    for _ in &matched_keywords {
        score += KEYWORD_WEIGHT;
    }

    if signals
        .work_type
        .is_some_and(|t| candidate.category.to_lowercase().contains(t))
    {
        score += WORK_TYPE_WEIGHT;
    }

    let project = candidate.project.to_lowercase();
    if signals.projects.contains(&project) {
        score += PROJECT_WEIGHT;
    }

    if signals
        .priority
        .is_some_and(|p| candidate.priority.to_lowercase().contains(p))
    {
        score += PRIORITY_WEIGHT;
    }

    CandidateScore {
        confidence: Confidence::clamped(f64::from(score.min(FULL_SCORE)) / f64::from(FULL_SCORE)),
        matched_keywords,
    }
}

/// Pick the best candidate for a session.
///
/// The winner has the strictly greatest score; on ties the earlier candidate
/// stays. Returns `None` when no score exceeds `min_confidence` or there are
/// no candidates.
pub fn match_session(
    session_index: usize,
    session: &WorkSession,
    candidates: &[TrackedItem],
    config: &MatchConfig,
) -> Option<MatchResult> {
    let signals = SessionSignals::from_session(session);
    let mut best: Option<(&TrackedItem, CandidateScore)> = None;

    for candidate in candidates {
        let scored = score_candidate(&signals, candidate);
        tracing::trace!(
            session = session_index,
            ticket = %candidate.key,
            confidence = scored.confidence.value(),
            "scored candidate"
        );

        let value = scored.confidence.value();
        let best_value = best
            .as_ref()
            .map_or(0.0, |(_, s)| s.confidence.value());
        if value > best_value && value > config.min_confidence {
            best = Some((candidate, scored));
        }
    }

    let (ticket, scored) = best?;
    tracing::debug!(
        session = session_index,
        ticket = %ticket.key,
        confidence = scored.confidence.value(),
        "matched session to ticket"
    );

    Some(MatchResult {
        session: session_index,
        ticket_key: ticket.key.clone(),
        confidence: scored.confidence,
        matched_keywords: scored.matched_keywords,
        ticket_summary: ticket.summary.clone(),
        ticket_status: ticket.status.clone(),
    })
}
