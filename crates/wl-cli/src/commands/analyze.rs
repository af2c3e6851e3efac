//! Analyze command: full pass from records to matched tickets.

use std::io::Write;

use anyhow::Result;
use chrono::Utc;
use wl_core::{AnalysisReport, analyze, filter_by_assignee, filter_by_status};

use super::sessions::{write_overview, write_session, write_warnings};
use super::util::{format_duration, load_records, load_tickets};
use crate::Config;
use crate::cli::AnalyzeArgs;

pub fn run<W: Write>(writer: &mut W, args: &AnalyzeArgs, config: &Config) -> Result<()> {
    let batch = load_records(&args.input.records, args.input.since.as_deref())?;

    let mut tickets = match &args.tickets {
        Some(path) => filter_by_status(load_tickets(path)?, &config.ticket_statuses),
        None => Vec::new(),
    };
    if let Some(assignee) = &args.assignee {
        tickets = filter_by_assignee(tickets, assignee);
    }
    tracing::debug!(candidates = tickets.len(), "candidate tickets after filtering");

    let mut matching = config.matching();
    if let Some(min_confidence) = args.min_confidence {
        matching.min_confidence = min_confidence;
    }

    let analysis = super::analysis_config(&args.input, config)?;
    let report = analyze(batch, &tickets, &analysis, &matching, Utc::now());

    if args.input.json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&report)?)?;
    } else {
        render(writer, &report)?;
    }

    Ok(())
}

/// Human-readable analysis report.
pub fn render<W: Write>(writer: &mut W, report: &AnalysisReport) -> Result<()> {
    writeln!(writer, "ANALYSIS")?;
    writeln!(writer, "────────")?;
    write_overview(writer, &report.summary, report.primary_focus.as_ref())?;

    if report.has_activity() {
        writeln!(writer)?;
        writeln!(writer, "SESSIONS")?;
        writeln!(writer, "────────")?;
        for (outcome, session) in report.outcomes.iter().zip(&report.sessions) {
            write_session(writer, outcome.session, session)?;
            match &outcome.matched {
                Some(m) => writeln!(
                    writer,
                    "    Match: {} ({}) {}",
                    m.ticket_key, m.confidence, m.ticket_summary
                )?,
                None => writeln!(writer, "    Match: none")?,
            }
        }

        writeln!(writer)?;
        writeln!(
            writer,
            "Matched {} of {} sessions.",
            report.matched_count(),
            report.session_count
        )?;
    }

    if !report.ticket_updates.is_empty() {
        writeln!(writer)?;
        writeln!(writer, "TICKET REFERENCES")?;
        writeln!(writer, "─────────────────")?;
        for update in &report.ticket_updates {
            writeln!(
                writer,
                "{:<10} {:<7} {}",
                update.ticket,
                format_duration(update.time_spent_secs),
                update.summary
            )?;
        }
    }

    write_warnings(writer, &report.warnings)
}
