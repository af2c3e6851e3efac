//! Sessions command: segment records and list the resulting work sessions.

use std::io::Write;

use anyhow::Result;
use serde::Serialize;
use wl_core::analysis::{format_overall_summary, primary_focus};
use wl_core::{PrimaryFocus, RecordWarning, WorkSession, build_sessions};

use super::util::{format_duration, load_records};
use crate::Config;
use crate::cli::RecordArgs;

#[derive(Serialize)]
struct SessionsOutput<'a> {
    session_count: usize,
    summary: String,
    primary_focus: Option<PrimaryFocus>,
    sessions: &'a [WorkSession],
    warnings: &'a [RecordWarning],
}

pub fn run<W: Write>(writer: &mut W, args: &RecordArgs, config: &Config) -> Result<()> {
    let batch = load_records(&args.records, args.since.as_deref())?;
    let analysis = super::analysis_config(args, config)?;
    let sessions = build_sessions(batch.records, &analysis);

    if args.json {
        let output = SessionsOutput {
            session_count: sessions.len(),
            summary: format_overall_summary(&sessions),
            primary_focus: primary_focus(&sessions),
            sessions: &sessions,
            warnings: &batch.warnings,
        };
        writeln!(writer, "{}", serde_json::to_string_pretty(&output)?)?;
    } else {
        render(writer, &sessions, &batch.warnings)?;
    }

    Ok(())
}

/// Human-readable session listing.
pub fn render<W: Write>(
    writer: &mut W,
    sessions: &[WorkSession],
    warnings: &[RecordWarning],
) -> Result<()> {
    writeln!(writer, "WORK SESSIONS")?;
    writeln!(writer, "─────────────")?;
    write_overview(
        writer,
        &format_overall_summary(sessions),
        primary_focus(sessions).as_ref(),
    )?;

    if !sessions.is_empty() {
        writeln!(writer)?;
    }
    for (index, session) in sessions.iter().enumerate() {
        write_session(writer, index, session)?;
    }

    write_warnings(writer, warnings)
}

/// Summary line followed by the primary focus, if any.
pub(super) fn write_overview<W: Write>(
    writer: &mut W,
    summary: &str,
    focus: Option<&PrimaryFocus>,
) -> Result<()> {
    writeln!(writer, "{summary}")?;
    if let Some(focus) = focus {
        writeln!(
            writer,
            "Primary focus: {} ({} of {}, {:.0}%)",
            focus.project,
            format_duration(focus.time_spent_secs),
            format_duration(focus.total_time_secs),
            focus.share * 100.0,
        )?;
    }
    Ok(())
}

/// One session entry: header line, then the summary indented.
pub(super) fn write_session<W: Write>(
    writer: &mut W,
    index: usize,
    session: &WorkSession,
) -> Result<()> {
    writeln!(
        writer,
        "[{index}] {} - {}  {:<7} {}",
        session.start_time.format("%Y-%m-%d %H:%M"),
        session.end_time.format("%H:%M"),
        format_duration(session.total_duration_secs),
        session.primary_project,
    )?;
    writeln!(writer, "    {}", session.work_summary)?;
    if let Some(reference) = &session.ticket_reference {
        writeln!(writer, "    Ticket: {reference}")?;
    }
    Ok(())
}

pub(super) fn write_warnings<W: Write>(writer: &mut W, warnings: &[RecordWarning]) -> Result<()> {
    if warnings.is_empty() {
        return Ok(());
    }

    writeln!(writer)?;
    writeln!(writer, "SKIPPED RECORDS")?;
    writeln!(writer, "───────────────")?;
    for warning in warnings {
        writeln!(writer, "#{}: {}", warning.index, warning.message)?;
    }
    Ok(())
}
