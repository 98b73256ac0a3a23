//! JSON output formatter for machine processing

use crate::domain::{ProposedChange, ValidationOutcome};
use crate::output::OutputFormatter;
use crate::planner::PackageOutcome;
use crate::session::{SessionReport, SessionState};
use serde::Serialize;
use std::io::Write;

/// JSON formatter emitting the full session report
pub struct JsonFormatter;

/// Serialized shape of a session report
#[derive(Serialize)]
struct JsonReport<'a> {
    project: String,
    dry_run: bool,
    state: SessionState,
    outcomes: &'a [PackageOutcome],
    changes: &'a [ProposedChange],
    validation: Option<&'a ValidationOutcome>,
}

impl OutputFormatter for JsonFormatter {
    fn format(&self, report: &SessionReport, out: &mut dyn Write) -> std::io::Result<()> {
        let json = JsonReport {
            project: report.project_dir.display().to_string(),
            dry_run: report.dry_run,
            state: report.state,
            outcomes: &report.plan.outcomes,
            changes: &report.plan.changes,
            validation: report.validation.as_ref(),
        };
        serde_json::to_writer_pretty(&mut *out, &json)?;
        writeln!(out)
    }
}
