//! Text output formatter for human-readable display
//!
//! This module provides:
//! - Per-package upgrade lines with magnitude indication
//! - Skipped package display with reasons (verbose)
//! - Validation verdict with implicated packages
//! - Terminal status line per session state

use crate::output::{OutputFormatter, Verbosity};
use crate::planner::PackageOutcome;
use crate::policy::{SkipReason, UpgradeMagnitude};
use crate::session::{SessionReport, SessionState};
use colored::Colorize;
use std::io::Write;

/// Text formatter for human-readable output
pub struct TextFormatter {
    verbosity: Verbosity,
    color: bool,
}

impl TextFormatter {
    /// Create a new text formatter
    pub fn new(verbosity: Verbosity, color: bool) -> Self {
        Self { verbosity, color }
    }

    /// Label for the kind of rewrite
    fn magnitude_label(&self, magnitude: Option<UpgradeMagnitude>) -> String {
        let plain = match magnitude {
            Some(m) => m.label(),
            None => "normalize",
        };
        if !self.color {
            return plain.to_string();
        }
        match magnitude {
            Some(UpgradeMagnitude::Major) => plain.red().bold().to_string(),
            Some(UpgradeMagnitude::Minor) => plain.yellow().to_string(),
            Some(UpgradeMagnitude::Patch) => plain.green().to_string(),
            None => plain.dimmed().to_string(),
        }
    }

    /// Whether a skip outcome should be shown at the current verbosity
    fn shows_skip(&self, reason: &SkipReason) -> bool {
        match self.verbosity {
            Verbosity::Quiet => false,
            // Failures always surface; routine skips only when verbose
            Verbosity::Normal => matches!(
                reason,
                SkipReason::LookupFailed(_) | SkipReason::RewriteFailed(_)
            ),
            Verbosity::Verbose => true,
        }
    }

    fn write_outcomes(&self, report: &SessionReport, out: &mut dyn Write) -> std::io::Result<()> {
        for outcome in &report.plan.outcomes {
            match outcome {
                PackageOutcome::Upgrade {
                    package,
                    is_dev,
                    old_constraint,
                    new_constraint,
                    magnitude,
                    released_at,
                } => {
                    let dev_marker = if *is_dev { " (dev)" } else { "" };
                    let mut line = format!(
                        "  {}{}  {} → {}  [{}]",
                        package,
                        dev_marker,
                        old_constraint,
                        new_constraint,
                        self.magnitude_label(*magnitude)
                    );
                    if self.verbosity == Verbosity::Verbose {
                        if let Some(date) = released_at {
                            line.push_str(&format!("  released {}", date.format("%Y-%m-%d")));
                        }
                    }
                    writeln!(out, "{}", line)?;
                }
                PackageOutcome::Skip {
                    package, reason, ..
                } => {
                    if self.shows_skip(reason) {
                        writeln!(out, "  {}  skipped ({})", package, reason)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn write_validation(&self, report: &SessionReport, out: &mut dyn Write) -> std::io::Result<()> {
        let Some(validation) = &report.validation else {
            return Ok(());
        };

        if let Some(reason) = &validation.skipped_reason {
            if self.verbosity != Verbosity::Quiet {
                writeln!(out, "Compatibility check skipped: {}", reason)?;
            }
            return Ok(());
        }

        if validation.accepted {
            if self.verbosity == Verbosity::Verbose {
                writeln!(out, "Compatibility check passed.")?;
            }
            return Ok(());
        }

        let headline = "Compatibility check failed.";
        if self.color {
            writeln!(out, "{}", headline.red().bold())?;
        } else {
            writeln!(out, "{}", headline)?;
        }

        if validation.implicated_packages.is_empty() {
            writeln!(
                out,
                "The conflict involves sub-dependencies rather than an updated package."
            )?;
        } else {
            writeln!(
                out,
                "Implicated packages: {}",
                validation.implicated_packages.join(", ")
            )?;
        }
        if let Some(diagnostics) = &validation.diagnostic_text {
            if !diagnostics.trim().is_empty() {
                writeln!(out)?;
                writeln!(out, "{}", diagnostics.trim_end())?;
            }
        }
        Ok(())
    }

    fn write_status(&self, report: &SessionReport, out: &mut dyn Write) -> std::io::Result<()> {
        let count = report.plan.upgrade_count();
        let line = match report.state {
            SessionState::NoChanges => "No constraint updates required.".to_string(),
            SessionState::DryRunComplete => format!(
                "(dry-run) {} constraint update(s) available; composer.json not modified.",
                count
            ),
            SessionState::Committed => {
                format!("Committed {} constraint update(s) to composer.json.", count)
            }
            SessionState::Aborted => {
                "Aborted; composer.json left untouched.".to_string()
            }
        };

        if !self.color {
            return writeln!(out, "{}", line);
        }
        match report.state {
            SessionState::Committed => writeln!(out, "{}", line.green()),
            SessionState::Aborted => writeln!(out, "{}", line.red()),
            SessionState::DryRunComplete => writeln!(out, "{}", line.cyan()),
            SessionState::NoChanges => writeln!(out, "{}", line),
        }
    }
}

impl OutputFormatter for TextFormatter {
    fn format(&self, report: &SessionReport, out: &mut dyn Write) -> std::io::Result<()> {
        if self.verbosity != Verbosity::Quiet {
            self.write_outcomes(report, out)?;
        }
        self.write_validation(report, out)?;
        self.write_status(report, out)
    }
}
