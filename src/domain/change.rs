//! Session-scoped result types: proposed changes and validation outcomes

use serde::{Deserialize, Serialize};
use std::fmt;

/// A constraint rewrite proposed by the planner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposedChange {
    /// Package name
    pub package: String,
    /// Constraint text as currently declared
    pub old_constraint: String,
    /// Constraint text to write
    pub new_constraint: String,
}

impl ProposedChange {
    /// Creates a new proposed change
    pub fn new(
        package: impl Into<String>,
        old_constraint: impl Into<String>,
        new_constraint: impl Into<String>,
    ) -> Self {
        Self {
            package: package.into(),
            old_constraint: old_constraint.into(),
            new_constraint: new_constraint.into(),
        }
    }
}

impl fmt::Display for ProposedChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} → {}",
            self.package, self.old_constraint, self.new_constraint
        )
    }
}

/// Result of compatibility validation over a proposed change set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    /// Whether the proposed set resolved cleanly (or validation was skipped)
    pub accepted: bool,
    /// Proposed packages whose names appear in the resolver diagnostics,
    /// in proposed-change order. Empty when the conflict lies in
    /// sub-dependencies only.
    pub implicated_packages: Vec<String>,
    /// Raw resolver diagnostics on rejection
    pub diagnostic_text: Option<String>,
    /// Set when validation could not run and was skipped (resolver
    /// capability unavailable)
    pub skipped_reason: Option<String>,
}

impl ValidationOutcome {
    /// The resolver accepted the trial requirement set
    pub fn accepted() -> Self {
        Self {
            accepted: true,
            implicated_packages: Vec::new(),
            diagnostic_text: None,
            skipped_reason: None,
        }
    }

    /// Validation was skipped; treated as acceptance
    pub fn skipped(reason: impl Into<String>) -> Self {
        Self {
            accepted: true,
            implicated_packages: Vec::new(),
            diagnostic_text: None,
            skipped_reason: Some(reason.into()),
        }
    }

    /// The resolver rejected the trial requirement set
    pub fn rejected(implicated_packages: Vec<String>, diagnostic_text: impl Into<String>) -> Self {
        Self {
            accepted: false,
            implicated_packages,
            diagnostic_text: Some(diagnostic_text.into()),
            skipped_reason: None,
        }
    }

    /// Returns true if validation ran and was skipped
    pub fn was_skipped(&self) -> bool {
        self.skipped_reason.is_some()
    }
}
