//! Dependency resolver capability
//!
//! The resolver is an external collaborator: it holds the root project's
//! requirement set and can report whether that set resolves, without
//! installing anything. The validator swaps trial requirements in and out
//! around a single dry-run simulation.

mod composer_cli;

pub use composer_cli::ComposerCli;

use crate::error::ResolverError;

/// A root-project requirement as the resolver sees it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    /// Package name
    pub name: String,
    /// Constraint text handed to the resolver
    pub constraint: String,
    /// Constraint text used in user-facing diagnostics; for trial
    /// requirements this is the proposed constraint, not the widened floor
    pub display: String,
    /// Whether the requirement lives in the dev section
    pub is_dev: bool,
}

impl Requirement {
    /// A requirement as declared in the manifest
    pub fn declared(name: impl Into<String>, constraint: impl Into<String>, is_dev: bool) -> Self {
        let constraint = constraint.into();
        Self {
            name: name.into(),
            display: constraint.clone(),
            constraint,
            is_dev,
        }
    }

    /// A trial requirement: a widened floor tagged with the proposed
    /// constraint text it stands in for
    pub fn trial(
        name: impl Into<String>,
        floor: impl Into<String>,
        display: impl Into<String>,
        is_dev: bool,
    ) -> Self {
        Self {
            name: name.into(),
            constraint: floor.into(),
            display: display.into(),
            is_dev,
        }
    }
}

/// Result of probing whether the resolver can run at all
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolverCapability {
    /// The resolver and its local package index are usable
    Available,
    /// The resolver cannot run here (missing executable, incomplete
    /// project); validation is skipped
    Unavailable(String),
    /// Probing itself failed; validation is skipped
    Error(String),
}

/// Exit status and diagnostics of one dry-run simulation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationStatus {
    /// Process exit code (zero means the requirement set resolves)
    pub code: i32,
    /// Captured resolver output
    pub diagnostics: String,
}

impl SimulationStatus {
    /// Returns true if the simulation resolved cleanly
    pub fn success(&self) -> bool {
        self.code == 0
    }
}

/// External dependency resolver, consumed by the compatibility validator
pub trait DependencyResolver {
    /// Check whether a simulation could run at all
    fn probe(&self) -> ResolverCapability;

    /// Snapshot of the root project's current requirement set
    fn root_requirements(&self) -> Vec<Requirement>;

    /// Replace the root project's requirement set
    fn install_requirements(&mut self, requirements: Vec<Requirement>);

    /// Run one dry-run update against the currently installed requirement
    /// set; nothing is installed for real
    fn simulate_update(&mut self) -> Result<SimulationStatus, ResolverError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declared_requirement_displays_itself() {
        let req = Requirement::declared("monolog/monolog", "^2.0", false);
        assert_eq!(req.constraint, "^2.0");
        assert_eq!(req.display, "^2.0");
        assert!(!req.is_dev);
    }

    #[test]
    fn test_trial_requirement_keeps_proposed_text() {
        let req = Requirement::trial("monolog/monolog", ">=3.1.0", "^3.1.0", false);
        assert_eq!(req.constraint, ">=3.1.0");
        assert_eq!(req.display, "^3.1.0");
    }

    #[test]
    fn test_simulation_status_success() {
        assert!(SimulationStatus {
            code: 0,
            diagnostics: String::new()
        }
        .success());
        assert!(!SimulationStatus {
            code: 2,
            diagnostics: "conflict".to_string()
        }
        .success());
    }
}
