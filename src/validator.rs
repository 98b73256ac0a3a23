//! Compatibility validation of a proposed change set
//!
//! Before anything is persisted, the proposed constraints are checked for
//! mutual satisfiability by the external resolver in dry-run mode. The
//! check is best-effort: when the resolver capability is unavailable the
//! session proceeds as if validation had passed. The resolver's live
//! requirement set is mutated only inside a guard that restores the
//! pre-trial snapshot on every exit path.

use crate::domain::{Constraint, ProposedChange, ValidationOutcome};
use crate::error::ResolverError;
use crate::resolver::{DependencyResolver, Requirement, ResolverCapability, SimulationStatus};

/// Validate a proposed change set against a base requirement state.
///
/// Steps: fast-accept an empty set; probe the resolver capability and
/// silently accept when it cannot run; snapshot the root requirements;
/// install trial requirements (a `>=` floor per proposed package, tagged
/// with the proposed text); simulate; restore the snapshot; interpret the
/// exit status.
pub fn validate(
    resolver: &mut dyn DependencyResolver,
    changes: &[ProposedChange],
) -> ValidationOutcome {
    if changes.is_empty() {
        return ValidationOutcome::accepted();
    }

    match resolver.probe() {
        ResolverCapability::Available => {}
        ResolverCapability::Unavailable(reason) => {
            return ValidationOutcome::skipped(reason);
        }
        ResolverCapability::Error(reason) => {
            return ValidationOutcome::skipped(format!("resolver probe failed: {}", reason));
        }
    }

    let snapshot = resolver.root_requirements();
    let trial = trial_requirements(&snapshot, changes);

    let result = {
        let mut state = TrialState::install(resolver, snapshot, trial);
        state.simulate()
        // state drops here: the snapshot is reinstalled no matter how the
        // simulation went, including on unwind
    };

    match result {
        Ok(status) if status.success() => ValidationOutcome::accepted(),
        Ok(status) => rejection(changes, &status.diagnostics),
        Err(e) => rejection(changes, &e.to_string()),
    }
}

/// The trial requirement set: the snapshot with each proposed package's
/// requirement replaced by a floor of `>= <bare proposed version>`, tagged
/// with the proposed constraint text for diagnostics
fn trial_requirements(snapshot: &[Requirement], changes: &[ProposedChange]) -> Vec<Requirement> {
    let mut trial = snapshot.to_vec();
    for change in changes {
        let floor = format!(">={}", bare_version(&change.new_constraint));
        match trial.iter_mut().find(|r| r.name == change.package) {
            Some(req) => {
                req.constraint = floor;
                req.display = change.new_constraint.clone();
            }
            None => {
                trial.push(Requirement::trial(
                    &change.package,
                    floor,
                    &change.new_constraint,
                    false,
                ));
            }
        }
    }
    trial
}

/// The bare version inside a constraint, with operators stripped
fn bare_version(constraint_text: &str) -> String {
    Constraint::parse(constraint_text)
        .and_then(|c| c.base_version())
        .map(|v| v.to_string())
        .unwrap_or_else(|| {
            constraint_text
                .trim_start_matches(['^', '~', '>', '<', '=', 'v', ' '])
                .to_string()
        })
}

/// Build the rejection outcome: proposed packages whose names appear in the
/// diagnostics, in proposed-change order.
///
/// Attribution by substring match is approximate: free-text diagnostics
/// can both name packages that are not at fault and omit the one that is.
/// An empty list means the conflict lies in sub-dependencies.
fn rejection(changes: &[ProposedChange], diagnostics: &str) -> ValidationOutcome {
    let mut implicated: Vec<String> = Vec::new();
    for change in changes {
        if diagnostics.contains(&change.package) && !implicated.contains(&change.package) {
            implicated.push(change.package.clone());
        }
    }
    ValidationOutcome::rejected(implicated, diagnostics)
}

/// Scoped trial installation. Holds the pre-trial snapshot and reinstalls
/// it when dropped.
struct TrialState<'a> {
    resolver: &'a mut dyn DependencyResolver,
    snapshot: Option<Vec<Requirement>>,
}

impl<'a> TrialState<'a> {
    fn install(
        resolver: &'a mut dyn DependencyResolver,
        snapshot: Vec<Requirement>,
        trial: Vec<Requirement>,
    ) -> Self {
        resolver.install_requirements(trial);
        Self {
            resolver,
            snapshot: Some(snapshot),
        }
    }

    fn simulate(&mut self) -> Result<SimulationStatus, ResolverError> {
        self.resolver.simulate_update()
    }
}

impl Drop for TrialState<'_> {
    fn drop(&mut self) {
        if let Some(snapshot) = self.snapshot.take() {
            self.resolver.install_requirements(snapshot);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Scripted resolver for validator tests
    struct MockResolver {
        capability: ResolverCapability,
        requirements: Vec<Requirement>,
        /// Requirement set observed at simulation time
        seen_at_simulate: Option<Vec<Requirement>>,
        outcome: MockOutcome,
        simulate_calls: usize,
    }

    enum MockOutcome {
        Status(i32, &'static str),
        SpawnError,
    }

    impl MockResolver {
        fn new(outcome: MockOutcome) -> Self {
            Self {
                capability: ResolverCapability::Available,
                requirements: vec![
                    Requirement::declared("foo/bar", "^1.0", false),
                    Requirement::declared("baz/qux", "^2.0", false),
                ],
                seen_at_simulate: None,
                outcome,
                simulate_calls: 0,
            }
        }

        fn with_capability(mut self, capability: ResolverCapability) -> Self {
            self.capability = capability;
            self
        }
    }

    impl DependencyResolver for MockResolver {
        fn probe(&self) -> ResolverCapability {
            self.capability.clone()
        }

        fn root_requirements(&self) -> Vec<Requirement> {
            self.requirements.clone()
        }

        fn install_requirements(&mut self, requirements: Vec<Requirement>) {
            self.requirements = requirements;
        }

        fn simulate_update(&mut self) -> Result<SimulationStatus, ResolverError> {
            self.simulate_calls += 1;
            self.seen_at_simulate = Some(self.requirements.clone());
            match self.outcome {
                MockOutcome::Status(code, diagnostics) => Ok(SimulationStatus {
                    code,
                    diagnostics: diagnostics.to_string(),
                }),
                MockOutcome::SpawnError => Err(ResolverError::Spawn {
                    command: "composer update --dry-run".to_string(),
                    source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
                }),
            }
        }
    }

    fn change(package: &str, old: &str, new: &str) -> ProposedChange {
        ProposedChange::new(package, old, new)
    }

    #[test]
    fn test_empty_change_set_fast_path() {
        let mut resolver = MockResolver::new(MockOutcome::Status(1, "should not run"));
        let outcome = validate(&mut resolver, &[]);
        assert!(outcome.accepted);
        assert_eq!(resolver.simulate_calls, 0);
    }

    #[test]
    fn test_unavailable_capability_skips_validation() {
        let mut resolver = MockResolver::new(MockOutcome::Status(1, "should not run"))
            .with_capability(ResolverCapability::Unavailable("no composer".to_string()));
        let outcome = validate(&mut resolver, &[change("foo/bar", "^1.0", "^1.5.0")]);
        assert!(outcome.accepted);
        assert!(outcome.was_skipped());
        assert_eq!(resolver.simulate_calls, 0);
    }

    #[test]
    fn test_probe_error_skips_validation() {
        let mut resolver = MockResolver::new(MockOutcome::Status(1, "should not run"))
            .with_capability(ResolverCapability::Error("weird".to_string()));
        let outcome = validate(&mut resolver, &[change("foo/bar", "^1.0", "^1.5.0")]);
        assert!(outcome.accepted);
        assert!(outcome.was_skipped());
    }

    #[test]
    fn test_success_accepts_and_restores() {
        let mut resolver = MockResolver::new(MockOutcome::Status(0, ""));
        let snapshot = resolver.root_requirements();

        let outcome = validate(&mut resolver, &[change("foo/bar", "^1.0", "^1.5.0")]);
        assert!(outcome.accepted);
        assert!(!outcome.was_skipped());

        // The simulation ran against the trial floor, not the declared text
        let seen = resolver.seen_at_simulate.as_ref().unwrap();
        let foo = seen.iter().find(|r| r.name == "foo/bar").unwrap();
        assert_eq!(foo.constraint, ">=1.5.0");
        assert_eq!(foo.display, "^1.5.0");
        // Untouched packages keep their declared requirement
        let baz = seen.iter().find(|r| r.name == "baz/qux").unwrap();
        assert_eq!(baz.constraint, "^2.0");

        // Restored exactly afterwards
        assert_eq!(resolver.root_requirements(), snapshot);
    }

    #[test]
    fn test_rejection_implicates_named_packages() {
        let mut resolver = MockResolver::new(MockOutcome::Status(
            2,
            "Your requirements could not be resolved: foo/bar v1.5.0 conflicts with locked baz",
        ));
        let snapshot = resolver.root_requirements();

        let outcome = validate(
            &mut resolver,
            &[
                change("foo/bar", "^1.0", "^1.5.0"),
                change("other/pkg", "^3.0", "^3.2.0"),
            ],
        );
        assert!(!outcome.accepted);
        assert_eq!(outcome.implicated_packages, vec!["foo/bar"]);
        assert!(outcome.diagnostic_text.unwrap().contains("could not be resolved"));
        assert_eq!(resolver.root_requirements(), snapshot);
    }

    #[test]
    fn test_rejection_preserves_proposed_order() {
        let mut resolver = MockResolver::new(MockOutcome::Status(
            2,
            "baz/qux breaks foo/bar somewhere deep",
        ));
        let outcome = validate(
            &mut resolver,
            &[
                change("foo/bar", "^1.0", "^1.5.0"),
                change("baz/qux", "^2.0", "^2.2.0"),
            ],
        );
        // Order follows the proposed-change list, not the diagnostic text
        assert_eq!(outcome.implicated_packages, vec!["foo/bar", "baz/qux"]);
    }

    #[test]
    fn test_rejection_without_named_packages() {
        let mut resolver = MockResolver::new(MockOutcome::Status(
            2,
            "transitive/helper requires ext-intl which is missing",
        ));
        let outcome = validate(&mut resolver, &[change("foo/bar", "^1.0", "^1.5.0")]);
        assert!(!outcome.accepted);
        assert!(outcome.implicated_packages.is_empty());
    }

    #[test]
    fn test_simulation_error_rejects_and_restores() {
        let mut resolver = MockResolver::new(MockOutcome::SpawnError);
        let snapshot = resolver.root_requirements();

        let outcome = validate(&mut resolver, &[change("foo/bar", "^1.0", "^1.5.0")]);
        assert!(!outcome.accepted);
        assert!(outcome.diagnostic_text.unwrap().contains("failed to run"));
        assert_eq!(resolver.root_requirements(), snapshot);
    }

    #[test]
    fn test_trial_requirements_append_unknown_package() {
        let snapshot = vec![Requirement::declared("foo/bar", "^1.0", false)];
        let trial = trial_requirements(&snapshot, &[change("new/pkg", "", "^2.1.0")]);
        assert_eq!(trial.len(), 2);
        assert_eq!(trial[1].name, "new/pkg");
        assert_eq!(trial[1].constraint, ">=2.1.0");
        assert_eq!(trial[1].display, "^2.1.0");
    }

    #[test]
    fn test_bare_version() {
        assert_eq!(bare_version("^3.1.0"), "3.1.0");
        assert_eq!(bare_version("~2.4"), "2.4.0");
        assert_eq!(bare_version("^v1.2.3"), "1.2.3");
    }
}
