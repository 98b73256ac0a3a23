//! Top-level upgrade session
//!
//! Coordinates one run: load the manifest, plan upgrades, validate the
//! proposed change set, then commit or abort. The manifest file is read
//! once and written at most once; every abort path leaves it untouched.

use crate::domain::ValidationOutcome;
use crate::error::{AppError, SetupError};
use crate::manifest::{has_lock_file, ComposerManifest, MANIFEST_FILE};
use crate::oracle::VersionOracle;
use crate::planner::{UpgradePlan, UpgradePlanner};
use crate::policy::UpgradePolicy;
use crate::progress::Progress;
use crate::resolver::DependencyResolver;
use crate::validator::validate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Terminal state of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// No constraint needed rewriting
    NoChanges,
    /// Changes were computed and reported; nothing was persisted
    DryRunComplete,
    /// Validation passed and the manifest was written
    Committed,
    /// Validation rejected the change set; nothing was persisted
    Aborted,
}

impl SessionState {
    /// Whether this state maps to a zero exit code
    pub fn is_success(&self) -> bool {
        !matches!(self, SessionState::Aborted)
    }
}

/// Everything the output formatters need about a finished session
#[derive(Debug, Clone)]
pub struct SessionReport {
    /// Project directory the session ran against
    pub project_dir: PathBuf,
    /// Whether this was a dry run
    pub dry_run: bool,
    /// The plan that was produced
    pub plan: UpgradePlan,
    /// Validation outcome, when the session reached validation
    pub validation: Option<ValidationOutcome>,
    /// Terminal state
    pub state: SessionState,
}

/// Coordinates loading, planning, validation, and persistence
pub struct UpgradeSession<'a> {
    project_dir: PathBuf,
    policy: UpgradePolicy,
    oracle: &'a dyn VersionOracle,
}

impl<'a> UpgradeSession<'a> {
    /// Create a session over a project directory
    pub fn new(
        project_dir: impl Into<PathBuf>,
        policy: UpgradePolicy,
        oracle: &'a dyn VersionOracle,
    ) -> Self {
        Self {
            project_dir: project_dir.into(),
            policy,
            oracle,
        }
    }

    /// Run the session to a terminal state.
    ///
    /// `make_resolver` receives the freshly loaded manifest so the resolver
    /// captures the base requirement state, before planning mutates the
    /// model in memory.
    pub async fn run(
        &self,
        progress: &mut Progress,
        make_resolver: impl FnOnce(&ComposerManifest) -> Box<dyn DependencyResolver>,
    ) -> Result<SessionReport, AppError> {
        // Loading
        let manifest_path = self.project_dir.join(MANIFEST_FILE);
        if !manifest_path.exists() {
            return Err(SetupError::ManifestMissing {
                path: self.project_dir.clone(),
            }
            .into());
        }
        let mut manifest = ComposerManifest::load(&self.project_dir).map_err(|e| match e {
            crate::error::ManifestError::Parse { path, message } => {
                SetupError::ManifestUnreadable { path, message }
            }
            other => SetupError::ManifestUnreadable {
                path: manifest_path.clone(),
                message: other.to_string(),
            },
        })?;
        if !self.policy.dry_run && !has_lock_file(&self.project_dir) {
            return Err(SetupError::LockMissing {
                path: self.project_dir.clone(),
            }
            .into());
        }

        let mut resolver = make_resolver(&manifest);

        // Planning: per-package failures are absorbed into the plan
        let planner = UpgradePlanner::new(self.oracle, self.policy.clone());
        let plan = planner.plan(&mut manifest, progress).await;

        if !plan.has_updates() {
            return Ok(self.report(plan, None, SessionState::NoChanges));
        }
        if self.policy.dry_run {
            return Ok(self.report(plan, None, SessionState::DryRunComplete));
        }

        // Validating
        progress.spinner("Validating against the resolver...");
        let outcome = validate(resolver.as_mut(), &plan.changes);
        progress.finish_and_clear();

        if !outcome.accepted {
            return Ok(self.report(plan, Some(outcome), SessionState::Aborted));
        }

        // Commit: the single write of this session
        manifest.save()?;
        Ok(self.report(plan, Some(outcome), SessionState::Committed))
    }

    fn report(
        &self,
        plan: UpgradePlan,
        validation: Option<ValidationOutcome>,
        state: SessionState,
    ) -> SessionReport {
        SessionReport {
            project_dir: self.project_dir.clone(),
            dry_run: self.policy.dry_run,
            plan,
            validation,
            state,
        }
    }
}
