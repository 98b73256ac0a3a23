//! Upgrade planning across the manifest's declared dependencies
//!
//! The planner walks the manifest in declaration order, one package at a
//! time: early exclusion checks, oracle lookups, the policy decision, and
//! the in-memory rewrite (unless dry-run). Per-package failures are
//! absorbed into the plan; nothing here aborts the session.

use crate::domain::{ManifestEntry, ProposedChange};
use crate::error::OracleError;
use crate::manifest::ComposerManifest;
use crate::oracle::{ReleaseInfo, VersionOracle};
use crate::policy::{Decision, SkipReason, UpgradeJudge, UpgradeMagnitude, UpgradePolicy};
use crate::progress::Progress;
use chrono::{DateTime, Utc};
use semver::Version;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Per-package outcome of planning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PackageOutcome {
    /// The constraint will be rewritten
    Upgrade {
        /// Package name
        package: String,
        /// Whether the package lives in require-dev
        is_dev: bool,
        /// Constraint as declared
        old_constraint: String,
        /// Constraint to write
        new_constraint: String,
        /// Bump magnitude; `None` for a text normalization
        magnitude: Option<UpgradeMagnitude>,
        /// Release date of the target version, when known
        released_at: Option<DateTime<Utc>>,
    },
    /// The package is left as declared
    Skip {
        /// Package name
        package: String,
        /// Whether the package lives in require-dev
        is_dev: bool,
        /// Why it was skipped
        reason: SkipReason,
    },
}

impl PackageOutcome {
    fn skip(entry: &ManifestEntry, reason: SkipReason) -> Self {
        PackageOutcome::Skip {
            package: entry.name.clone(),
            is_dev: entry.is_dev,
            reason,
        }
    }

    /// Returns true for an Upgrade outcome
    pub fn is_upgrade(&self) -> bool {
        matches!(self, PackageOutcome::Upgrade { .. })
    }

    /// The package this outcome concerns
    pub fn package(&self) -> &str {
        match self {
            PackageOutcome::Upgrade { package, .. } => package,
            PackageOutcome::Skip { package, .. } => package,
        }
    }
}

impl fmt::Display for PackageOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PackageOutcome::Upgrade {
                package,
                old_constraint,
                new_constraint,
                ..
            } => write!(f, "{}: {} → {}", package, old_constraint, new_constraint),
            PackageOutcome::Skip {
                package, reason, ..
            } => write!(f, "{}: skipped ({})", package, reason),
        }
    }
}

/// The accumulated plan for one session
#[derive(Debug, Clone, Default)]
pub struct UpgradePlan {
    /// One outcome per evaluated package, in manifest order
    pub outcomes: Vec<PackageOutcome>,
    /// Proposed constraint rewrites, in manifest order
    pub changes: Vec<ProposedChange>,
}

impl UpgradePlan {
    /// Returns true if any constraint rewrite was proposed
    pub fn has_updates(&self) -> bool {
        !self.changes.is_empty()
    }

    /// Number of proposed rewrites
    pub fn upgrade_count(&self) -> usize {
        self.changes.len()
    }

    /// Number of skipped packages
    pub fn skip_count(&self) -> usize {
        self.outcomes.len() - self.changes.len()
    }
}

/// Plans constraint rewrites over a manifest
pub struct UpgradePlanner<'a> {
    oracle: &'a dyn VersionOracle,
    judge: UpgradeJudge,
}

impl<'a> UpgradePlanner<'a> {
    /// Create a planner for the given oracle and policy
    pub fn new(oracle: &'a dyn VersionOracle, policy: UpgradePolicy) -> Self {
        Self {
            oracle,
            judge: UpgradeJudge::new(policy),
        }
    }

    /// The policy this planner applies
    pub fn policy(&self) -> &UpgradePolicy {
        self.judge.policy()
    }

    /// Walk the manifest and build the plan. Accepted rewrites are applied
    /// to the in-memory manifest unless the policy is dry-run; the file on
    /// disk is never touched here.
    pub async fn plan(
        &self,
        manifest: &mut ComposerManifest,
        progress: &mut Progress,
    ) -> UpgradePlan {
        let entries = manifest.dependencies();
        let mut plan = UpgradePlan::default();

        progress.start(entries.len() as u64, "Checking dependencies");

        // Strictly sequential: oracle lookups share a cache and per-package
        // reporting must not interleave.
        for entry in entries {
            progress.set_message(&entry.name);
            self.plan_one(&entry, manifest, &mut plan).await;
            progress.inc();
        }

        progress.finish_and_clear();
        plan
    }

    async fn plan_one(
        &self,
        entry: &ManifestEntry,
        manifest: &mut ComposerManifest,
        plan: &mut UpgradePlan,
    ) {
        if let Some(reason) = self.judge.should_skip(entry) {
            plan.outcomes.push(PackageOutcome::skip(entry, reason));
            return;
        }

        let (latest, best_known) = match self.lookup(entry).await {
            Ok(pair) => pair,
            Err(e) => {
                plan.outcomes.push(PackageOutcome::skip(
                    entry,
                    SkipReason::LookupFailed(e.to_string()),
                ));
                return;
            }
        };

        let decision = self.judge.decide(
            entry,
            latest.as_ref().map(|r| &r.version),
            best_known.as_ref().map(|r| &r.version),
        );

        match decision {
            Decision::Update {
                new_constraint,
                target,
                magnitude,
            } => {
                if !self.policy().dry_run {
                    if let Err(e) = manifest.set_constraint(&entry.name, &new_constraint) {
                        plan.outcomes.push(PackageOutcome::skip(
                            entry,
                            SkipReason::RewriteFailed(e.to_string()),
                        ));
                        return;
                    }
                }

                plan.changes.push(ProposedChange::new(
                    &entry.name,
                    &entry.constraint.raw,
                    &new_constraint,
                ));
                plan.outcomes.push(PackageOutcome::Upgrade {
                    package: entry.name.clone(),
                    is_dev: entry.is_dev,
                    old_constraint: entry.constraint.raw.clone(),
                    new_constraint,
                    magnitude,
                    released_at: release_date(&target, latest.as_ref(), best_known.as_ref()),
                });
            }
            Decision::Skip { reason } => {
                plan.outcomes.push(PackageOutcome::skip(entry, reason));
            }
        }
    }

    async fn lookup(
        &self,
        entry: &ManifestEntry,
    ) -> Result<(Option<ReleaseInfo>, Option<ReleaseInfo>), OracleError> {
        let latest = self
            .oracle
            .latest(&entry.name, &entry.constraint, self.policy())
            .await?;
        let best_known = self
            .oracle
            .best_satisfying(&entry.name, &entry.constraint)
            .await?;
        Ok((latest, best_known))
    }
}

/// Release date of the decided target, when either lookup surfaced it
fn release_date(
    target: &Version,
    latest: Option<&ReleaseInfo>,
    best_known: Option<&ReleaseInfo>,
) -> Option<DateTime<Utc>> {
    [latest, best_known]
        .into_iter()
        .flatten()
        .find(|r| r.version == *target)
        .and_then(|r| r.released_at)
}
