//! Upgrade decision logic
//!
//! This module provides:
//! - Policy configuration (magnitude flags, stability floor, only-list)
//! - The judge that decides, per package, whether a constraint is rewritten
//!   and what the new constraint text is

mod magnitude;

pub use magnitude::UpgradeMagnitude;

use crate::domain::{caret, ManifestEntry, Stability};
use semver::Version;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Policy configuration for a single upgrade session
#[derive(Debug, Clone)]
pub struct UpgradePolicy {
    /// Allow major version bumps
    pub allow_major: bool,
    /// Allow minor version bumps
    pub allow_minor: bool,
    /// Allow patch version bumps
    pub allow_patch: bool,
    /// Lowest acceptable stability channel for upgrade targets
    pub min_stability: Stability,
    /// If non-empty, only these packages are evaluated
    pub only: Vec<String>,
    /// Compute and report changes without touching any state
    pub dry_run: bool,
}

impl Default for UpgradePolicy {
    fn default() -> Self {
        Self {
            allow_major: false,
            allow_minor: true,
            allow_patch: true,
            min_stability: Stability::Stable,
            only: Vec::new(),
            dry_run: false,
        }
    }
}

impl UpgradePolicy {
    /// Create a policy with default settings (minor and patch upgrades,
    /// stable floor)
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow major version bumps
    pub fn with_major(mut self, allow: bool) -> Self {
        self.allow_major = allow;
        self
    }

    /// Allow minor version bumps
    pub fn with_minor(mut self, allow: bool) -> Self {
        self.allow_minor = allow;
        self
    }

    /// Allow patch version bumps
    pub fn with_patch(mut self, allow: bool) -> Self {
        self.allow_patch = allow;
        self
    }

    /// Set the stability floor
    pub fn with_min_stability(mut self, floor: Stability) -> Self {
        self.min_stability = floor;
        self
    }

    /// Restrict evaluation to the given packages
    pub fn with_only(mut self, only: Vec<String>) -> Self {
        self.only = only;
        self
    }

    /// Enable dry-run mode
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Whether the policy permits a bump of the given magnitude
    pub fn allows(&self, magnitude: UpgradeMagnitude) -> bool {
        match magnitude {
            UpgradeMagnitude::Major => self.allow_major,
            UpgradeMagnitude::Minor => self.allow_minor,
            UpgradeMagnitude::Patch => self.allow_patch,
        }
    }

    /// Whether a package passes the only-list filter
    pub fn covers_package(&self, name: &str) -> bool {
        self.only.is_empty() || self.only.iter().any(|p| p == name)
    }
}

/// Reason why a package was left unchanged
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Platform package (runtime, extension, system library)
    Platform,
    /// Package not in the --only list
    NotInOnlyList,
    /// Constraint already in canonical form for the best known version
    AlreadyCurrent,
    /// The declared constraint carries no usable version literal
    InvalidConstraint(String),
    /// Version lookup failed for this package
    LookupFailed(String),
    /// The in-memory rewrite could not be applied
    RewriteFailed(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Platform => write!(f, "platform package"),
            SkipReason::NotInOnlyList => write!(f, "not in --only list"),
            SkipReason::AlreadyCurrent => write!(f, "already current"),
            SkipReason::InvalidConstraint(raw) => write!(f, "unsupported constraint '{}'", raw),
            SkipReason::LookupFailed(msg) => write!(f, "lookup failed: {}", msg),
            SkipReason::RewriteFailed(msg) => write!(f, "rewrite failed: {}", msg),
        }
    }
}

/// Outcome of a per-package decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Rewrite the constraint
    Update {
        /// New constraint text, in canonical caret form
        new_constraint: String,
        /// The version the new constraint is anchored on
        target: Version,
        /// Bump magnitude for a real upgrade; `None` when the rewrite only
        /// normalizes the constraint text
        magnitude: Option<UpgradeMagnitude>,
    },
    /// Leave the constraint as declared
    Skip {
        /// Why the package was skipped
        reason: SkipReason,
    },
}

impl Decision {
    /// Returns true for an Update decision
    pub fn is_update(&self) -> bool {
        matches!(self, Decision::Update { .. })
    }

    fn skip(reason: SkipReason) -> Self {
        Decision::Skip { reason }
    }
}

/// Decides, per package, whether and how to rewrite a constraint
pub struct UpgradeJudge {
    policy: UpgradePolicy,
}

impl UpgradeJudge {
    /// Create a judge for the given policy
    pub fn new(policy: UpgradePolicy) -> Self {
        Self { policy }
    }

    /// The policy this judge applies
    pub fn policy(&self) -> &UpgradePolicy {
        &self.policy
    }

    /// Check whether a package is excluded before any lookup happens.
    /// Returns Some(reason) if it must be skipped unconditionally.
    pub fn should_skip(&self, entry: &ManifestEntry) -> Option<SkipReason> {
        if entry.is_platform() {
            return Some(SkipReason::Platform);
        }
        if !self.policy.covers_package(&entry.name) {
            return Some(SkipReason::NotInOnlyList);
        }
        None
    }

    /// Decide what to do with one package.
    ///
    /// `latest` is the best candidate the oracle found within the policy
    /// bounds; `best_known` is the best version satisfying the constraint
    /// as currently declared. An eligible `latest` wins; otherwise the
    /// constraint is normalized onto `best_known` (or its own base version)
    /// when that changes the stored text.
    pub fn decide(
        &self,
        entry: &ManifestEntry,
        latest: Option<&Version>,
        best_known: Option<&Version>,
    ) -> Decision {
        if let Some(reason) = self.should_skip(entry) {
            return Decision::skip(reason);
        }

        let Some(current) = entry.constraint.base_version() else {
            return Decision::skip(SkipReason::InvalidConstraint(entry.constraint.raw.clone()));
        };

        if let Some(candidate) = latest {
            if *candidate > current {
                let magnitude = UpgradeMagnitude::between(&current, candidate);
                if self.policy.allows(magnitude)
                    && Stability::of(candidate).at_least(self.policy.min_stability)
                {
                    return Decision::Update {
                        new_constraint: caret(candidate),
                        target: candidate.clone(),
                        magnitude: Some(magnitude),
                    };
                }
            }
        }

        // No eligible newer version. Normalize onto the best version the
        // declared constraint already admits, if that changes the text.
        let target = best_known.cloned().unwrap_or(current);
        let canonical = caret(&target);
        if canonical != entry.constraint.raw {
            Decision::Update {
                new_constraint: canonical,
                target,
                magnitude: None,
            }
        } else {
            Decision::skip(SkipReason::AlreadyCurrent)
        }
    }
}
