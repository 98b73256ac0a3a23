//! Version oracle: the source of "latest available version" information
//!
//! This module provides:
//! - The `VersionOracle` trait consumed by the planner
//! - Candidate selection over a release list (policy bounds, constraint
//!   satisfaction)
//! - A Packagist-backed implementation with a retrying HTTP client

mod client;
mod packagist;

pub use client::HttpClient;
pub use packagist::PackagistOracle;

use crate::domain::{Constraint, Stability};
use crate::error::OracleError;
use crate::policy::UpgradePolicy;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use semver::Version;

/// A published release of a package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseInfo {
    /// The release version
    pub version: Version,
    /// Publication timestamp, when the registry provides one
    pub released_at: Option<DateTime<Utc>>,
}

impl ReleaseInfo {
    /// Creates a new release record
    pub fn new(version: Version, released_at: Option<DateTime<Utc>>) -> Self {
        Self {
            version,
            released_at,
        }
    }

    /// The stability channel of this release
    pub fn stability(&self) -> Stability {
        Stability::of(&self.version)
    }
}

/// Source of version information for packages
#[async_trait]
pub trait VersionOracle: Send + Sync {
    /// The best candidate newer than the constraint's base version and
    /// within the policy's magnitude and stability bounds, or `None`
    async fn latest(
        &self,
        package: &str,
        current: &Constraint,
        policy: &UpgradePolicy,
    ) -> Result<Option<ReleaseInfo>, OracleError>;

    /// The best known version satisfying the constraint as declared, or
    /// `None`
    async fn best_satisfying(
        &self,
        package: &str,
        constraint: &Constraint,
    ) -> Result<Option<ReleaseInfo>, OracleError>;
}

/// Pick the best candidate within policy bounds from a release list
pub(crate) fn select_latest(
    releases: &[ReleaseInfo],
    current: &Constraint,
    policy: &UpgradePolicy,
) -> Option<ReleaseInfo> {
    let base = current.base_version()?;
    releases
        .iter()
        .filter(|r| r.version > base)
        .filter(|r| r.stability().at_least(policy.min_stability))
        .filter(|r| policy.allows(crate::policy::UpgradeMagnitude::between(&base, &r.version)))
        .max_by(|a, b| a.version.cmp(&b.version))
        .cloned()
}

/// Pick the best release satisfying a declared constraint
pub(crate) fn select_satisfying(
    releases: &[ReleaseInfo],
    constraint: &Constraint,
) -> Option<ReleaseInfo> {
    releases
        .iter()
        .filter(|r| constraint.matches(&r.version))
        .max_by(|a, b| a.version.cmp(&b.version))
        .cloned()
}
