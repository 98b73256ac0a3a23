//! Packagist-backed version oracle
//!
//! Fetches package metadata from the Packagist v2 API:
//! `https://repo.packagist.org/p2/{vendor}/{package}.json`
//!
//! Responses are cached per package for the lifetime of the oracle, so the
//! planner's paired lookups (policy-bounded latest, constraint-bounded
//! best) cost one request.

use crate::domain::{parse_version_lenient, Constraint};
use crate::error::OracleError;
use crate::oracle::{
    select_latest, select_satisfying, HttpClient, ReleaseInfo, VersionOracle,
};
use crate::policy::UpgradePolicy;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Packagist metadata API base URL
const PACKAGIST_API_URL: &str = "https://repo.packagist.org/p2";

/// Version oracle backed by the Packagist registry
pub struct PackagistOracle {
    client: HttpClient,
    cache: Mutex<HashMap<String, Arc<Vec<ReleaseInfo>>>>,
}

/// Packagist v2 metadata response
#[derive(Debug, Deserialize)]
struct PackageMetadata {
    /// Map of package name to its published versions
    packages: HashMap<String, Vec<PackageVersion>>,
}

/// One published version entry in the metadata response
#[derive(Debug, Deserialize)]
struct PackageVersion {
    version: String,
    #[serde(default)]
    time: Option<String>,
}

impl PackagistOracle {
    /// Create an oracle using the given HTTP client
    pub fn new(client: HttpClient) -> Self {
        Self {
            client,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Build the metadata URL for a package (`vendor/package` form)
    fn build_url(&self, package: &str) -> String {
        format!("{}/{}.json", PACKAGIST_API_URL, package)
    }

    /// All known releases of a package, cached after the first fetch
    async fn releases(&self, package: &str) -> Result<Arc<Vec<ReleaseInfo>>, OracleError> {
        if let Some(cached) = self.cache.lock().await.get(package) {
            return Ok(Arc::clone(cached));
        }

        let url = self.build_url(package);
        let metadata: PackageMetadata = self.client.get_json(&url, package).await?;
        let releases = Arc::new(parse_releases(metadata, package)?);

        self.cache
            .lock()
            .await
            .insert(package.to_string(), Arc::clone(&releases));
        Ok(releases)
    }
}

/// Convert a metadata response into an ordered release list. Entries whose
/// version is not a semantic version (branch heads like `dev-master`) are
/// dropped.
fn parse_releases(
    metadata: PackageMetadata,
    package: &str,
) -> Result<Vec<ReleaseInfo>, OracleError> {
    let versions = metadata
        .packages
        .into_iter()
        .find(|(name, _)| name == package)
        .map(|(_, versions)| versions)
        .ok_or_else(|| {
            OracleError::invalid_response(package, "package missing from response body")
        })?;

    let mut releases: Vec<ReleaseInfo> = versions
        .into_iter()
        .filter_map(|v| {
            let version = parse_version_lenient(&v.version)?;
            let released_at = v
                .time
                .as_deref()
                .and_then(|t| DateTime::parse_from_rfc3339(t).ok())
                .map(|t| t.with_timezone(&Utc));
            Some(ReleaseInfo::new(version, released_at))
        })
        .collect();

    releases.sort_by(|a, b| a.version.cmp(&b.version));
    Ok(releases)
}

#[async_trait]
impl VersionOracle for PackagistOracle {
    async fn latest(
        &self,
        package: &str,
        current: &Constraint,
        policy: &UpgradePolicy,
    ) -> Result<Option<ReleaseInfo>, OracleError> {
        let releases = self.releases(package).await?;
        Ok(select_latest(&releases, current, policy))
    }

    async fn best_satisfying(
        &self,
        package: &str,
        constraint: &Constraint,
    ) -> Result<Option<ReleaseInfo>, OracleError> {
        let releases = self.releases(package).await?;
        Ok(select_satisfying(&releases, constraint))
    }
}
