//! Manifest entries and the platform-package predicate

use super::Constraint;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Runtime packages that are part of the platform, never installable
const RUNTIME_PACKAGES: &[&str] = &[
    "php",
    "php-64bit",
    "php-ipv6",
    "php-zts",
    "php-debug",
    "hhvm",
    "composer",
    "composer-plugin-api",
    "composer-runtime-api",
];

/// Prefixes marking extension and system-library requirements
const PLATFORM_PREFIXES: &[&str] = &["ext-", "lib-"];

/// Returns true for platform packages: the runtime itself, extension
/// markers, and system libraries. These describe the environment, not
/// installable code, and are never upgrade candidates.
pub fn is_platform_package(name: &str) -> bool {
    let name = name.to_ascii_lowercase();
    RUNTIME_PACKAGES.contains(&name.as_str())
        || PLATFORM_PREFIXES.iter().any(|p| name.starts_with(p))
}

/// A declared dependency: package name plus its version constraint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Package name in `vendor/package` form (or a platform name)
    pub name: String,
    /// The declared version constraint
    pub constraint: Constraint,
    /// Whether this entry comes from the require-dev section
    pub is_dev: bool,
}

impl ManifestEntry {
    /// Creates a new entry
    pub fn new(name: impl Into<String>, constraint: Constraint, is_dev: bool) -> Self {
        Self {
            name: name.into(),
            constraint,
            is_dev,
        }
    }

    /// Creates a require-section entry
    pub fn production(name: impl Into<String>, constraint: Constraint) -> Self {
        Self::new(name, constraint, false)
    }

    /// Creates a require-dev-section entry
    pub fn development(name: impl Into<String>, constraint: Constraint) -> Self {
        Self::new(name, constraint, true)
    }

    /// Returns true if this entry names a platform package
    pub fn is_platform(&self) -> bool {
        is_platform_package(&self.name)
    }
}

impl fmt::Display for ManifestEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dev_marker = if self.is_dev { " (dev)" } else { "" };
        write!(f, "{}@{}{}", self.name, self.constraint, dev_marker)
    }
}
