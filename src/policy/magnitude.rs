//! Upgrade magnitude classification

use semver::Version;
use serde::{Deserialize, Serialize};

/// Classification of a version bump per semantic versioning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpgradeMagnitude {
    /// Major version change (breaking)
    Major,
    /// Minor version change (features)
    Minor,
    /// Patch version change (fixes)
    Patch,
}

impl UpgradeMagnitude {
    /// Classify the difference between two versions
    pub fn between(from: &Version, to: &Version) -> Self {
        if to.major != from.major {
            UpgradeMagnitude::Major
        } else if to.minor != from.minor {
            UpgradeMagnitude::Minor
        } else {
            UpgradeMagnitude::Patch
        }
    }

    /// Plain label
    pub fn label(&self) -> &'static str {
        match self {
            UpgradeMagnitude::Major => "major",
            UpgradeMagnitude::Minor => "minor",
            UpgradeMagnitude::Patch => "patch",
        }
    }
}
