//! Stability channels for package versions
//!
//! Composer orders release maturity as dev < alpha < beta < RC < stable.
//! The channel of a version is read from its pre-release identifiers;
//! a version without a pre-release part is stable.

use clap::ValueEnum;
use semver::Version;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Release maturity channel, ordered from least to most stable
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Stability {
    /// Development snapshots (`-dev`)
    Dev,
    /// Alpha releases (`-alpha.1`, `-a2`)
    Alpha,
    /// Beta releases (`-beta.3`, `-b1`)
    Beta,
    /// Release candidates (`-RC2`)
    Rc,
    /// Stable releases (no pre-release part)
    Stable,
}

impl Stability {
    /// Classify a version by its pre-release identifiers.
    ///
    /// Unrecognized suffixes (nightlies, canaries, vendor tags) classify as
    /// `Dev`, the least stable channel, so a stable floor always excludes
    /// them.
    pub fn of(version: &Version) -> Self {
        if version.pre.is_empty() {
            return Stability::Stable;
        }

        let first = version
            .pre
            .as_str()
            .split('.')
            .next()
            .unwrap_or("")
            .to_ascii_lowercase();
        let tag: String = first.chars().take_while(|c| c.is_ascii_alphabetic()).collect();

        match tag.as_str() {
            "alpha" | "a" => Stability::Alpha,
            "beta" | "b" => Stability::Beta,
            "rc" => Stability::Rc,
            // `-p`/`-pl` patch-level suffixes count as stable releases
            "patch" | "pl" | "p" => Stability::Stable,
            _ => Stability::Dev,
        }
    }

    /// Returns true if this channel is at least as stable as `floor`
    pub fn at_least(self, floor: Stability) -> bool {
        self >= floor
    }

    /// Lowercase label as it appears in composer.json `minimum-stability`
    pub fn label(self) -> &'static str {
        match self {
            Stability::Dev => "dev",
            Stability::Alpha => "alpha",
            Stability::Beta => "beta",
            Stability::Rc => "rc",
            Stability::Stable => "stable",
        }
    }
}

impl fmt::Display for Stability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
