//! composer.json model
//!
//! This module provides:
//! - Loading the manifest into a structured document
//! - Ordered iteration over require / require-dev entries
//! - In-place constraint rewrites that preserve all unrelated manifest
//!   content byte-for-byte
//! - Writing the manifest back at most once per session
//!
//! Rewrites use targeted text replacement rather than re-serialization, so
//! key order, indentation, and every unrelated section survive untouched.
//! Entries whose constraints carry no version literal (`dev-master` branch
//! requirements, aliases) are not upgrade candidates and are not returned
//! by `dependencies()`.

use crate::domain::{Constraint, ManifestEntry};
use crate::error::ManifestError;
use regex::Regex;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// The manifest file name this tool operates on
pub const MANIFEST_FILE: &str = "composer.json";

/// The lock file name expected next to the manifest
pub const LOCK_FILE: &str = "composer.lock";

/// In-memory model of a composer.json file
#[derive(Debug, Clone)]
pub struct ComposerManifest {
    /// Path the manifest was loaded from
    path: PathBuf,
    /// Manifest text with accepted rewrites applied
    text: String,
    /// Parsed document, kept in sync with `text`
    document: Value,
}

impl ComposerManifest {
    /// Load the manifest from a project directory
    pub fn load(project_dir: &Path) -> Result<Self, ManifestError> {
        let path = project_dir.join(MANIFEST_FILE);
        let text = fs::read_to_string(&path).map_err(|e| ManifestError::read(&path, e))?;
        Self::parse(&path, text)
    }

    /// Parse manifest text as loaded from `path`
    pub fn parse(path: &Path, text: String) -> Result<Self, ManifestError> {
        let document: Value = serde_json::from_str(&text)
            .map_err(|e| ManifestError::parse(path, e.to_string()))?;

        if !document.is_object() {
            return Err(ManifestError::parse(path, "top-level value is not an object"));
        }

        Ok(Self {
            path: path.to_path_buf(),
            text,
            document,
        })
    }

    /// Path the manifest was loaded from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The parsed document (with accepted rewrites applied)
    pub fn document(&self) -> &Value {
        &self.document
    }

    /// Current manifest text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Declared dependencies in declaration order: the require section
    /// first, then require-dev
    pub fn dependencies(&self) -> Vec<ManifestEntry> {
        let mut entries = Vec::new();
        self.collect_section("require", false, &mut entries);
        self.collect_section("require-dev", true, &mut entries);
        entries
    }

    fn collect_section(&self, section: &str, is_dev: bool, out: &mut Vec<ManifestEntry>) {
        let Some(map) = self.document.get(section).and_then(|v| v.as_object()) else {
            return;
        };
        for (name, value) in map {
            if let Some(raw) = value.as_str() {
                if let Some(constraint) = Constraint::parse(raw) {
                    out.push(ManifestEntry::new(name.clone(), constraint, is_dev));
                }
            }
        }
    }

    /// The declared constraint text for a package, searching require then
    /// require-dev
    pub fn constraint_of(&self, package: &str) -> Option<&str> {
        for section in ["require", "require-dev"] {
            if let Some(raw) = self
                .document
                .get(section)
                .and_then(|v| v.get(package))
                .and_then(|v| v.as_str())
            {
                return Some(raw);
            }
        }
        None
    }

    /// Rewrite the constraint for a package in place. Idempotent when the
    /// declared text already equals `new_constraint`. All unrelated
    /// manifest content is preserved byte-for-byte.
    pub fn set_constraint(
        &mut self,
        package: &str,
        new_constraint: &str,
    ) -> Result<(), ManifestError> {
        let Some(current) = self.constraint_of(package) else {
            return Err(ManifestError::unknown_package(&self.path, package));
        };
        if current == new_constraint {
            return Ok(());
        }

        // Same technique as updating a package.json in place: replace the
        // `"name": "constraint"` pair textually so formatting and key order
        // survive. The name is escaped (package names contain `/`).
        let pattern = format!(
            r#"("{}"\s*:\s*)"[^"]*""#,
            regex::escape(package)
        );
        let re = Regex::new(&pattern)
            .map_err(|e| ManifestError::parse(&self.path, format!("invalid pattern: {}", e)))?;

        if re.find(&self.text).is_none() {
            return Err(ManifestError::unknown_package(&self.path, package));
        }
        self.text = re
            .replace(&self.text, |caps: &regex::Captures| {
                format!(r#"{}"{}""#, &caps[1], new_constraint)
            })
            .into_owned();

        // Keep the parsed document in sync for reporting and for staging
        // trial projects.
        for section in ["require", "require-dev"] {
            if let Some(map) = self
                .document
                .get_mut(section)
                .and_then(|v| v.as_object_mut())
            {
                if let Some(slot) = map.get_mut(package) {
                    *slot = Value::String(new_constraint.to_string());
                    break;
                }
            }
        }

        Ok(())
    }

    /// Write the manifest back to the path it was loaded from
    pub fn save(&self) -> Result<(), ManifestError> {
        fs::write(&self.path, &self.text).map_err(|e| ManifestError::write(&self.path, e))
    }
}

/// Returns true if a lock file exists next to the manifest in `project_dir`
pub fn has_lock_file(project_dir: &Path) -> bool {
    project_dir.join(LOCK_FILE).exists()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"{
    "name": "acme/app",
    "description": "Sample application",
    "require": {
        "php": ">=8.1",
        "monolog/monolog": "^2.0",
        "symfony/console": "~5.4"
    },
    "require-dev": {
        "phpunit/phpunit": "^9.5"
    },
    "autoload": {
        "psr-4": {
            "Acme\\": "src/"
        }
    }
}"#;

    fn sample() -> ComposerManifest {
        ComposerManifest::parse(Path::new("composer.json"), SAMPLE.to_string()).unwrap()
    }

    #[test]
    fn test_parse_rejects_invalid_json() {
        let result = ComposerManifest::parse(Path::new("composer.json"), "not json".to_string());
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_rejects_non_object() {
        let result = ComposerManifest::parse(Path::new("composer.json"), "[1, 2]".to_string());
        assert!(result.is_err());
    }

    #[test]
    fn test_dependencies_in_declaration_order() {
        let manifest = sample();
        let names: Vec<_> = manifest
            .dependencies()
            .iter()
            .map(|e| e.name.clone())
            .collect();
        assert_eq!(
            names,
            vec![
                "php",
                "monolog/monolog",
                "symfony/console",
                "phpunit/phpunit"
            ]
        );
    }

    #[test]
    fn test_dependencies_dev_flag() {
        let manifest = sample();
        let deps = manifest.dependencies();
        assert!(!deps.iter().find(|e| e.name == "monolog/monolog").unwrap().is_dev);
        assert!(deps.iter().find(|e| e.name == "phpunit/phpunit").unwrap().is_dev);
    }

    #[test]
    fn test_dependencies_skip_branch_constraints() {
        let text = r#"{
    "require": {
        "a/released": "^1.0",
        "b/branch": "dev-master"
    }
}"#;
        let manifest =
            ComposerManifest::parse(Path::new("composer.json"), text.to_string()).unwrap();
        let names: Vec<_> = manifest
            .dependencies()
            .iter()
            .map(|e| e.name.clone())
            .collect();
        assert_eq!(names, vec!["a/released"]);
    }

    #[test]
    fn test_dependencies_without_require_sections() {
        let manifest =
            ComposerManifest::parse(Path::new("composer.json"), "{}".to_string()).unwrap();
        assert!(manifest.dependencies().is_empty());
    }

    #[test]
    fn test_constraint_of() {
        let manifest = sample();
        assert_eq!(manifest.constraint_of("monolog/monolog"), Some("^2.0"));
        assert_eq!(manifest.constraint_of("phpunit/phpunit"), Some("^9.5"));
        assert_eq!(manifest.constraint_of("missing/pkg"), None);
    }

    #[test]
    fn test_set_constraint_rewrites_only_the_target() {
        let mut manifest = sample();
        manifest.set_constraint("monolog/monolog", "^3.1.0").unwrap();

        let expected = SAMPLE.replace(r#""monolog/monolog": "^2.0""#, r#""monolog/monolog": "^3.1.0""#);
        assert_eq!(manifest.text(), expected);
        assert_eq!(manifest.constraint_of("monolog/monolog"), Some("^3.1.0"));
    }

    #[test]
    fn test_set_constraint_preserves_unrelated_content() {
        let mut manifest = sample();
        manifest.set_constraint("symfony/console", "^5.4.9").unwrap();

        // Unrelated sections and formatting are untouched
        assert!(manifest.text().contains(r#""description": "Sample application""#));
        assert!(manifest.text().contains(r#""Acme\\": "src/""#));
        assert!(manifest.text().contains(r#""php": ">=8.1""#));

        // Key order is untouched
        let monolog = manifest.text().find("monolog/monolog").unwrap();
        let symfony = manifest.text().find("symfony/console").unwrap();
        assert!(monolog < symfony);
    }

    #[test]
    fn test_set_constraint_in_require_dev() {
        let mut manifest = sample();
        manifest.set_constraint("phpunit/phpunit", "^9.6.0").unwrap();
        assert!(manifest.text().contains(r#""phpunit/phpunit": "^9.6.0""#));
    }

    #[test]
    fn test_set_constraint_idempotent_when_unchanged() {
        let mut manifest = sample();
        let before = manifest.text().to_string();
        manifest.set_constraint("monolog/monolog", "^2.0").unwrap();
        assert_eq!(manifest.text(), before);
    }

    #[test]
    fn test_set_constraint_unknown_package() {
        let mut manifest = sample();
        let result = manifest.set_constraint("missing/pkg", "^1.0");
        assert!(matches!(result, Err(ManifestError::UnknownPackage { .. })));
    }

    #[test]
    fn test_load_and_save_round_trip() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(MANIFEST_FILE), SAMPLE).unwrap();

        let mut manifest = ComposerManifest::load(dir.path()).unwrap();
        manifest.set_constraint("monolog/monolog", "^2.9.0").unwrap();
        manifest.save().unwrap();

        let written = fs::read_to_string(dir.path().join(MANIFEST_FILE)).unwrap();
        assert!(written.contains(r#""monolog/monolog": "^2.9.0""#));
        assert!(written.contains(r#""php": ">=8.1""#));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let result = ComposerManifest::load(dir.path());
        assert!(matches!(result, Err(ManifestError::Read { .. })));
    }

    #[test]
    fn test_has_lock_file() {
        let dir = TempDir::new().unwrap();
        assert!(!has_lock_file(dir.path()));
        fs::write(dir.path().join(LOCK_FILE), "{}").unwrap();
        assert!(has_lock_file(dir.path()));
    }
}
