//! Resolver backed by the composer executable
//!
//! Simulations stage the current in-memory requirement set into a scratch
//! copy of the project (rewritten composer.json plus the real lock file)
//! and run `composer update --dry-run` there, so the real project is never
//! touched.

use crate::error::ResolverError;
use crate::manifest::{ComposerManifest, LOCK_FILE, MANIFEST_FILE};
use crate::resolver::{DependencyResolver, Requirement, ResolverCapability, SimulationStatus};
use serde_json::{Map, Value};
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tempfile::TempDir;

/// Default resolver executable name
const COMPOSER_BINARY: &str = "composer";

/// Arguments for a dry-run update simulation
const SIMULATE_ARGS: &[&str] = &[
    "update",
    "--dry-run",
    "--no-interaction",
    "--no-progress",
    "--no-plugins",
    "--no-scripts",
];

/// `DependencyResolver` implementation that shells out to composer
pub struct ComposerCli {
    project_dir: PathBuf,
    binary: String,
    document: Value,
    requirements: Vec<Requirement>,
}

impl ComposerCli {
    /// Create a resolver over the project the manifest was loaded from.
    /// The requirement set starts as the manifest's declared requirements.
    pub fn new(project_dir: impl Into<PathBuf>, manifest: &ComposerManifest) -> Self {
        Self {
            project_dir: project_dir.into(),
            binary: COMPOSER_BINARY.to_string(),
            document: manifest.document().clone(),
            requirements: declared_requirements(manifest.document()),
        }
    }

    /// Override the resolver executable
    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    /// Stage the current requirement set into a scratch project directory
    fn stage(&self) -> Result<TempDir, ResolverError> {
        let staged = tempfile::tempdir()
            .map_err(|e| ResolverError::Staging {
                message: e.to_string(),
            })?;

        let mut document = self.document.clone();
        write_section(&mut document, "require", &self.requirements, false);
        write_section(&mut document, "require-dev", &self.requirements, true);

        let manifest_text = serde_json::to_string_pretty(&document).map_err(|e| {
            ResolverError::Staging {
                message: e.to_string(),
            }
        })?;
        fs::write(staged.path().join(MANIFEST_FILE), manifest_text).map_err(|e| {
            ResolverError::Staging {
                message: e.to_string(),
            }
        })?;

        let lock = self.project_dir.join(LOCK_FILE);
        if lock.exists() {
            fs::copy(&lock, staged.path().join(LOCK_FILE)).map_err(|e| {
                ResolverError::Staging {
                    message: format!("failed to copy lock file: {}", e),
                }
            })?;
        }

        Ok(staged)
    }
}

/// Collect the declared requirement set from a manifest document
fn declared_requirements(document: &Value) -> Vec<Requirement> {
    let mut requirements = Vec::new();
    for (section, is_dev) in [("require", false), ("require-dev", true)] {
        if let Some(map) = document.get(section).and_then(|v| v.as_object()) {
            for (name, value) in map {
                if let Some(constraint) = value.as_str() {
                    requirements.push(Requirement::declared(name.clone(), constraint, is_dev));
                }
            }
        }
    }
    requirements
}

/// Replace one require section of the document with the matching
/// requirements. A section absent from the original document is only
/// created when requirements target it.
fn write_section(document: &mut Value, section: &str, requirements: &[Requirement], dev: bool) {
    let mut map = Map::new();
    for req in requirements.iter().filter(|r| r.is_dev == dev) {
        map.insert(req.name.clone(), Value::String(req.constraint.clone()));
    }

    let Some(root) = document.as_object_mut() else {
        return;
    };
    if map.is_empty() && !root.contains_key(section) {
        return;
    }
    root.insert(section.to_string(), Value::Object(map));
}

impl DependencyResolver for ComposerCli {
    fn probe(&self) -> ResolverCapability {
        match Command::new(&self.binary).arg("--version").output() {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                ResolverCapability::Unavailable(format!("{} executable not found", self.binary))
            }
            Err(e) => ResolverCapability::Error(e.to_string()),
            Ok(output) if !output.status.success() => ResolverCapability::Error(format!(
                "{} --version exited with {}",
                self.binary, output.status
            )),
            Ok(_) => {
                if !self.project_dir.join(LOCK_FILE).exists() {
                    ResolverCapability::Unavailable("no lock file to resolve against".to_string())
                } else {
                    ResolverCapability::Available
                }
            }
        }
    }

    fn root_requirements(&self) -> Vec<Requirement> {
        self.requirements.clone()
    }

    fn install_requirements(&mut self, requirements: Vec<Requirement>) {
        self.requirements = requirements;
    }

    fn simulate_update(&mut self) -> Result<SimulationStatus, ResolverError> {
        let staged = self.stage()?;
        let output = Command::new(&self.binary)
            .args(SIMULATE_ARGS)
            .current_dir(staged.path())
            .output()
            .map_err(|e| ResolverError::Spawn {
                command: format!("{} {}", self.binary, SIMULATE_ARGS.join(" ")),
                source: e,
            })?;

        let mut diagnostics = String::from_utf8_lossy(&output.stderr).into_owned();
        if diagnostics.trim().is_empty() {
            diagnostics = String::from_utf8_lossy(&output.stdout).into_owned();
        }

        Ok(SimulationStatus {
            code: output.status.code().unwrap_or(-1),
            diagnostics,
        })
    }
}
