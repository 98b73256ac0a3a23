//! Application error types using thiserror
//!
//! Error hierarchy:
//! - SetupError: fatal conditions detected before planning starts
//! - ManifestError: issues with composer.json parsing and editing
//! - OracleError: issues with Packagist communication (per-package)
//! - ResolverError: issues invoking the composer resolver

use std::path::PathBuf;
use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Fatal session setup errors
    #[error(transparent)]
    Setup(#[from] SetupError),

    /// Manifest file related errors
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// Version oracle related errors
    #[error(transparent)]
    Oracle(#[from] OracleError),

    /// Resolver invocation errors
    #[error(transparent)]
    Resolver(#[from] ResolverError),
}

/// Fatal errors that abort the session before any planning happens
#[derive(Error, Debug)]
pub enum SetupError {
    /// composer.json does not exist at the target path
    #[error("composer.json not found in {path}")]
    ManifestMissing { path: PathBuf },

    /// composer.json exists but cannot be parsed
    #[error("failed to parse {path}: {message}")]
    ManifestUnreadable { path: PathBuf, message: String },

    /// composer.lock is required for a non-dry-run session
    #[error("composer.lock not found in {path}; run `composer install` first or pass --dry-run")]
    LockMissing { path: PathBuf },
}

/// Errors related to manifest file operations
#[derive(Error, Debug)]
pub enum ManifestError {
    /// Failed to read the manifest file
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write the manifest file
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON parsing error
    #[error("failed to parse JSON in {path}: {message}")]
    Parse { path: PathBuf, message: String },

    /// The manifest carries no require object at all
    #[error("{path} has no require section")]
    NoRequireSection { path: PathBuf },

    /// A constraint rewrite targeted a package the manifest does not declare
    #[error("package '{package}' not declared in {path}")]
    UnknownPackage { path: PathBuf, package: String },

    /// A declared constraint could not be parsed
    #[error("invalid constraint '{constraint}' for '{package}': {message}")]
    InvalidConstraint {
        package: String,
        constraint: String,
        message: String,
    },
}

/// Errors related to Packagist communication
#[derive(Error, Debug)]
pub enum OracleError {
    /// Package not found on Packagist
    #[error("package '{package}' not found on Packagist")]
    PackageNotFound { package: String },

    /// Network request failed
    #[error("failed to fetch '{package}': {message}")]
    Network { package: String, message: String },

    /// Rate limit exceeded
    #[error("rate limit exceeded while fetching '{package}'")]
    RateLimited { package: String },

    /// Request timed out
    #[error("timeout while fetching '{package}'")]
    Timeout { package: String },

    /// Response body could not be interpreted
    #[error("invalid Packagist response for '{package}': {message}")]
    InvalidResponse { package: String, message: String },
}

/// Errors raised while invoking the external resolver
#[derive(Error, Debug)]
pub enum ResolverError {
    /// The resolver process could not be spawned
    #[error("failed to run {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// Staging the trial project failed
    #[error("failed to stage trial project: {message}")]
    Staging { message: String },
}

impl ManifestError {
    /// Creates a Read error
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ManifestError::Read {
            path: path.into(),
            source,
        }
    }

    /// Creates a Write error
    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ManifestError::Write {
            path: path.into(),
            source,
        }
    }

    /// Creates a Parse error
    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        ManifestError::Parse {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates an UnknownPackage error
    pub fn unknown_package(path: impl Into<PathBuf>, package: impl Into<String>) -> Self {
        ManifestError::UnknownPackage {
            path: path.into(),
            package: package.into(),
        }
    }
}

impl OracleError {
    /// Creates a PackageNotFound error
    pub fn not_found(package: impl Into<String>) -> Self {
        OracleError::PackageNotFound {
            package: package.into(),
        }
    }

    /// Creates a Network error
    pub fn network(package: impl Into<String>, message: impl Into<String>) -> Self {
        OracleError::Network {
            package: package.into(),
            message: message.into(),
        }
    }

    /// Creates an InvalidResponse error
    pub fn invalid_response(package: impl Into<String>, message: impl Into<String>) -> Self {
        OracleError::InvalidResponse {
            package: package.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_error_manifest_missing() {
        let err = SetupError::ManifestMissing {
            path: PathBuf::from("/srv/app"),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("composer.json not found"));
        assert!(msg.contains("/srv/app"));
    }

    #[test]
    fn test_setup_error_lock_missing_mentions_dry_run() {
        let err = SetupError::LockMissing {
            path: PathBuf::from("/srv/app"),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("composer.lock not found"));
        assert!(msg.contains("--dry-run"));
    }

    #[test]
    fn test_manifest_error_parse() {
        let err = ManifestError::parse("/srv/app/composer.json", "unexpected token");
        let msg = format!("{}", err);
        assert!(msg.contains("failed to parse JSON"));
        assert!(msg.contains("unexpected token"));
    }

    #[test]
    fn test_manifest_error_unknown_package() {
        let err = ManifestError::unknown_package("/srv/app/composer.json", "acme/widgets");
        let msg = format!("{}", err);
        assert!(msg.contains("acme/widgets"));
        assert!(msg.contains("not declared"));
    }

    #[test]
    fn test_oracle_error_not_found() {
        let err = OracleError::not_found("acme/missing");
        let msg = format!("{}", err);
        assert!(msg.contains("'acme/missing' not found"));
    }

    #[test]
    fn test_oracle_error_network() {
        let err = OracleError::network("monolog/monolog", "connection refused");
        let msg = format!("{}", err);
        assert!(msg.contains("failed to fetch"));
        assert!(msg.contains("connection refused"));
    }

    #[test]
    fn test_resolver_error_spawn() {
        let err = ResolverError::Spawn {
            command: "composer update --dry-run".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("failed to run composer update"));
    }

    #[test]
    fn test_app_error_from_setup_error() {
        let err: AppError = SetupError::ManifestMissing {
            path: PathBuf::from("/x"),
        }
        .into();
        assert!(format!("{}", err).contains("composer.json not found"));
    }

    #[test]
    fn test_app_error_from_oracle_error() {
        let err: AppError = OracleError::not_found("a/b").into();
        assert!(format!("{}", err).contains("not found on Packagist"));
    }
}
