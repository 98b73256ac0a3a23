//! Core domain models for phpup
//!
//! This module contains the fundamental types used throughout the application:
//! - Stability channels and their ordering
//! - Version constraint expressions
//! - Manifest entries and the platform-package predicate
//! - Proposed changes and validation outcomes

mod change;
mod constraint;
mod dependency;
mod stability;

pub use change::{ProposedChange, ValidationOutcome};
pub use constraint::{caret, parse_version_lenient, Constraint, ConstraintOp};
pub use dependency::{is_platform_package, ManifestEntry};
pub use stability::Stability;
