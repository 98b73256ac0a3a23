//! Version constraint expressions
//!
//! Handles the constraint syntax found in composer.json require sections:
//! - Caret ranges: `^1.2.3`
//! - Tilde ranges: `~1.2`
//! - Comparison operators: `>=1.0`, `>1.0`, `<=2.0`, `<2.0`
//! - Exact versions: `1.2.3`, `=1.2.3`
//! - Wildcards: `1.2.*`, `*`
//! - Compound ranges: `>=1.0 <2.0`, `>=1.0,<2.0`
//!
//! Branch constraints (`dev-master`) are not versioned expressions and do
//! not parse; callers skip such entries per package.

use semver::{Version, VersionReq};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The operator shape of a constraint expression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintOp {
    /// Caret range (`^1.2.3`) - compatible within major version
    Caret,
    /// Tilde range (`~1.2.3`) - compatible within minor version
    Tilde,
    /// Greater than or equal (`>=1.2.3`)
    GreaterOrEqual,
    /// Greater than (`>1.2.3`)
    Greater,
    /// Less than or equal (`<=1.2.3`)
    LessOrEqual,
    /// Less than (`<1.2.3`)
    Less,
    /// Exact version (`1.2.3`, `=1.2.3`)
    Exact,
    /// Wildcard (`1.2.*`)
    Wildcard,
    /// Compound range (`>=1.0 <2.0`)
    Range,
    /// Any version (`*`)
    Any,
}

/// A parsed constraint: the raw text, its operator, and its base version
/// literal (the first version mentioned, with range operators stripped)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constraint {
    /// The constraint exactly as it appears in the manifest
    pub raw: String,
    /// The operator shape
    pub op: ConstraintOp,
    /// The base version literal, without operator or leading `v`
    pub version: String,
}

impl Constraint {
    /// Parse a constraint expression. Returns `None` for expressions that
    /// carry no version literal (branch constraints, aliases).
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }

        if trimmed == "*" {
            return Some(Self {
                raw: raw.to_string(),
                op: ConstraintOp::Any,
                version: String::new(),
            });
        }

        // Compound expressions: AND-separated by whitespace or commas,
        // OR-separated by pipes. The base version comes from the first part.
        let first = trimmed
            .split(|c: char| c.is_whitespace() || c == ',' || c == '|')
            .find(|p| !p.is_empty())?;
        let compound = first.len() < trimmed.len();

        let (op, rest) = split_operator(first);
        let version = normalize_literal(rest)?;

        let op = if compound {
            ConstraintOp::Range
        } else if rest.contains('*') || rest.ends_with(".x") {
            ConstraintOp::Wildcard
        } else {
            op
        };

        Some(Self {
            raw: raw.to_string(),
            op,
            version,
        })
    }

    /// The base version as a semantic version, padded to three components
    pub fn base_version(&self) -> Option<Version> {
        if self.version.is_empty() {
            return None;
        }
        parse_version_lenient(&self.version)
    }

    /// A `semver::VersionReq` for satisfaction checks, where the raw
    /// expression is expressible in that syntax
    pub fn to_req(&self) -> Option<VersionReq> {
        if self.op == ConstraintOp::Any {
            return Some(VersionReq::STAR);
        }
        let raw = self.raw.trim();
        if let Ok(req) = VersionReq::parse(raw) {
            return Some(req);
        }
        // Composer separates AND clauses with spaces; VersionReq wants commas
        let joined = raw
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(", ");
        VersionReq::parse(&joined).ok()
    }

    /// Returns true if `version` satisfies this constraint
    pub fn matches(&self, version: &Version) -> bool {
        self.to_req().map(|req| req.matches(version)).unwrap_or(false)
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

/// The canonical constraint text for a version: `^<version>`, never with a
/// leading `v`
pub fn caret(version: &Version) -> String {
    format!("^{}", version)
}

/// Split a single constraint token into its operator and version remainder
fn split_operator(token: &str) -> (ConstraintOp, &str) {
    for (prefix, op) in [
        (">=", ConstraintOp::GreaterOrEqual),
        ("<=", ConstraintOp::LessOrEqual),
        ("==", ConstraintOp::Exact),
        ("^", ConstraintOp::Caret),
        ("~", ConstraintOp::Tilde),
        (">", ConstraintOp::Greater),
        ("<", ConstraintOp::Less),
        ("=", ConstraintOp::Exact),
    ] {
        if let Some(rest) = token.strip_prefix(prefix) {
            return (op, rest.trim());
        }
    }
    (ConstraintOp::Exact, token)
}

/// Normalize a version literal: strip a leading `v`, resolve wildcards to
/// their base, and reject non-numeric remainders
fn normalize_literal(literal: &str) -> Option<String> {
    let literal = literal.trim();
    let literal = literal
        .strip_prefix('v')
        .or_else(|| literal.strip_prefix('V'))
        .unwrap_or(literal);

    // `1.2.*` bases at `1.2`; a bare `*` was handled by the caller
    let literal = literal.trim_end_matches(".*").trim_end_matches(".x");

    if literal.is_empty() || !literal.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    Some(literal.to_string())
}

/// Parse a version string leniently: tolerates a leading `v` and missing
/// minor/patch components (`1.2` parses as `1.2.0`)
pub fn parse_version_lenient(s: &str) -> Option<Version> {
    let s = s.trim();
    let s = s
        .strip_prefix('v')
        .or_else(|| s.strip_prefix('V'))
        .unwrap_or(s);

    if let Ok(v) = Version::parse(s) {
        return Some(v);
    }

    // Pad the numeric core to three components, keeping pre-release and
    // build suffixes attached
    let (core, build) = match s.split_once('+') {
        Some((c, b)) => (c, Some(b)),
        None => (s, None),
    };
    let (core, pre) = match core.split_once('-') {
        Some((c, p)) => (c, Some(p)),
        None => (core, None),
    };

    let mut parts: Vec<&str> = core.split('.').collect();
    if parts.is_empty() || parts.len() > 3 {
        return None;
    }
    while parts.len() < 3 {
        parts.push("0");
    }

    let mut rebuilt = parts.join(".");
    if let Some(pre) = pre {
        rebuilt.push('-');
        rebuilt.push_str(pre);
    }
    if let Some(build) = build {
        rebuilt.push('+');
        rebuilt.push_str(build);
    }
    Version::parse(&rebuilt).ok()
}
