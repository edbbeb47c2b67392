//! Requirement string parsing.
//!
//! A requirement names one Python distribution and optionally constrains its
//! version, following the PEP 508 shape:
//!
//! ```text
//! name [ "[" extras "]" ] [ specifier | "(" specifier ")" | "@" url ] [ ";" marker ]
//! ```
//!
//! Extras, URLs and markers are validated and kept, but only the name and
//! the version specifier take part in a check.
//!
//! # Example
//!
//! ```
//! use pyreq::requirements::Requirement;
//!
//! let req: Requirement = "pybind11>=2.10,<3".parse().unwrap();
//! assert_eq!(req.name(), "pybind11");
//! assert_eq!(req.specifier(), "<3,>=2.10");
//! assert!(req.has_specifier());
//! ```

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use pep440_rs::VersionSpecifiers;
use regex::Regex;

use crate::error::{CheckError, Result};

/// Leading name, optional extras, and whatever follows.
static REQUIREMENT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([A-Za-z0-9][A-Za-z0-9._-]*)\s*(?:\[([^\]]*)\])?\s*(.*?)\s*$").unwrap()
});

/// A valid PEP 508 distribution or extra name.
static NAME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z0-9]|[A-Za-z0-9][A-Za-z0-9._-]*[A-Za-z0-9])$").unwrap()
});

/// Runs of separators collapsed during name normalization.
static SEPARATOR_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[-_.]+").unwrap());

/// Normalize a distribution name per PEP 503.
///
/// `Foo_Bar.baz` and `foo-bar-baz` name the same distribution.
pub fn normalize_name(name: &str) -> String {
    SEPARATOR_REGEX
        .replace_all(name, "-")
        .to_ascii_lowercase()
}

/// A parsed requirement.
///
/// Immutable once constructed.
#[derive(Debug, Clone)]
pub struct Requirement {
    name: String,
    normalized_name: String,
    extras: Vec<String>,
    specifier: String,
    specifiers: Option<VersionSpecifiers>,
    url: Option<String>,
    marker: Option<String>,
}

impl Requirement {
    /// Parse a requirement string.
    pub fn parse(input: &str) -> Result<Self> {
        let malformed = |reason: String| CheckError::MalformedRequirement {
            input: input.to_string(),
            reason,
        };

        let caps = REQUIREMENT_REGEX
            .captures(input)
            .ok_or_else(|| malformed("expected a package name".to_string()))?;

        let name = caps.get(1).map_or("", |m| m.as_str());
        if !NAME_REGEX.is_match(name) {
            return Err(malformed(format!("invalid package name '{}'", name)));
        }

        let extras = match caps.get(2) {
            Some(m) => parse_extras(m.as_str()).map_err(&malformed)?,
            None => Vec::new(),
        };

        let rest = caps.get(3).map_or("", |m| m.as_str());
        let (url, spec_part, marker) = if let Some(after_at) = rest.strip_prefix('@') {
            let (url, marker) = split_url_marker(after_at.trim());
            if url.is_empty() {
                return Err(malformed("expected a URL after '@'".to_string()));
            }
            (Some(url.to_string()), "", marker)
        } else {
            let (spec, marker) = match rest.split_once(';') {
                Some((spec, marker)) => (spec, Some(marker)),
                None => (rest, None),
            };
            (None, spec, marker)
        };

        let marker = match marker.map(str::trim) {
            Some("") => return Err(malformed("expected a marker after ';'".to_string())),
            Some(m) => Some(m.to_string()),
            None => None,
        };

        let specifier = strip_parens(spec_part.trim()).map_err(&malformed)?;
        let compact: String = specifier.chars().filter(|c| !c.is_whitespace()).collect();
        let specifiers = if compact.is_empty() {
            None
        } else {
            Some(
                VersionSpecifiers::from_str(&compact)
                    .map_err(|err| malformed(first_line(&err.to_string())))?,
            )
        };
        let specifier = canonical_specifier(&compact);

        Ok(Self {
            normalized_name: normalize_name(name),
            name: name.to_string(),
            extras,
            specifier,
            specifiers,
            url,
            marker,
        })
    }

    /// The package name as written.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The PEP 503 normalized name.
    pub fn normalized_name(&self) -> &str {
        &self.normalized_name
    }

    /// Requested extras.
    pub fn extras(&self) -> &[String] {
        &self.extras
    }

    /// The version specifier text in canonical form: whitespace removed,
    /// clauses sorted and deduplicated. Empty when unconstrained.
    pub fn specifier(&self) -> &str {
        &self.specifier
    }

    /// Parsed version specifiers, `None` when unconstrained.
    pub fn specifiers(&self) -> Option<&VersionSpecifiers> {
        self.specifiers.as_ref()
    }

    /// Whether the requirement constrains the version.
    pub fn has_specifier(&self) -> bool {
        self.specifiers.is_some()
    }

    /// Direct URL reference, if given with `@`.
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Environment marker text, if any.
    pub fn marker(&self) -> Option<&str> {
        self.marker.as_deref()
    }
}

impl FromStr for Requirement {
    type Err = CheckError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.extras.is_empty() {
            write!(f, "[{}]", self.extras.join(","))?;
        }
        if let Some(url) = &self.url {
            write!(f, " @ {}", url)?;
        }
        write!(f, "{}", self.specifier)?;
        if let Some(marker) = &self.marker {
            write!(f, "; {}", marker)?;
        }
        Ok(())
    }
}

/// Sort and deduplicate the clauses of whitespace-free specifier text, the
/// way pip tooling prints a specifier set.
fn canonical_specifier(compact: &str) -> String {
    if compact.is_empty() {
        return String::new();
    }
    let mut clauses: Vec<&str> = compact.split(',').collect();
    clauses.sort_unstable();
    clauses.dedup();
    clauses.join(",")
}

fn parse_extras(raw: &str) -> std::result::Result<Vec<String>, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(Vec::new());
    }
    raw.split(',')
        .map(str::trim)
        .map(|extra| {
            if NAME_REGEX.is_match(extra) {
                Ok(extra.to_string())
            } else {
                Err(format!("invalid extra name '{}'", extra))
            }
        })
        .collect()
}

/// Split `url ; marker`. The marker separator must follow whitespace, since
/// `;` may legally appear inside a URL.
fn split_url_marker(raw: &str) -> (&str, Option<&str>) {
    for (idx, _) in raw.match_indices(';') {
        if raw[..idx].ends_with(char::is_whitespace) {
            return (raw[..idx].trim_end(), Some(&raw[idx + 1..]));
        }
    }
    (raw, None)
}

/// Specifier parse errors may render the input with caret markers on
/// following lines; diagnostics are a single line.
fn first_line(message: &str) -> String {
    message
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or(message)
        .trim_end_matches(':')
        .to_string()
}

fn strip_parens(spec: &str) -> std::result::Result<&str, String> {
    match (spec.strip_prefix('('), spec.ends_with(')')) {
        (Some(inner), true) => Ok(inner[..inner.len() - 1].trim()),
        (Some(_), false) => Err("unclosed '(' in version specifier".to_string()),
        (None, _) => Ok(spec),
    }
}
