//! Resolution and outcome types for requirement checks.
//!
//! The resolver produces a [`Resolution`] saying which tier found the
//! package; the checker turns it into a [`CheckOutcome`] once the version
//! has been compared against the specifier.

use std::fmt;
use std::path::PathBuf;

use super::module::ModuleLocation;

/// Literal printed when no version could be determined and none was required.
pub const UNKNOWN_VERSION: &str = "unknown";

/// Result of the tiered package lookup.
#[derive(Debug, Clone)]
pub enum Resolution {
    /// Found an installed distribution record.
    Installed {
        /// Version from the record's metadata.
        version: String,
        /// The `.dist-info` or `.egg-info` entry.
        record: PathBuf,
    },

    /// Not installed, but importable as a module.
    Introspected {
        /// The module's self-reported `__version__`, if readable.
        version: Option<String>,
        /// Where the module was found.
        module: ModuleLocation,
    },

    /// Neither installed nor importable.
    Unresolvable,
}

impl Resolution {
    /// The version found by the lookup, if any.
    pub fn version(&self) -> Option<&str> {
        match self {
            Resolution::Installed { version, .. } => Some(version),
            Resolution::Introspected { version, .. } => version.as_deref(),
            Resolution::Unresolvable => None,
        }
    }
}

/// The version reported for a package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedVersion {
    /// A concrete version string.
    Known(String),
    /// No version identifier was available and none was required.
    Unknown,
}

impl ResolvedVersion {
    /// Whether the version check was bypassed.
    pub fn is_unknown(&self) -> bool {
        matches!(self, ResolvedVersion::Unknown)
    }

    /// The version string, or [`UNKNOWN_VERSION`].
    pub fn as_str(&self) -> &str {
        match self {
            ResolvedVersion::Known(version) => version,
            ResolvedVersion::Unknown => UNKNOWN_VERSION,
        }
    }
}

impl fmt::Display for ResolvedVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which lookup tier produced the version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionSource {
    /// Installed distribution metadata.
    Installed,
    /// Module introspection.
    Introspected,
}

/// A satisfied requirement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutcome {
    /// The package name as requested.
    pub name: String,
    /// The version to report.
    pub version: ResolvedVersion,
    /// Where the version came from.
    pub source: VersionSource,
}
