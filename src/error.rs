//! Error types for requirement checks.
//!
//! This module defines [`CheckError`], the error type used throughout the
//! crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - The four check failures (`MalformedRequirement`, `PackageUnresolvable`,
//!   `VersionIndeterminate`, `SpecifierUnsatisfied`) are terminal and exit 1
//! - Anything else is a fault in the environment and exits 2
//! - Use `anyhow::Error` (via `CheckError::Other`) for unexpected errors

use thiserror::Error;

/// Exit status for a requirement that is not met.
pub const EXIT_UNMET: u8 = 1;

/// Exit status for faults outside the check taxonomy.
pub const EXIT_FAULT: u8 = 2;

/// Core error type for requirement checks.
#[derive(Debug, Error)]
pub enum CheckError {
    /// The requirement string does not parse as a name plus specifier.
    #[error("Invalid requirement '{input}': {reason}")]
    MalformedRequirement { input: String, reason: String },

    /// The package is neither installed nor importable.
    #[error("Package {name} cannot be imported.")]
    PackageUnresolvable { name: String },

    /// The module imports but exposes no version while a specifier is set.
    #[error(
        "Package {name} can be imported, but cannot determine version from module while requirement {specifier} is specified."
    )]
    VersionIndeterminate { name: String, specifier: String },

    /// A version was found but fails the specifier.
    #[error(
        "Package {name} is installed (version {version}) but does not satisfy the requirement: {name}{specifier}"
    )]
    SpecifierUnsatisfied {
        name: String,
        version: String,
        specifier: String,
    },

    /// The Python interpreter could not be queried or could not import the module.
    #[error("Failed to probe the Python environment: {message}")]
    EnvironmentProbe { message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CheckError {
    /// Process exit status for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            CheckError::MalformedRequirement { .. }
            | CheckError::PackageUnresolvable { .. }
            | CheckError::VersionIndeterminate { .. }
            | CheckError::SpecifierUnsatisfied { .. } => EXIT_UNMET,
            CheckError::EnvironmentProbe { .. } | CheckError::Io(_) | CheckError::Other(_) => {
                EXIT_FAULT
            }
        }
    }

    /// The version that was resolved before the check failed, if any.
    ///
    /// Only an unsatisfied specifier carries one; callers still print it so
    /// the found version can be logged next to the failure.
    pub fn resolved_version(&self) -> Option<&str> {
        match self {
            CheckError::SpecifierUnsatisfied { version, .. } => Some(version),
            _ => None,
        }
    }
}

/// Result type alias for requirement checks.
pub type Result<T> = std::result::Result<T, CheckError>;
