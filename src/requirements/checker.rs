//! Requirement checker.
//!
//! The `RequirementChecker` resolves one requirement against a Python
//! environment and decides whether the found version satisfies it.
//!
//! Resolution is tiered and short-circuiting:
//!
//! 1. installed distribution metadata (authoritative)
//! 2. module introspection, for packages on the search path that were
//!    never registered by an installer (vendored or path-injected code);
//!    the module is imported in the queried interpreter, or read statically
//!    when only a search path was given
//! 3. failure
//!
//! A module with no readable version passes only when the requirement has
//! no specifier; the version is then reported as `unknown`.

use std::str::FromStr;

use pep440_rs::{Version, VersionSpecifiers};

use super::metadata::find_distribution;
use super::module::{introspect, IntrospectedModule};
use super::probe::PythonEnvironment;
use super::requirement::Requirement;
use super::status::{CheckOutcome, Resolution, ResolvedVersion, VersionSource};
use crate::error::{CheckError, Result};

/// Checks requirements against one Python environment.
pub struct RequirementChecker<'a> {
    env: &'a PythonEnvironment,
}

impl<'a> RequirementChecker<'a> {
    /// Create a new checker.
    pub fn new(env: &'a PythonEnvironment) -> Self {
        Self { env }
    }

    /// Find the package through the lookup tiers.
    ///
    /// Fails only when the interpreter cannot be run or importing the module
    /// raises something other than `ImportError`.
    pub fn resolve(&self, requirement: &Requirement) -> Result<Resolution> {
        if let Some(dist) = find_distribution(self.env.search_path(), requirement.normalized_name())
        {
            tracing::debug!(
                "{} {} installed at {}",
                dist.name,
                dist.version,
                dist.record.display()
            );
            return Ok(Resolution::Installed {
                version: dist.version,
                record: dist.record,
            });
        }

        let resolution = match introspect(self.env, requirement.name())? {
            Some(IntrospectedModule { location, version }) => {
                tracing::debug!(
                    "{} is not installed but importable ({:?}), version {:?}",
                    requirement.name(),
                    location.kind,
                    version
                );
                Resolution::Introspected {
                    version,
                    module: location,
                }
            }
            None => {
                tracing::debug!("{} is neither installed nor importable", requirement.name());
                Resolution::Unresolvable
            }
        };
        Ok(resolution)
    }

    /// Resolve the requirement and check its specifier.
    pub fn check(&self, requirement: &Requirement) -> Result<CheckOutcome> {
        let (version, source) = match self.resolve(requirement)? {
            Resolution::Installed { version, .. } => {
                (ResolvedVersion::Known(version), VersionSource::Installed)
            }
            Resolution::Introspected {
                version: Some(version),
                ..
            } => (ResolvedVersion::Known(version), VersionSource::Introspected),
            Resolution::Introspected { version: None, .. } => {
                if requirement.has_specifier() {
                    return Err(CheckError::VersionIndeterminate {
                        name: requirement.name().to_string(),
                        specifier: requirement.specifier().to_string(),
                    });
                }
                (ResolvedVersion::Unknown, VersionSource::Introspected)
            }
            Resolution::Unresolvable => {
                return Err(CheckError::PackageUnresolvable {
                    name: requirement.name().to_string(),
                });
            }
        };

        if !satisfies(&version, requirement.specifiers()) {
            return Err(CheckError::SpecifierUnsatisfied {
                name: requirement.name().to_string(),
                version: version.to_string(),
                specifier: requirement.specifier().to_string(),
            });
        }

        Ok(CheckOutcome {
            name: requirement.name().to_string(),
            version,
            source,
        })
    }
}

/// Whether `version` satisfies every clause of `specifiers`.
///
/// Prereleases count as candidates. An unknown version bypasses the
/// comparison, and a missing specifier accepts anything. A version string
/// that is not valid PEP 440 cannot satisfy a specifier.
pub fn satisfies(version: &ResolvedVersion, specifiers: Option<&VersionSpecifiers>) -> bool {
    let (ResolvedVersion::Known(raw), Some(specifiers)) = (version, specifiers) else {
        return true;
    };

    match Version::from_str(raw) {
        Ok(parsed) => specifiers
            .iter()
            .all(|specifier| specifier.contains(&parsed)),
        Err(err) => {
            tracing::debug!("Cannot compare invalid version '{}': {}", raw, err);
            false
        }
    }
}
