//! pyreq - Python dependency-requirement checker.
//!
//! pyreq answers one preflight question for a build: is a version of a
//! Python package that satisfies a requirement available in the target
//! environment? It never installs or modifies anything.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Runtime configuration collected at startup
//! - [`error`] - Error types and result aliases
//! - [`requirements`] - Requirement parsing, resolution and checking
//! - [`ui`] - Version and diagnostic reporting
//!
//! # Example
//!
//! ```
//! use pyreq::requirements::{PythonEnvironment, Requirement, RequirementChecker};
//!
//! let dir = tempfile::tempdir().unwrap();
//! std::fs::write(dir.path().join("vendored.py"), "__version__ = '1.4.0'\n").unwrap();
//!
//! let env = PythonEnvironment::from_search_path(vec![dir.path().to_path_buf()]);
//! let requirement = Requirement::parse("vendored>=1.2").unwrap();
//! let outcome = RequirementChecker::new(&env).check(&requirement).unwrap();
//! assert_eq!(outcome.version.as_str(), "1.4.0");
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod requirements;
pub mod ui;

pub use config::Config;
pub use error::{CheckError, Result};

use requirements::{CheckOutcome, Requirement, RequirementChecker};

/// Parse `input`, probe the environment and check the requirement.
///
/// The requirement is parsed before the environment is probed, so a
/// malformed requirement fails without running an interpreter.
pub fn check_requirement(input: &str, config: &Config) -> Result<CheckOutcome> {
    let requirement = Requirement::parse(input)?;
    tracing::debug!("Checking requirement {}", requirement);

    let env = config.environment()?;
    RequirementChecker::new(&env).check(&requirement)
}
