//! Requirement parsing, resolution and checking.
//!
//! This module answers one question: is a version of the named Python
//! package that satisfies the requirement available in the environment?
//!
//! # Modules
//!
//! - [`requirement`] - Requirement string parsing and name normalization
//! - [`probe`] - Interpreter query for the search path, and module import
//! - [`metadata`] - Installed distribution records (`.dist-info`, `.egg-info`)
//! - [`module`] - Importable-module lookup and `__version__` introspection
//! - [`checker`] - Tiered resolution and specifier evaluation
//! - [`status`] - Resolution and outcome types

pub mod checker;
pub mod metadata;
pub mod module;
pub mod probe;
pub mod requirement;
pub mod status;

pub use checker::{satisfies, RequirementChecker};
pub use probe::PythonEnvironment;
pub use requirement::{normalize_name, Requirement};
pub use status::{CheckOutcome, Resolution, ResolvedVersion, VersionSource, UNKNOWN_VERSION};
