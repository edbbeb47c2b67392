//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::Parser;
use std::path::PathBuf;

/// Check that a Python package requirement is met.
///
/// Prints the installed version on stdout and exits 0 when the requirement
/// is satisfied, 1 otherwise.
#[derive(Debug, Parser)]
#[command(name = "pyreq")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Requirement to check, e.g. "numpy" or "pybind11>=2.10,<3"
    pub requirement: String,

    /// Python interpreter queried for its module search path
    #[arg(long, env = "PYREQ_PYTHON", default_value = "python3")]
    pub python: String,

    /// Search this directory instead of querying the interpreter (repeatable)
    #[arg(long = "search-path", value_name = "DIR")]
    pub search_path: Vec<PathBuf>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}
