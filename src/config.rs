//! Runtime configuration.
//!
//! Everything the check reads from outside its arguments is collected here
//! once at startup: CLI flags, `PYREQ_PYTHON` (through clap) and `NO_COLOR`.
//! Nothing else in the crate reads the process environment.

use std::path::PathBuf;

use crate::cli::Cli;
use crate::error::Result;
use crate::requirements::PythonEnvironment;

/// Environment variable that disables colored output when non-empty.
pub const NO_COLOR_VAR: &str = "NO_COLOR";

/// Settings for one check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Whether diagnostics are colored.
    pub color: bool,
    /// Interpreter queried for the search path.
    pub python: String,
    /// Explicit search path; when non-empty the interpreter is not queried.
    pub search_path: Vec<PathBuf>,
}

impl Config {
    /// Build configuration from parsed arguments and the process environment.
    pub fn from_cli(cli: &Cli) -> Self {
        Self::from_cli_with_env(cli, |key: &str| std::env::var(key))
    }

    /// Build configuration with a custom env var lookup function.
    ///
    /// This allows testing without modifying actual environment variables.
    pub fn from_cli_with_env<F>(cli: &Cli, env_fn: F) -> Self
    where
        F: Fn(&str) -> std::result::Result<String, std::env::VarError>,
    {
        Self {
            color: !cli.no_color && !no_color_requested(&env_fn),
            python: cli.python.clone(),
            search_path: cli.search_path.clone(),
        }
    }

    /// Discover the Python environment to inspect.
    pub fn environment(&self) -> Result<PythonEnvironment> {
        if self.search_path.is_empty() {
            PythonEnvironment::query(&self.python)
        } else {
            tracing::debug!("Using explicit search path: {:?}", self.search_path);
            Ok(PythonEnvironment::from_search_path(self.search_path.clone()))
        }
    }
}

/// Whether `NO_COLOR` is set to a non-empty value (<https://no-color.org/>).
pub fn no_color_requested<F>(env_fn: &F) -> bool
where
    F: Fn(&str) -> std::result::Result<String, std::env::VarError>,
{
    env_fn(NO_COLOR_VAR).is_ok_and(|value| !value.is_empty())
}
