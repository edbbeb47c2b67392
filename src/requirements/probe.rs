//! Python environment probe.
//!
//! Two things are asked of the target interpreter. The first query returns
//! the ordered module search path (`sys.path`), which the installed-metadata
//! lookup walks without running any package code. The second imports one
//! module and reports its `__version__`, so versions computed at import time
//! and versions set by extension modules are seen the way Python sees them.
//!
//! When the search path is given explicitly no interpreter is run at all,
//! and module versions are read statically instead.
//!
//! # Example
//!
//! ```no_run
//! use pyreq::requirements::probe::PythonEnvironment;
//!
//! let env = PythonEnvironment::query("python3").unwrap();
//! for dir in env.search_path() {
//!     println!("search path entry: {}", dir.display());
//! }
//! ```

use std::path::{Path, PathBuf};
use std::process::Command;

use serde::Deserialize;

use crate::error::{CheckError, Result};

/// Script run by the interpreter; prints one JSON object on stdout.
const QUERY_SCRIPT: &str = "import json, sys; print(json.dumps({'path': sys.path}))";

/// Imports `sys.argv[1]` and prints one JSON report on the real stdout.
///
/// Anything the module prints while importing goes to stderr. Import errors
/// become a `found: false` report; any other exception fails the run.
const IMPORT_SCRIPT: &str = r#"import importlib, json, sys
out, sys.stdout = sys.stdout, sys.stderr
sys.path[:] = [entry for entry in sys.path if entry]
try:
    module = importlib.import_module(sys.argv[1])
except ImportError as exc:
    report = {'found': False, 'reason': str(exc)}
else:
    version = getattr(module, '__version__', None)
    report = {
        'found': True,
        'version': None if version is None else str(version),
        'origin': getattr(module, '__file__', None),
    }
out.write(json.dumps(report) + '\n')
out.flush()
"#;

/// The interpreter's answer to [`QUERY_SCRIPT`].
#[derive(Debug, Deserialize)]
struct InterpreterInfo {
    path: Vec<String>,
}

/// The interpreter's answer to [`IMPORT_SCRIPT`].
#[derive(Debug, Deserialize)]
struct ImportReport {
    found: bool,
    #[serde(default)]
    reason: Option<String>,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    origin: Option<PathBuf>,
}

/// A module the interpreter imported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedModule {
    /// `str(module.__version__)`, when the attribute exists and is not `None`.
    pub version: Option<String>,
    /// `module.__file__`; absent for namespace and built-in modules.
    pub origin: Option<PathBuf>,
}

impl ImportedModule {
    /// Decode the report printed by the import script.
    ///
    /// Returns `None` when the module could not be imported. Only the last
    /// non-empty line is decoded, so stray output from native code that
    /// bypasses `sys.stdout` is ignored.
    pub fn from_report(name: &str, stdout: &str) -> Result<Option<Self>> {
        let line = stdout
            .lines()
            .rev()
            .find(|line| !line.trim().is_empty())
            .unwrap_or_default();
        let report: ImportReport =
            serde_json::from_str(line.trim()).map_err(|e| CheckError::EnvironmentProbe {
                message: format!("unexpected import report for {}: {}", name, e),
            })?;

        if !report.found {
            tracing::debug!(
                "Importing {} failed: {}",
                name,
                report.reason.as_deref().unwrap_or("no reason given")
            );
            return Ok(None);
        }

        Ok(Some(Self {
            version: report.version,
            origin: report.origin,
        }))
    }
}

/// The module search context of one Python environment.
#[derive(Debug, Clone, Default)]
pub struct PythonEnvironment {
    /// Directories searched for distribution records and modules, in order.
    search_path: Vec<PathBuf>,
    /// Interpreter the search path came from, if one was queried.
    interpreter: Option<PathBuf>,
}

impl PythonEnvironment {
    /// Build an environment from an explicit search path, without querying
    /// an interpreter.
    pub fn from_search_path(search_path: Vec<PathBuf>) -> Self {
        Self {
            search_path,
            interpreter: None,
        }
    }

    /// Query an interpreter for its search path.
    ///
    /// `python` is either a path or a bare command name looked up on PATH.
    pub fn query(python: &str) -> Result<Self> {
        let interpreter = resolve_interpreter(python);
        tracing::debug!("Querying interpreter {}", interpreter.display());

        let stdout = run_script(&interpreter, QUERY_SCRIPT, &[])?;
        let mut env = Self::from_query_output(&stdout)?;
        env.interpreter = Some(interpreter);
        Ok(env)
    }

    /// Decode the JSON printed by the interpreter query.
    ///
    /// Empty entries (the interpreter's working-directory marker for `-c`)
    /// are dropped.
    pub fn from_query_output(stdout: &str) -> Result<Self> {
        let info: InterpreterInfo =
            serde_json::from_str(stdout.trim()).map_err(|e| CheckError::EnvironmentProbe {
                message: format!("unexpected interpreter output: {}", e),
            })?;

        let search_path = info
            .path
            .into_iter()
            .filter(|entry| !entry.is_empty())
            .map(PathBuf::from)
            .collect::<Vec<_>>();

        tracing::debug!(
            "Interpreter reported {} search path entries",
            search_path.len()
        );

        Ok(Self {
            search_path,
            interpreter: None,
        })
    }

    /// The search path, in lookup order.
    pub fn search_path(&self) -> &[PathBuf] {
        &self.search_path
    }

    /// The queried interpreter; `None` for an explicit search path.
    pub fn interpreter(&self) -> Option<&Path> {
        self.interpreter.as_deref()
    }

    /// Import `name` in the queried interpreter.
    ///
    /// Returns `Ok(None)` when the import raises `ImportError`. Fails when
    /// no interpreter was queried, or when importing raises anything else.
    pub fn import_module(&self, name: &str) -> Result<Option<ImportedModule>> {
        let interpreter = self
            .interpreter
            .as_deref()
            .ok_or_else(|| CheckError::EnvironmentProbe {
                message: format!("no interpreter available to import {}", name),
            })?;
        tracing::debug!("Importing {} with {}", name, interpreter.display());

        let stdout = run_script(interpreter, IMPORT_SCRIPT, &[name])?;
        ImportedModule::from_report(name, &stdout)
    }
}

/// Run `script` with `python -c`, returning its stdout.
fn run_script(interpreter: &Path, script: &str, args: &[&str]) -> Result<String> {
    let output = Command::new(interpreter)
        .arg("-c")
        .arg(script)
        .args(args)
        .output()
        .map_err(|e| CheckError::EnvironmentProbe {
            message: format!("failed to run {}: {}", interpreter.display(), e),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(CheckError::EnvironmentProbe {
            message: format!(
                "{} exited with {}: {}",
                interpreter.display(),
                output.status,
                last_line(&stderr)
            ),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// The last non-empty line of `text`, trimmed; a traceback's summary line.
fn last_line(text: &str) -> &str {
    text.lines()
        .rev()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or_default()
}

/// Check whether a file has executable permission bits set.
#[cfg(unix)]
pub fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

/// On Windows, executability is determined by file extension, not permission bits.
#[cfg(not(unix))]
pub fn is_executable(_path: &Path) -> bool {
    true
}

/// Resolve a tool's binary path by iterating over PATH entries.
///
/// Returns the first match that exists and is executable.
pub fn resolve_tool_path(tool: &str, path_entries: &[PathBuf]) -> Option<PathBuf> {
    path_entries
        .iter()
        .map(|dir| dir.join(tool))
        .find(|candidate| candidate.is_file() && is_executable(candidate))
}

/// Parse the system PATH environment variable into a list of directories.
pub fn parse_system_path() -> Vec<PathBuf> {
    std::env::var_os("PATH")
        .map(|path| std::env::split_paths(&path).collect())
        .unwrap_or_default()
}

/// Resolve the interpreter to run.
///
/// Anything that looks like a path is used as is. Bare names are looked up
/// on PATH; when that fails the name is handed to the OS unchanged so
/// platform lookup rules (such as `.exe` suffixes) still apply.
fn resolve_interpreter(python: &str) -> PathBuf {
    let as_path = Path::new(python);
    if as_path.components().count() > 1 {
        return as_path.to_path_buf();
    }
    resolve_tool_path(python, &parse_system_path()).unwrap_or_else(|| as_path.to_path_buf())
}
