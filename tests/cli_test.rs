//! Integration tests for the pyreq binary.
//!
//! Most tests pass `--search-path` so no Python interpreter is needed.
//! Interpreter-mode tests use a shell script standing in for `python3`, and
//! one test uses a real `python3` when one is on PATH.
// The cargo_bin function is marked deprecated in favor of cargo_bin! macro,
// but both work correctly. Suppressing until assert_cmd stabilizes the new API.
#![allow(deprecated)]

use assert_cmd::cargo::cargo_bin;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const TAG: &str = "[PyPkg Dependency Checker]";

/// A fake site-packages directory.
struct Site {
    dir: TempDir,
}

impl Site {
    fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Register an installed distribution.
    fn install(&self, name: &str, version: &str) -> &Self {
        let record = self
            .path()
            .join(format!("{}-{}.dist-info", name.replace('-', "_"), version));
        fs::create_dir_all(&record).unwrap();
        fs::write(
            record.join("METADATA"),
            format!("Metadata-Version: 2.1\nName: {}\nVersion: {}\n", name, version),
        )
        .unwrap();
        self
    }

    /// Place a module file without registering it.
    fn module(&self, relative: &str, content: &str) -> &Self {
        let path = self.path().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
        self
    }

    fn cmd(&self, requirement: &str) -> Command {
        let mut cmd = Command::new(cargo_bin("pyreq"));
        cmd.env_remove("RUST_LOG")
            .env_remove("NO_COLOR")
            .arg("--search-path")
            .arg(self.path())
            .arg(requirement);
        cmd
    }
}

/// Write a stand-in interpreter into `site`.
///
/// The search path query gets `site` back; the module import gets
/// `import_report`.
#[cfg(unix)]
fn fake_python(site: &Site, import_report: &str) -> std::path::PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let python = site.path().join("python3");
    fs::write(
        &python,
        format!(
            "#!/bin/sh\nif [ $# -ge 3 ]; then echo '{}'; else echo '{{\"path\": [\"{}\"]}}'; fi\n",
            import_report,
            site.path().display()
        ),
    )
    .unwrap();
    fs::set_permissions(&python, fs::Permissions::from_mode(0o755)).unwrap();
    python
}

/// Run against an interpreter instead of an explicit search path.
fn python_cmd(python: &Path, requirement: &str) -> Command {
    let mut cmd = Command::new(cargo_bin("pyreq"));
    cmd.env_remove("RUST_LOG")
        .env("NO_COLOR", "1")
        .arg("--python")
        .arg(python)
        .arg(requirement);
    cmd
}

#[test]
fn installed_package_reports_registry_version() -> Result<(), Box<dyn std::error::Error>> {
    let site = Site::new();
    site.install("numpy", "1.26.4");

    site.cmd("numpy")
        .assert()
        .success()
        .stdout("1.26.4\n")
        .stderr("");
    Ok(())
}

#[test]
fn installed_package_satisfying_specifier() -> Result<(), Box<dyn std::error::Error>> {
    let site = Site::new();
    site.install("pybind11", "2.12.0");

    site.cmd("pybind11>=2.10,<3")
        .assert()
        .success()
        .stdout("2.12.0\n");
    Ok(())
}

#[test]
fn unsatisfied_specifier_still_reports_version() -> Result<(), Box<dyn std::error::Error>> {
    let site = Site::new();
    site.install("pybind11", "2.9.2");

    site.cmd("pybind11>=2.10")
        .assert()
        .code(1)
        .stdout("2.9.2\n")
        .stderr(predicate::str::contains(TAG))
        .stderr(predicate::str::contains("(version 2.9.2)"))
        .stderr(predicate::str::contains("pybind11>=2.10"));
    Ok(())
}

#[test]
fn prerelease_satisfies_specifier() -> Result<(), Box<dyn std::error::Error>> {
    let site = Site::new();
    site.install("torch", "2.3.0rc1");

    site.cmd("torch>=2.0").assert().success().stdout("2.3.0rc1\n");
    Ok(())
}

#[test]
fn name_lookup_is_case_and_separator_insensitive() -> Result<(), Box<dyn std::error::Error>> {
    let site = Site::new();
    site.install("typing-extensions", "4.9.0");

    site.cmd("Typing.Extensions")
        .assert()
        .success()
        .stdout("4.9.0\n");
    Ok(())
}

#[test]
fn missing_package_fails_without_version() -> Result<(), Box<dyn std::error::Error>> {
    let site = Site::new();

    site.cmd("absent")
        .assert()
        .code(1)
        .stdout("")
        .stderr(predicate::str::contains(
            "Package absent cannot be imported.",
        ));
    Ok(())
}

#[test]
fn unregistered_module_with_version() -> Result<(), Box<dyn std::error::Error>> {
    let site = Site::new();
    site.module("vendored/__init__.py", "__version__ = \"0.8.1\"\n");

    site.cmd("vendored>=0.8")
        .assert()
        .success()
        .stdout("0.8.1\n");
    Ok(())
}

#[test]
fn unregistered_module_without_version_passes_without_specifier(
) -> Result<(), Box<dyn std::error::Error>> {
    let site = Site::new();
    site.module("bare/__init__.py", "");

    site.cmd("bare")
        .assert()
        .success()
        .stdout("unknown\n")
        .stderr("");
    Ok(())
}

#[test]
fn unregistered_module_without_version_fails_with_specifier(
) -> Result<(), Box<dyn std::error::Error>> {
    let site = Site::new();
    site.module("bare/__init__.py", "");

    site.cmd("bare>=1.0")
        .assert()
        .code(1)
        .stdout("")
        .stderr(predicate::str::contains("bare"))
        .stderr(predicate::str::contains(">=1.0"))
        .stderr(predicate::str::contains("cannot determine version"));
    Ok(())
}

#[test]
fn computed_version_is_not_mistaken_for_a_literal() -> Result<(), Box<dyn std::error::Error>> {
    let site = Site::new();
    site.module(
        "dyn/__init__.py",
        "_parts = (\"1\", \"4\", \"0\")\n__version__ = \".\".join(_parts)\n",
    );

    site.cmd("dyn>=1.0")
        .assert()
        .code(1)
        .stdout("")
        .stderr(predicate::str::contains("cannot determine version"));
    site.cmd("dyn").assert().success().stdout("unknown\n");
    Ok(())
}

#[cfg(unix)]
#[test]
fn interpreter_reports_computed_version() -> Result<(), Box<dyn std::error::Error>> {
    let site = Site::new();
    let python = fake_python(
        &site,
        r#"{"found": true, "version": "2.1.0", "origin": "/site/scm/__init__.py"}"#,
    );

    python_cmd(&python, "scm>=2")
        .assert()
        .success()
        .stdout("2.1.0\n")
        .stderr("");
    Ok(())
}

#[cfg(unix)]
#[test]
fn interpreter_reports_extension_module_version() -> Result<(), Box<dyn std::error::Error>> {
    let site = Site::new();
    let python = fake_python(
        &site,
        r#"{"found": true, "version": "0.3.1", "origin": "/site/_native.cpython-312-x86_64-linux-gnu.so"}"#,
    );

    python_cmd(&python, "_native>=0.3")
        .assert()
        .success()
        .stdout("0.3.1\n");
    python_cmd(&python, "_native>=1")
        .assert()
        .code(1)
        .stdout("0.3.1\n")
        .stderr(predicate::str::contains("(version 0.3.1)"));
    Ok(())
}

#[cfg(unix)]
#[test]
fn interpreter_import_failure_is_unresolvable() -> Result<(), Box<dyn std::error::Error>> {
    let site = Site::new();
    let python = fake_python(&site, r#"{"found": false, "reason": "No module named absent"}"#);

    python_cmd(&python, "absent")
        .assert()
        .code(1)
        .stdout("")
        .stderr(predicate::str::contains(
            "Package absent cannot be imported.",
        ));
    Ok(())
}

fn python3_available() -> bool {
    std::process::Command::new("python3")
        .arg("--version")
        .output()
        .is_ok_and(|output| output.status.success())
}

#[test]
fn real_interpreter_imports_module() -> Result<(), Box<dyn std::error::Error>> {
    if !python3_available() {
        eprintln!("python3 not found, skipping");
        return Ok(());
    }
    let site = Site::new();
    site.module(
        "pyreq_dyn_fixture/__init__.py",
        "print('loading')\n_parts = (\"1\", \"4\", \"0\")\n__version__ = \".\".join(_parts)\n",
    )
    .module("pyreq_plain_fixture.py", "");

    python_cmd(Path::new("python3"), "pyreq_dyn_fixture>=1.0")
        .env("PYTHONPATH", site.path())
        .assert()
        .success()
        .stdout("1.4.0\n");
    python_cmd(Path::new("python3"), "pyreq_plain_fixture")
        .env("PYTHONPATH", site.path())
        .assert()
        .success()
        .stdout("unknown\n");
    python_cmd(Path::new("python3"), "pyreq_absent_fixture")
        .env("PYTHONPATH", site.path())
        .assert()
        .code(1)
        .stdout("");
    Ok(())
}

#[test]
fn malformed_requirement_fails() -> Result<(), Box<dyn std::error::Error>> {
    let site = Site::new();

    site.cmd("numpy>=>1")
        .assert()
        .code(1)
        .stdout("")
        .stderr(predicate::str::contains("Invalid requirement"));
    Ok(())
}

#[test]
fn missing_argument_is_usage_error() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin("pyreq"));
    cmd.assert()
        .code(2)
        .stderr(predicate::str::contains("Usage"));
    Ok(())
}

#[test]
fn repeated_runs_are_identical() -> Result<(), Box<dyn std::error::Error>> {
    let site = Site::new();
    site.install("foo", "1.0");

    let first = site.cmd("foo<2").output()?;
    let second = site.cmd("foo<2").output()?;
    assert_eq!(first.status.code(), second.status.code());
    assert_eq!(first.stdout, second.stdout);
    assert_eq!(first.stdout, b"1.0\n");
    Ok(())
}

#[test]
fn diagnostics_are_colored_by_default() -> Result<(), Box<dyn std::error::Error>> {
    let site = Site::new();

    site.cmd("absent")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("\x1b[31m"));
    Ok(())
}

#[test]
fn no_color_env_strips_escapes() -> Result<(), Box<dyn std::error::Error>> {
    let site = Site::new();

    site.cmd("absent")
        .env("NO_COLOR", "1")
        .assert()
        .code(1)
        .stderr(predicate::str::contains(TAG))
        .stderr(predicate::str::contains("\x1b").not());
    Ok(())
}

#[test]
fn empty_no_color_keeps_escapes() -> Result<(), Box<dyn std::error::Error>> {
    let site = Site::new();

    site.cmd("absent")
        .env("NO_COLOR", "")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("\x1b["));
    Ok(())
}

#[test]
fn no_color_flag_strips_escapes() -> Result<(), Box<dyn std::error::Error>> {
    let site = Site::new();

    site.cmd("absent")
        .arg("--no-color")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("\x1b").not());
    Ok(())
}

#[test]
fn unreachable_interpreter_is_a_fault() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin("pyreq"));
    cmd.env_remove("RUST_LOG")
        .env("NO_COLOR", "1")
        .args(["--python", "/nonexistent/bin/python-xyz", "numpy"]);
    cmd.assert()
        .code(2)
        .stdout("")
        .stderr(predicate::str::contains("Failed to probe the Python environment"));
    Ok(())
}

#[test]
fn shows_version() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin("pyreq"));
    cmd.arg("--version");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    Ok(())
}
