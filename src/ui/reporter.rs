//! Check result reporting.
//!
//! Stdout gets exactly the resolved version (or `unknown`) whenever one was
//! obtained, so callers can always capture it, including when the
//! specifier is not met. Stderr gets at most one tagged diagnostic line per
//! failure. A version that cannot be written to stdout is a fault.

use std::io::{self, Stderr, Stdout, Write};

use super::theme::CheckerTheme;
use crate::error::{CheckError, Result, EXIT_FAULT};
use crate::requirements::CheckOutcome;

/// Writes the outcome of a check and picks the exit status.
pub struct Reporter<O: Write, E: Write> {
    out: O,
    err: E,
    theme: CheckerTheme,
}

impl Reporter<Stdout, Stderr> {
    /// Report to the process's stdout and stderr.
    pub fn stdio(color: bool) -> Self {
        Self::new(io::stdout(), io::stderr(), color)
    }
}

impl<O: Write, E: Write> Reporter<O, E> {
    /// Create a reporter over arbitrary writers.
    pub fn new(out: O, err: E, color: bool) -> Self {
        Self {
            out,
            err,
            theme: CheckerTheme::for_color(color),
        }
    }

    /// Report a check result, returning the exit status.
    pub fn report(&mut self, result: &Result<CheckOutcome>) -> u8 {
        match result {
            Ok(outcome) => {
                tracing::debug!(
                    "{} satisfied by {} ({:?})",
                    outcome.name,
                    outcome.version,
                    outcome.source
                );
                match self.version_line(outcome.version.as_str()) {
                    Ok(()) => 0,
                    Err(e) => self.report_write_failure(e),
                }
            }
            Err(err) => self.report_error(err),
        }
    }

    /// Report a failure, returning the exit status.
    pub fn report_error(&mut self, err: &CheckError) -> u8 {
        let _ = writeln!(self.err, "{}", self.theme.format_diagnostic(&err.to_string()));
        let _ = self.err.flush();
        if let Some(version) = err.resolved_version() {
            if let Err(e) = self.version_line(version) {
                return self.report_write_failure(e);
            }
        }
        err.exit_code()
    }

    fn version_line(&mut self, version: &str) -> io::Result<()> {
        writeln!(self.out, "{}", version)?;
        self.out.flush()
    }

    fn report_write_failure(&mut self, e: io::Error) -> u8 {
        let err = CheckError::Io(e);
        let _ = writeln!(self.err, "{}", self.theme.format_diagnostic(&err.to_string()));
        let _ = self.err.flush();
        EXIT_FAULT
    }

    /// Consume the reporter, returning the writers.
    pub fn into_inner(self) -> (O, E) {
        (self.out, self.err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::requirements::{ResolvedVersion, VersionSource};

    fn run(result: Result<CheckOutcome>, color: bool) -> (String, String, u8) {
        let mut reporter = Reporter::new(Vec::new(), Vec::new(), color);
        let code = reporter.report(&result);
        let (out, err) = reporter.into_inner();
        (
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
            code,
        )
    }

    fn outcome(version: ResolvedVersion) -> CheckOutcome {
        CheckOutcome {
            name: "foo".to_string(),
            version,
            source: VersionSource::Installed,
        }
    }

    #[test]
    fn success_prints_version_only() {
        let (out, err, code) = run(
            Ok(outcome(ResolvedVersion::Known("1.2.3".to_string()))),
            true,
        );
        assert_eq!(out, "1.2.3\n");
        assert!(err.is_empty());
        assert_eq!(code, 0);
    }

    #[test]
    fn bypass_prints_unknown() {
        let (out, err, code) = run(Ok(outcome(ResolvedVersion::Unknown)), true);
        assert_eq!(out, "unknown\n");
        assert!(err.is_empty());
        assert_eq!(code, 0);
    }

    #[test]
    fn unsatisfied_prints_version_and_diagnostic() {
        let (out, err, code) = run(
            Err(CheckError::SpecifierUnsatisfied {
                name: "foo".to_string(),
                version: "0.9".to_string(),
                specifier: ">=1.0".to_string(),
            }),
            false,
        );
        assert_eq!(out, "0.9\n");
        assert_eq!(
            err,
            "[PyPkg Dependency Checker] Package foo is installed (version 0.9) but does not satisfy the requirement: foo>=1.0\n"
        );
        assert_eq!(code, 1);
    }

    #[test]
    fn unresolvable_prints_nothing_on_stdout() {
        let (out, err, code) = run(
            Err(CheckError::PackageUnresolvable {
                name: "foo".to_string(),
            }),
            false,
        );
        assert!(out.is_empty());
        assert_eq!(err.lines().count(), 1);
        assert!(err.contains("foo cannot be imported"));
        assert_eq!(code, 1);
    }

    #[test]
    fn indeterminate_names_package_and_specifier() {
        let (out, err, code) = run(
            Err(CheckError::VersionIndeterminate {
                name: "foo".to_string(),
                specifier: ">=2".to_string(),
            }),
            false,
        );
        assert!(out.is_empty());
        assert!(err.contains("foo"));
        assert!(err.contains(">=2"));
        assert_eq!(code, 1);
    }

    #[test]
    fn color_controls_escapes() {
        let failure = || {
            Err(CheckError::PackageUnresolvable {
                name: "foo".to_string(),
            })
        };
        let (_, colored, _) = run(failure(), true);
        let (_, plain, _) = run(failure(), false);
        assert!(colored.contains("\x1b["));
        assert!(!plain.contains('\x1b'));
    }

    /// A stdout that rejects every write.
    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "stdout closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn failed_version_write_is_a_fault() {
        let mut reporter = Reporter::new(ClosedPipe, Vec::new(), false);
        let code = reporter.report(&Ok(outcome(ResolvedVersion::Known("1.0".to_string()))));
        let (_, err) = reporter.into_inner();
        let err = String::from_utf8(err).unwrap();

        assert_eq!(code, EXIT_FAULT);
        assert_eq!(err.lines().count(), 1);
        assert!(err.contains("stdout closed"));
    }

    #[test]
    fn failed_version_write_overrides_unmet_status() {
        let mut reporter = Reporter::new(ClosedPipe, Vec::new(), false);
        let code = reporter.report(&Err(CheckError::SpecifierUnsatisfied {
            name: "foo".to_string(),
            version: "0.9".to_string(),
            specifier: ">=1.0".to_string(),
        }));
        assert_eq!(code, EXIT_FAULT);
    }

    #[test]
    fn faults_exit_with_two() {
        let (out, err, code) = run(
            Err(CheckError::EnvironmentProbe {
                message: "python3 not found".to_string(),
            }),
            false,
        );
        assert!(out.is_empty());
        assert!(err.contains("python3 not found"));
        assert_eq!(code, 2);
    }
}
