//! pyreq CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use pyreq::cli::Cli;
use pyreq::ui::Reporter;
use pyreq::{check_requirement, Config};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber for logging.
///
/// Logs go to stderr, next to diagnostics; stdout carries only the version.
/// Log level is controlled by:
/// 1. `--debug` flag sets level to DEBUG
/// 2. `RUST_LOG` environment variable (if set)
/// 3. Default is WARN, so a normal run logs nothing
fn init_tracing(debug: bool, ansi: bool) {
    let filter = if debug {
        EnvFilter::new("pyreq=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pyreq=warn"))
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(ansi)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = Config::from_cli(&cli);
    init_tracing(cli.debug, config.color);

    tracing::debug!("pyreq starting with args: {:?}", cli);

    let result = check_requirement(&cli.requirement, &config);

    let mut reporter = Reporter::stdio(config.color);
    ExitCode::from(reporter.report(&result))
}
