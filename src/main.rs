//! usage-walker - Disk usage by user and group
//!
//! Entry point for the CLI application.

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::Parser;
use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use usage_walker::config::{CliArgs, ScanConfig};
use usage_walker::progress::ProgressReporter;
use usage_walker::report::render_with;
use usage_walker::walker::{ConsoleObserver, Scanner};

fn main() -> ExitCode {
    // Argument errors exit with 1, not clap's default of 2
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(e) => {
            let _ = e.print();
            return ExitCode::FAILURE;
        }
    };

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: CliArgs) -> Result<()> {
    // Setup logging
    setup_logging(args.verbose)?;

    // Validate and create config
    let config = ScanConfig::from_args(args).context("Invalid configuration")?;

    let scanner = Scanner::new(config.clone())
        .with_observer(Arc::new(ConsoleObserver::new(config.verbose)));

    let result = if config.show_progress {
        let progress = Arc::new(ProgressReporter::new());
        progress.set_status(&format!("Scanning {}...", config.root.display()));

        let reporter = Arc::clone(&progress);
        let result = scanner.run_with_progress(move |p| reporter.update(&p));

        match &result {
            Ok(_) => progress.finish("Scan completed"),
            Err(_) => progress.finish_and_clear(),
        }
        result
    } else {
        scanner.run_with_stats()
    };

    let (acc, stats) =
        result.with_context(|| format!("Cannot scan {}", config.root.display()))?;

    if stats.skipped > 0 {
        debug!(skipped = stats.skipped, "Scan skipped unreadable entries");
    }

    let report = render_with(&acc, &config.report);
    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(report.as_bytes())
        .and_then(|()| stdout.flush())
        .context("Failed to write report")?;

    Ok(())
}

fn setup_logging(verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("usage_walker=debug,warn")
    } else {
        EnvFilter::new("usage_walker=info,warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    Ok(())
}
