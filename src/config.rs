//! Configuration types for usage-walker
//!
//! This module defines:
//! - CLI argument parsing using clap derive macros
//! - Runtime configuration with validation

use crate::error::ConfigError;
use crate::report::{ReportOptions, SortOrder};
use crate::usage::UsageMetric;
use clap::Parser;
use std::path::PathBuf;

/// Maximum reasonable worker count
const MAX_WORKERS: usize = 512;

/// Summarize disk usage by user and group
#[derive(Parser, Debug, Clone)]
#[command(
    name = "usage-walker",
    version,
    about = "Summarize disk usage by user and group",
    long_about = "Walks a directory hierarchy and totals the bytes used by each owner (uid) \
                  and each group (gid).\n\n\
                  Entries that cannot be read are skipped; the scan never stops part way.",
    after_help = "EXAMPLES:\n    \
        usage-walker /home\n    \
        usage-walker -H --sort id /srv/projects\n    \
        usage-walker -S --sort entries /home\n    \
        usage-walker --usage allocated -w 0 -p /data"
)]
pub struct CliArgs {
    /// Scan usage starting at this directory
    #[arg(value_name = "ROOT")]
    pub root: PathBuf,

    /// Print each directory as it is entered (and log skipped entries)
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Show usage with binary units rather than raw bytes
    #[arg(short = 'H', long)]
    pub human_readable: bool,

    /// How each entry's size is measured
    #[arg(short = 'u', long = "usage", value_enum, default_value_t = UsageMetric::Apparent)]
    pub metric: UsageMetric,

    /// Order of the per-user and per-group lines
    #[arg(short = 's', long, value_enum, default_value_t = SortOrder::Usage)]
    pub sort: SortOrder,

    /// Add entry counts to the report
    #[arg(short = 'c', long)]
    pub counts: bool,

    /// Add percentage shares of bytes and entries, and bytes per entry
    #[arg(short = 'S', long)]
    pub shares: bool,

    /// Number of walk threads (0 = one per CPU)
    #[arg(short = 'w', long, default_value = "1", value_name = "NUM")]
    pub workers: usize,

    /// Show a progress spinner on stderr while scanning
    #[arg(short = 'p', long)]
    pub progress: bool,
}

/// Validated runtime configuration
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Directory to scan
    pub root: PathBuf,

    /// Size metric applied to every entry
    pub metric: UsageMetric,

    /// Number of walk threads (1 = walk on the calling thread)
    pub worker_count: usize,

    /// Print each directory once its own metadata is counted
    pub verbose: bool,

    /// Show progress indicator
    pub show_progress: bool,

    /// Report rendering options
    pub report: ReportOptions,
}

impl ScanConfig {
    /// Single-threaded, apparent-size scan of `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            metric: UsageMetric::Apparent,
            worker_count: 1,
            verbose: false,
            show_progress: false,
            report: ReportOptions::default(),
        }
    }

    pub fn with_metric(mut self, metric: UsageMetric) -> Self {
        self.metric = metric;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.worker_count = workers;
        self
    }

    /// Create and validate configuration from CLI arguments
    pub fn from_args(args: CliArgs) -> Result<Self, ConfigError> {
        let worker_count = match args.workers {
            0 => num_cpus::get(),
            n => n,
        };

        if worker_count > MAX_WORKERS {
            return Err(ConfigError::InvalidWorkerCount {
                count: worker_count,
                max: MAX_WORKERS,
            });
        }

        Ok(Self {
            root: args.root,
            metric: args.metric,
            worker_count,
            verbose: args.verbose,
            show_progress: args.progress,
            report: ReportOptions {
                human_readable: args.human_readable,
                sort: args.sort,
                show_counts: args.counts,
                show_shares: args.shares,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal() {
        let args = CliArgs::try_parse_from(["usage-walker", "/data"]).unwrap();
        assert_eq!(args.root, PathBuf::from("/data"));
        assert!(!args.verbose);
        assert!(!args.human_readable);
        assert_eq!(args.metric, UsageMetric::Apparent);
        assert_eq!(args.sort, SortOrder::Usage);
        assert_eq!(args.workers, 1);
    }

    #[test]
    fn test_parse_short_flags() {
        let args =
            CliArgs::try_parse_from(["usage-walker", "-v", "-H", "-c", "-p", "/data"]).unwrap();
        assert!(args.verbose);
        assert!(args.human_readable);
        assert!(args.counts);
        assert!(args.progress);
    }

    #[test]
    fn test_parse_value_enums() {
        let args = CliArgs::try_parse_from([
            "usage-walker",
            "--usage",
            "allocated",
            "--sort",
            "id",
            "/data",
        ])
        .unwrap();
        assert_eq!(args.metric, UsageMetric::Allocated);
        assert_eq!(args.sort, SortOrder::Id);
    }

    #[test]
    fn test_root_is_required_and_single() {
        assert!(CliArgs::try_parse_from(["usage-walker"]).is_err());
        assert!(CliArgs::try_parse_from(["usage-walker", "/a", "/b"]).is_err());
    }

    #[test]
    fn test_from_args_workers() {
        let args = CliArgs::try_parse_from(["usage-walker", "-w", "0", "/data"]).unwrap();
        let config = ScanConfig::from_args(args).unwrap();
        assert_eq!(config.worker_count, num_cpus::get());

        let args = CliArgs::try_parse_from(["usage-walker", "-w", "4096", "/data"]).unwrap();
        assert!(matches!(
            ScanConfig::from_args(args),
            Err(ConfigError::InvalidWorkerCount { count: 4096, .. })
        ));
    }

    #[test]
    fn test_from_args_report_options() {
        let args = CliArgs::try_parse_from(["usage-walker", "-H", "-s", "id", "/data"]).unwrap();
        let config = ScanConfig::from_args(args).unwrap();
        assert!(config.report.human_readable);
        assert_eq!(config.report.sort, SortOrder::Id);
        assert!(!config.report.show_counts);
        assert!(!config.report.show_shares);
        assert!(!config.show_progress);
    }

    #[test]
    fn test_from_args_shares_and_entries_sort() {
        let args =
            CliArgs::try_parse_from(["usage-walker", "-S", "--sort", "entries", "/data"]).unwrap();
        let config = ScanConfig::from_args(args).unwrap();
        assert!(config.report.show_shares);
        assert!(!config.report.show_counts);
        assert_eq!(config.report.sort, SortOrder::Entries);
    }
}
