//! usage-walker - Disk usage by user and group
//!
//! Walks a directory hierarchy and totals the bytes used by every owner
//! (uid) and every group (gid), alongside the overall total.
//!
//! # Features
//!
//! - **Best-effort walk**: entries that vanish, deny access or are broken
//!   links are skipped; only an invalid root stops a scan.
//!
//! - **Parallel Scanning**: optional work-stealing pool where each worker
//!   keeps its own partial totals, merged when the walk ends.
//!
//! - **Two metrics**: apparent size (`st_size`) or allocated bytes
//!   (`st_blocks * 512`).
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐      ┌────────────────────┐      ┌──────────────┐
//! │   Scanner    │─────▶│ UsageAccumulator   │─────▶│   report     │
//! │ (walker/)    │ fold │ total / uid / gid  │ read │ render_with  │
//! └──────────────┘      └────────────────────┘      └──────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! let acc = usage_walker::scan("/srv").unwrap();
//! print!("{}", usage_walker::report::render(&acc, true));
//! ```

pub mod config;
pub mod error;
pub mod progress;
pub mod report;
pub mod usage;
pub mod walker;

pub use config::{CliArgs, ScanConfig};
pub use error::{NodeUnreadable, Result, RootInvalid, WalkerError};
pub use report::{format_bytes, render, render_with, ReportOptions, SortOrder};
pub use usage::{EntryMetadata, GroupId, OwnerId, Usage, UsageAccumulator, UsageMetric};
pub use walker::{scan, ScanStats, Scanner, WalkObserver};
