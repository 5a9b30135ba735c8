//! Directory scanner
//!
//! Validates the root once, up front, then walks the tree either on the
//! calling thread or on a work-stealing pool. After validation passes the
//! scan cannot fail because of a single node; unreadable nodes are
//! skipped and reported to the observer.

use crate::config::ScanConfig;
use crate::error::{Result, RootInvalid};
use crate::usage::UsageAccumulator;
use crate::walker::observer::{NoopObserver, WalkObserver};
use crate::walker::parallel::walk_parallel;
use crate::walker::visit::{DirVisitor, ScanCounters};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::debug;

/// Counters for a finished scan
#[derive(Debug, Clone, Default)]
pub struct ScanStats {
    pub dirs: u64,
    pub entries: u64,
    pub bytes: u64,
    pub skipped: u64,
    pub duration: Duration,
}

/// Progress information for display
#[derive(Debug, Clone, Default)]
pub struct ScanProgress {
    pub dirs: u64,
    pub entries: u64,
    pub bytes: u64,
    pub skipped: u64,
    pub total_workers: usize,
    pub elapsed: Duration,
}

impl ScanProgress {
    pub fn entries_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.entries as f64 / secs
        } else {
            0.0
        }
    }
}

/// Scan `root` on the calling thread with the default observer
pub fn scan(root: impl AsRef<Path>) -> Result<UsageAccumulator> {
    Scanner::new(ScanConfig::new(root.as_ref())).run()
}

/// Reject a root that is missing, unreadable or not a directory
pub fn validate_root(root: &Path) -> std::result::Result<(), RootInvalid> {
    let meta = fs::metadata(root).map_err(|e| RootInvalid::from_stat_error(root, e))?;
    if !meta.is_dir() {
        return Err(RootInvalid::NotADirectory {
            path: root.to_path_buf(),
        });
    }
    Ok(())
}

/// Per-owner and per-group usage scanner
pub struct Scanner {
    config: ScanConfig,
    observer: Arc<dyn WalkObserver>,
    counters: Arc<ScanCounters>,
}

impl Scanner {
    pub fn new(config: ScanConfig) -> Self {
        Self {
            config,
            observer: Arc::new(NoopObserver),
            counters: Arc::new(ScanCounters::default()),
        }
    }

    /// Replace the default no-op observer
    pub fn with_observer(mut self, observer: Arc<dyn WalkObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn progress(&self, elapsed: Duration) -> ScanProgress {
        snapshot(&self.counters, self.config.worker_count, elapsed)
    }

    pub fn run(&self) -> Result<UsageAccumulator> {
        self.run_with_stats().map(|(acc, _)| acc)
    }

    pub fn run_with_stats(&self) -> Result<(UsageAccumulator, ScanStats)> {
        let start = Instant::now();
        let root = self.config.root.clone();

        validate_root(&root)?;

        debug!(
            root = %root.display(),
            workers = self.config.worker_count,
            metric = ?self.config.metric,
            "Starting scan"
        );

        let visitor = DirVisitor::new(
            self.config.metric,
            Arc::clone(&self.observer),
            Arc::clone(&self.counters),
        );

        let acc = if self.config.worker_count > 1 {
            walk_parallel(root, self.config.worker_count, visitor)?
        } else {
            walk_sequential(root, &visitor)
        };

        let progress = self.progress(start.elapsed());
        let stats = ScanStats {
            dirs: progress.dirs,
            entries: progress.entries,
            bytes: progress.bytes,
            skipped: progress.skipped,
            duration: start.elapsed(),
        };

        debug!(
            dirs = stats.dirs,
            entries = stats.entries,
            skipped = stats.skipped,
            "Scan complete in {:.3}s",
            stats.duration.as_secs_f64()
        );

        Ok((acc, stats))
    }

    /// Run while a background thread reports progress every 100ms
    pub fn run_with_progress<F>(
        &self,
        progress_callback: F,
    ) -> Result<(UsageAccumulator, ScanStats)>
    where
        F: Fn(ScanProgress) + Send + 'static,
    {
        let start = Instant::now();
        let done = Arc::new(AtomicBool::new(false));
        let counters = Arc::clone(&self.counters);
        let total_workers = self.config.worker_count;

        let progress_handle = {
            let done = Arc::clone(&done);
            thread::spawn(move || {
                while !done.load(Ordering::Relaxed) {
                    progress_callback(snapshot(&counters, total_workers, start.elapsed()));
                    thread::sleep(Duration::from_millis(100));
                }
            })
        };

        let result = self.run_with_stats();

        done.store(true, Ordering::SeqCst);
        let _ = progress_handle.join();

        result
    }
}

/// Depth-first walk on the calling thread
fn walk_sequential(root: PathBuf, visitor: &DirVisitor) -> UsageAccumulator {
    let mut acc = UsageAccumulator::new();
    let mut stack = vec![root];

    while let Some(dir) = stack.pop() {
        visitor.visit(&dir, &mut acc, &mut stack);
    }

    acc
}

fn snapshot(counters: &ScanCounters, total_workers: usize, elapsed: Duration) -> ScanProgress {
    ScanProgress {
        dirs: counters.dirs.load(Ordering::Relaxed),
        entries: counters.entries.load(Ordering::Relaxed),
        bytes: counters.bytes.load(Ordering::Relaxed),
        skipped: counters.skipped.load(Ordering::Relaxed),
        total_workers,
        elapsed,
    }
}
