//! Per-directory accounting shared by the sequential and parallel walks

use crate::error::{NodeOp, NodeUnreadable};
use crate::usage::{EntryMetadata, UsageAccumulator, UsageMetric};
use crate::walker::observer::WalkObserver;
use std::fs::{self, Metadata};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Live counters updated while walking, read by progress displays
#[derive(Debug, Default)]
pub(crate) struct ScanCounters {
    pub dirs: AtomicU64,
    pub entries: AtomicU64,
    pub bytes: AtomicU64,
    pub skipped: AtomicU64,
}

/// Accounts one directory at a time into a caller-owned accumulator
#[derive(Clone)]
pub(crate) struct DirVisitor {
    metric: UsageMetric,
    observer: Arc<dyn WalkObserver>,
    counters: Arc<ScanCounters>,
}

impl DirVisitor {
    pub fn new(
        metric: UsageMetric,
        observer: Arc<dyn WalkObserver>,
        counters: Arc<ScanCounters>,
    ) -> Self {
        Self {
            metric,
            observer,
            counters,
        }
    }

    /// Count `dir` itself and every non-directory entry inside it
    ///
    /// Subdirectories are pushed onto `subdirs` rather than counted here;
    /// they are counted when they are visited in turn. A directory whose
    /// own metadata cannot be read is still listed, but is not reported
    /// to the observer as entered.
    pub fn visit(&self, dir: &Path, acc: &mut UsageAccumulator, subdirs: &mut Vec<PathBuf>) {
        self.counters.dirs.fetch_add(1, Ordering::Relaxed);

        if self.account(dir, fs::metadata(dir), acc) {
            self.observer.on_enter_dir(dir);
        }

        let listing = match fs::read_dir(dir) {
            Ok(listing) => listing,
            Err(e) => {
                self.skip(NodeUnreadable::new(dir, NodeOp::ReadDir, e));
                return;
            }
        };

        for item in listing {
            let item = match item {
                Ok(item) => item,
                Err(e) => {
                    self.skip(NodeUnreadable::new(dir, NodeOp::ReadDir, e));
                    continue;
                }
            };

            let path = item.path();

            // Classified without following symlinks: real directories are
            // descended, links to directories are neither counted nor
            // descended, everything else is read through any link.
            match item.file_type() {
                Ok(file_type) if file_type.is_dir() => subdirs.push(path),
                Ok(file_type) if file_type.is_symlink() => match fs::metadata(&path) {
                    Ok(meta) if meta.is_dir() => {}
                    target => {
                        self.account(&path, target, acc);
                    }
                },
                Ok(_) => {
                    self.account(&path, fs::metadata(&path), acc);
                }
                Err(e) => self.skip(NodeUnreadable::new(path, NodeOp::Stat, e)),
            }
        }
    }

    /// Fold one node's metadata, or skip it if the read failed
    fn account(
        &self,
        path: &Path,
        meta: io::Result<Metadata>,
        acc: &mut UsageAccumulator,
    ) -> bool {
        match meta {
            Ok(meta) => {
                let entry = EntryMetadata::from_metadata(&meta, self.metric);
                acc.fold(&entry);
                self.counters.entries.fetch_add(1, Ordering::Relaxed);
                self.counters.bytes.fetch_add(entry.size, Ordering::Relaxed);
                true
            }
            Err(e) => {
                self.skip(NodeUnreadable::new(path, NodeOp::Stat, e));
                false
            }
        }
    }

    fn skip(&self, err: NodeUnreadable) {
        self.counters.skipped.fetch_add(1, Ordering::Relaxed);
        self.observer.on_skip(&err);
    }
}
