//! Walk observation hooks
//!
//! The walk never fails on a single node. Every place it discards a node
//! goes through [`WalkObserver::on_skip`], and every directory it enters
//! with readable metadata goes through [`WalkObserver::on_enter_dir`].
//! The default observer does nothing, which keeps scans silent.

use crate::error::NodeUnreadable;
use std::io::Write;
use std::path::Path;
use tracing::debug;

/// Callbacks invoked from the walk; must be cheap and must not panic
pub trait WalkObserver: Send + Sync {
    /// A directory's own metadata was counted and it is about to be listed
    fn on_enter_dir(&self, _path: &Path) {}

    /// A node was skipped because it could not be read
    fn on_skip(&self, _err: &NodeUnreadable) {}
}

/// Observer that ignores everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl WalkObserver for NoopObserver {}

/// Observer used by the CLI
///
/// Prints entered directories to stdout when `print_dirs` is set and logs
/// skipped nodes at debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleObserver {
    print_dirs: bool,
}

impl ConsoleObserver {
    pub fn new(print_dirs: bool) -> Self {
        Self { print_dirs }
    }
}

impl WalkObserver for ConsoleObserver {
    fn on_enter_dir(&self, path: &Path) {
        if self.print_dirs {
            // A closed stdout must not abort the walk
            let _ = writeln!(std::io::stdout().lock(), "{}", path.display());
        }
    }

    fn on_skip(&self, err: &NodeUnreadable) {
        // Vanished entries are expected on live filesystems
        if err.is_not_found() {
            debug!("Vanished during scan: {}", err.path.display());
        } else {
            debug!("Skipped: {}", err);
        }
    }
}
