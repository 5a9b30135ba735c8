//! Error types for usage-walker
//!
//! This module defines the error hierarchy that covers:
//! - Root validation failures (the only fatal walk error)
//! - Per-node read failures, which are absorbed and handed to observers
//! - Configuration and CLI errors
//! - Worker thread errors for the parallel walk
//!
//! Design philosophy:
//! - Use thiserror for structured error types in library code
//! - Errors should be actionable - include the offending path
//! - Preserve error chains for debugging

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Top-level error type for the usage-walker library
#[derive(Error, Debug)]
pub enum WalkerError {
    /// Root path rejected before traversal
    #[error(transparent)]
    RootInvalid(#[from] RootInvalid),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Worker/concurrency errors
    #[error("Worker error: {0}")]
    Worker(#[from] WorkerError),

    /// I/O errors outside the walk itself
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// The root path cannot be scanned
///
/// Raised once, up front, from a single metadata read. Nothing has been
/// counted when this is returned.
#[derive(Error, Debug)]
pub enum RootInvalid {
    /// Path does not exist
    #[error("{} does not exist", path.display())]
    NotFound { path: PathBuf },

    /// Path exists but its metadata cannot be read
    #[error("{} is not accessible: {source}", path.display())]
    Inaccessible {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Path is something other than a directory
    #[error("{} is not a directory", path.display())]
    NotADirectory { path: PathBuf },
}

impl RootInvalid {
    /// Classify a failed metadata read of the root
    pub fn from_stat_error(path: &Path, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => RootInvalid::NotFound {
                path: path.to_path_buf(),
            },
            _ => RootInvalid::Inaccessible {
                path: path.to_path_buf(),
                source: err,
            },
        }
    }

    /// The rejected root path
    pub fn path(&self) -> &Path {
        match self {
            RootInvalid::NotFound { path } => path,
            RootInvalid::Inaccessible { path, .. } => path,
            RootInvalid::NotADirectory { path } => path,
        }
    }
}

/// Which operation failed on an unreadable node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeOp {
    /// Reading owner/group/size metadata
    Stat,
    /// Listing a directory's children
    ReadDir,
}

impl fmt::Display for NodeOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeOp::Stat => f.write_str("stat"),
            NodeOp::ReadDir => f.write_str("readdir"),
        }
    }
}

/// A single node that could not be read during the walk
///
/// Never propagated: the walk skips the node and hands this to the
/// observer.
#[derive(Error, Debug)]
#[error("{op} failed for {}: {source}", path.display())]
pub struct NodeUnreadable {
    pub path: PathBuf,
    pub op: NodeOp,
    #[source]
    pub source: io::Error,
}

impl NodeUnreadable {
    pub fn new(path: impl Into<PathBuf>, op: NodeOp, source: io::Error) -> Self {
        Self {
            path: path.into(),
            op,
            source,
        }
    }

    /// Entry vanished between being listed and being read
    pub fn is_not_found(&self) -> bool {
        self.source.kind() == io::ErrorKind::NotFound
    }
}

/// Configuration and CLI errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Invalid worker count
    #[error("Invalid worker count {count}: must be at most {max}")]
    InvalidWorkerCount { count: usize, max: usize },
}

/// Worker thread errors
#[derive(Error, Debug)]
pub enum WorkerError {
    /// Thread could not be spawned
    #[error("Failed to spawn worker {id}: {source}")]
    SpawnFailed {
        id: usize,
        #[source]
        source: io::Error,
    },

    /// Worker panicked
    #[error("Worker {id} panicked: {message}")]
    Panicked { id: usize, message: String },

    /// A worker exited without handing back its partial totals
    #[error("Result channel closed before all workers reported")]
    ResultChannelClosed,
}

/// Result type alias for WalkerError
pub type Result<T> = std::result::Result<T, WalkerError>;
