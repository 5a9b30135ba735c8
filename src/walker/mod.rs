//! Directory walker and usage aggregation
//!
//! # Architecture
//!
//! ```text
//!                     ┌─────────────────────────┐
//!                     │        Scanner          │
//!                     │  - root validation      │
//!                     │  - progress counters    │
//!                     └───────────┬─────────────┘
//!                                 │
//!              workers == 1       │       workers > 1
//!          ┌──────────────────────┴──────────────────────┐
//!          │                                             │
//!   ┌──────▼──────┐                  ┌───────────┬───────▼───┬───────────┐
//!   │ DFS stack   │                  │ Worker 1  │ Worker 2  │ Worker N  │
//!   │ one         │                  │ partial   │ partial   │ partial   │
//!   │ accumulator │                  └─────┬─────┴─────┬─────┴─────┬─────┘
//!   └─────────────┘                        └───── merge ───────────┘
//! ```

mod parallel;
mod visit;

pub mod observer;
pub mod scanner;

pub use observer::{ConsoleObserver, NoopObserver, WalkObserver};
pub use scanner::{scan, validate_root, ScanProgress, ScanStats, Scanner};
