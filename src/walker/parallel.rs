//! Parallel work-stealing walk
//!
//! ```text
//! Directory Queue (crossbeam deque - work stealing)
//! │
//! ├── Worker 0: pop dir → stat + readdir → fold into partial → push subdirs
//! ├── Worker 1: pop dir → stat + readdir → fold into partial → push subdirs
//! └── Worker N: pop dir → stat + readdir → fold into partial → push subdirs
//! │
//! └── Coordinator: join workers → recv partials → merge
//! ```
//!
//! Workers never share an accumulator. Each one folds into its own
//! partial, which is handed back over a channel and merged once every
//! worker has exited, so the totals are identical to a sequential walk.

use crate::error::{Result, WorkerError};
use crate::usage::UsageAccumulator;
use crate::walker::visit::DirVisitor;
use crossbeam_channel::bounded;
use crossbeam_deque::{Injector, Steal, Stealer, Worker as DequeWorker};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::debug;

/// Walk from `root` on `worker_count` threads and merge their partials
pub(crate) fn walk_parallel(
    root: PathBuf,
    worker_count: usize,
    visitor: DirVisitor,
) -> Result<UsageAccumulator> {
    let injector: Arc<Injector<PathBuf>> = Arc::new(Injector::new());

    // Directories queued or in flight; the walk is over when this hits 0
    let pending = Arc::new(AtomicUsize::new(1));
    injector.push(root);

    let mut locals: Vec<DequeWorker<PathBuf>> = Vec::with_capacity(worker_count);
    let mut stealers: Vec<Stealer<PathBuf>> = Vec::with_capacity(worker_count);
    for _ in 0..worker_count {
        let local = DequeWorker::new_fifo();
        stealers.push(local.stealer());
        locals.push(local);
    }
    let stealers = Arc::new(stealers);

    let (partial_tx, partial_rx) = bounded::<UsageAccumulator>(worker_count);

    let mut handles: Vec<(usize, JoinHandle<()>)> = Vec::with_capacity(worker_count);
    let mut spawn_error = None;

    for (id, local) in locals.into_iter().enumerate() {
        let injector = Arc::clone(&injector);
        let stealers = Arc::clone(&stealers);
        let pending = Arc::clone(&pending);
        let partial_tx = partial_tx.clone();
        let visitor = visitor.clone();

        let spawned = thread::Builder::new()
            .name(format!("walker-{}", id))
            .spawn(move || {
                let partial = worker_loop(id, local, injector, stealers, pending, visitor);
                // Channel has room for every worker
                let _ = partial_tx.send(partial);
            });

        match spawned {
            Ok(handle) => handles.push((id, handle)),
            Err(source) => {
                spawn_error = Some(WorkerError::SpawnFailed { id, source });
                break;
            }
        }
    }

    // Drop our sender so the receiver drains once workers are gone
    drop(partial_tx);

    // Workers that did start still finish the whole tree between them
    let spawned = handles.len();
    let mut panicked = None;
    for (id, handle) in handles {
        if let Err(payload) = handle.join() {
            panicked.get_or_insert(WorkerError::Panicked {
                id,
                message: panic_message(payload.as_ref()),
            });
        }
    }

    if let Some(err) = spawn_error.or(panicked) {
        return Err(err.into());
    }

    let mut acc = UsageAccumulator::new();
    let mut received = 0;
    for partial in partial_rx.iter() {
        acc.merge(partial);
        received += 1;
    }

    if received != spawned {
        return Err(WorkerError::ResultChannelClosed.into());
    }

    Ok(acc)
}

/// Worker thread - visits directories until the shared queue drains
fn worker_loop(
    id: usize,
    local: DequeWorker<PathBuf>,
    injector: Arc<Injector<PathBuf>>,
    stealers: Arc<Vec<Stealer<PathBuf>>>,
    pending: Arc<AtomicUsize>,
    visitor: DirVisitor,
) -> UsageAccumulator {
    debug!("Worker {} started", id);

    let mut acc = UsageAccumulator::new();
    let mut subdirs: Vec<PathBuf> = Vec::new();
    let mut idle_spins = 0;
    let mut visited = 0u64;
    const MAX_IDLE_SPINS: u32 = 1000;

    loop {
        let dir = match find_work(id, &local, &injector, &stealers) {
            Some(dir) => {
                idle_spins = 0;
                dir
            }
            None => {
                if pending.load(Ordering::SeqCst) == 0 {
                    break;
                }

                idle_spins += 1;
                if idle_spins > MAX_IDLE_SPINS {
                    thread::sleep(Duration::from_micros(100));
                    idle_spins = 0;
                }
                continue;
            }
        };

        visitor.visit(&dir, &mut acc, &mut subdirs);
        visited += 1;

        // Count children before retiring the parent so `pending` never
        // touches 0 while work remains
        for subdir in subdirs.drain(..) {
            pending.fetch_add(1, Ordering::SeqCst);
            local.push(subdir);
        }

        pending.fetch_sub(1, Ordering::SeqCst);
    }

    debug!("Worker {} finished after {} directories", id, visited);
    acc
}

/// Local queue first, then the injector, then the other workers
fn find_work(
    id: usize,
    local: &DequeWorker<PathBuf>,
    injector: &Injector<PathBuf>,
    stealers: &[Stealer<PathBuf>],
) -> Option<PathBuf> {
    if let Some(dir) = local.pop() {
        return Some(dir);
    }

    loop {
        match injector.steal() {
            Steal::Success(dir) => return Some(dir),
            Steal::Empty => break,
            Steal::Retry => continue,
        }
    }

    for (i, stealer) in stealers.iter().enumerate() {
        if i == id {
            continue;
        }
        loop {
            match stealer.steal() {
                Steal::Success(dir) => return Some(dir),
                Steal::Empty => break,
                Steal::Retry => continue,
            }
        }
    }

    None
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
