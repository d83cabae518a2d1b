//! Pool workers.
//!
//! Each worker loops: advertise its inbox in the [`Registry`], then wait for
//! either a job or a stop request. A stop is only observed at that idle wait
//! point, so a running job always finishes first.

use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, Notify};
use tokio::task::JoinSet;
use tracing::{debug, trace};

use crate::job::Job;
use crate::registry::{Inbox, Registry};

// ── WorkerState ──────────────────────────────────────────────────────

/// Coarse lifecycle of a worker, as last recorded by its own task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkerState {
    /// Constructed, task not spawned yet.
    Created = 0,
    /// Inbox advertised (or about to be), waiting for a job or a stop.
    Idle = 1,
    /// Executing a job.
    Busy = 2,
    /// Stop observed, task exited.
    Stopped = 3,
}

impl WorkerState {
    fn from_u8(v: u8) -> Self {
        match v {
            1 => WorkerState::Idle,
            2 => WorkerState::Busy,
            3 => WorkerState::Stopped,
            _ => WorkerState::Created,
        }
    }
}

// ── WorkerHandle ─────────────────────────────────────────────────────

/// Cheap handle used by the dispatcher to stop a worker.
#[derive(Debug, Clone)]
pub struct WorkerHandle {
    id: usize,
    quit: Arc<Notify>,
}

impl WorkerHandle {
    pub fn id(&self) -> usize {
        self.id
    }

    /// Request the worker to stop. Returns immediately.
    ///
    /// The signal is a stored permit, so it is not lost if the worker is busy,
    /// and repeated calls never block.
    pub fn stop(&self) {
        trace!(worker = self.id, "stop requested");
        self.quit.notify_one();
    }
}

// ── Worker ───────────────────────────────────────────────────────────

/// Everything the worker task takes ownership of when it is spawned.
struct WorkerParts {
    inbox_tx: mpsc::Sender<Job>,
    inbox_rx: mpsc::Receiver<Job>,
    registry: Registry,
    running: Arc<AtomicUsize>,
}

/// One slot of the pool.
pub struct Worker {
    id: usize,
    quit: Arc<Notify>,
    state: Arc<AtomicU8>,
    parts: Option<WorkerParts>,
}

impl Worker {
    /// Build a worker that advertises itself through `registry`. `running` is
    /// the pool's advisory busy counter.
    pub fn new(id: usize, registry: Registry, running: Arc<AtomicUsize>) -> Self {
        // Single-slot inbox: the dispatcher only sends after acquiring the
        // inbox from the registry, so at most one job is ever in flight here.
        let (inbox_tx, inbox_rx) = mpsc::channel(1);
        Self {
            id,
            quit: Arc::new(Notify::new()),
            state: Arc::new(AtomicU8::new(WorkerState::Created as u8)),
            parts: Some(WorkerParts {
                inbox_tx,
                inbox_rx,
                registry,
                running,
            }),
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn state(&self) -> WorkerState {
        WorkerState::from_u8(self.state.load(Ordering::Relaxed))
    }

    pub fn handle(&self) -> WorkerHandle {
        WorkerHandle {
            id: self.id,
            quit: Arc::clone(&self.quit),
        }
    }

    /// Spawn the worker loop into `tasks`. The task's output is the worker id.
    ///
    /// Returns `false` if this worker was already started.
    pub fn start(&mut self, tasks: &mut JoinSet<usize>) -> bool {
        let Some(parts) = self.parts.take() else {
            debug!(worker = self.id, "worker already started");
            return false;
        };

        let id = self.id;
        let quit = Arc::clone(&self.quit);
        let state = Arc::clone(&self.state);
        state.store(WorkerState::Idle as u8, Ordering::Relaxed);
        tasks.spawn(Self::run(id, parts, quit, state));
        true
    }

    /// Same as [`WorkerHandle::stop`].
    pub fn stop(&self) {
        self.handle().stop();
    }

    async fn run(id: usize, parts: WorkerParts, quit: Arc<Notify>, state: Arc<AtomicU8>) -> usize {
        let WorkerParts {
            inbox_tx,
            mut inbox_rx,
            registry,
            running,
        } = parts;
        debug!(worker = id, "worker started");

        loop {
            state.store(WorkerState::Idle as u8, Ordering::Relaxed);
            if !registry.release(Inbox::new(id, inbox_tx.clone())).await {
                // Dispatcher is gone; it stops every worker on its way out,
                // so the quit permit is already stored or about to be.
                trace!(worker = id, "registry closed");
            }

            // A job already handed over always runs before a pending stop.
            tokio::select! {
                biased;
                job = inbox_rx.recv() => {
                    let Some(job) = job else { break };
                    state.store(WorkerState::Busy as u8, Ordering::Relaxed);
                    let _busy = BusyGuard::enter(&running);
                    trace!(worker = id, "job started");
                    job.run().await;
                    trace!(worker = id, "job finished");
                }
                _ = quit.notified() => break,
            }
        }

        state.store(WorkerState::Stopped as u8, Ordering::Relaxed);
        debug!(worker = id, "worker stopped");
        id
    }
}

/// Keeps the advisory busy count honest even if the job panics.
struct BusyGuard<'a>(&'a AtomicUsize);

impl<'a> BusyGuard<'a> {
    fn enter(running: &'a AtomicUsize) -> Self {
        running.fetch_add(1, Ordering::Relaxed);
        Self(running)
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::Relaxed);
    }
}

// ── Tests ────────────────────────────────────────────────────────────
