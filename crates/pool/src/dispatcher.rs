//! The dispatcher task: moves jobs from the pool queue to idle workers.
//!
//! Each turn waits on whichever comes first, a queued job or the pool's quit
//! signal. The two are not prioritized: `tokio::select!` picks randomly among
//! ready branches, so a stop issued while jobs are still queued can win and
//! those jobs are dropped unexecuted. Callers who need every job to run must
//! wait for the work to finish before calling [`Pool::stop`](crate::Pool::stop).

use std::sync::Arc;

use tokio::sync::{mpsc, Notify};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use crate::job::Job;
use crate::registry::IdleWorkers;
use crate::worker::WorkerHandle;

pub(crate) struct Dispatcher {
    jobs: mpsc::Receiver<Job>,
    idle: IdleWorkers,
    quit: Arc<Notify>,
    workers: Vec<WorkerHandle>,
}

/// Why the dispatch loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Exit {
    Quit,
    QueueClosed,
    NoWorkers,
}

impl Dispatcher {
    pub(crate) fn new(
        jobs: mpsc::Receiver<Job>,
        idle: IdleWorkers,
        quit: Arc<Notify>,
        workers: Vec<WorkerHandle>,
    ) -> Self {
        Self {
            jobs,
            idle,
            quit,
            workers,
        }
    }

    pub(crate) fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    async fn run(mut self) {
        info!(workers = self.workers.len(), "dispatcher running");

        let exit = loop {
            tokio::select! {
                job = self.jobs.recv() => match job {
                    Some(job) => {
                        if !self.dispatch(job).await {
                            break Exit::NoWorkers;
                        }
                    }
                    None => break Exit::QueueClosed,
                },
                _ = self.quit.notified() => break Exit::Quit,
            }
        };

        // Draining: refuse new submissions and discard whatever is still queued.
        self.jobs.close();
        let mut dropped = 0usize;
        while self.jobs.try_recv().is_ok() {
            dropped += 1;
        }
        if dropped > 0 {
            debug!(dropped, "queued jobs discarded at shutdown");
        }

        for worker in &self.workers {
            worker.stop();
        }
        info!(reason = ?exit, "dispatcher stopped");
    }

    /// Hand one job to the next idle worker. Returns `false` when no worker
    /// is left to take it.
    async fn dispatch(&mut self, job: Job) -> bool {
        let Some(inbox) = self.idle.acquire().await else {
            warn!("all worker tasks have exited, dropping job");
            return false;
        };

        let worker = inbox.worker_id();
        match inbox.deliver(job).await {
            Ok(()) => trace!(worker, "job dispatched"),
            Err(_) => warn!(worker, "worker inbox closed, job dropped"),
        }
        true
    }
}
