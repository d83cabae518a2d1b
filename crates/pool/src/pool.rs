use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, Notify};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, info, warn};

use crate::config::PoolConfig;
use crate::dispatcher::Dispatcher;
use crate::error::PoolError;
use crate::job::Job;
use crate::registry::{IdleWorkers, Registry};
use crate::worker::{Worker, WorkerState};

// ── PoolHandle ───────────────────────────────────────────────────────

/// Cloneable producer handle: submit jobs and request a stop from any task.
#[derive(Debug, Clone)]
pub struct PoolHandle {
    jobs: mpsc::Sender<Job>,
    quit: Arc<Notify>,
}

impl PoolHandle {
    /// Queue a job, waiting while the queue is full.
    ///
    /// Fails only once the dispatcher has shut down and closed the queue.
    pub async fn submit(&self, job: Job) -> Result<(), PoolError> {
        self.jobs.send(job).await.map_err(|_| PoolError::Stopped)
    }

    /// Ask the dispatcher to stop. Returns immediately; repeated calls are
    /// harmless.
    pub fn stop(&self) {
        self.quit.notify_one();
    }

    /// Free slots left in the job queue.
    pub fn remaining_capacity(&self) -> usize {
        self.jobs.capacity()
    }
}

// ── Pool ─────────────────────────────────────────────────────────────

/// A fixed set of workers fed from a bounded job queue by a single dispatcher.
///
/// ```ignore
/// let mut pool = Pool::new(3, 10)?;
/// pool.start();
/// for i in 0..20 {
///     pool.submit(Job::from_fn(move || println!("job {i}"))).await?;
/// }
/// pool.stop();
/// pool.wait().await;
/// ```
pub struct Pool {
    max_workers: usize,
    max_queue_depth: usize,
    handle: PoolHandle,
    /// Dispatcher inputs, moved into its task by `start()`.
    pending: Option<(mpsc::Receiver<Job>, IdleWorkers)>,
    workers: Vec<Worker>,
    /// Completion tracking: one entry per running worker task.
    tasks: JoinSet<usize>,
    dispatcher: Option<JoinHandle<()>>,
    /// Advisory count of busy workers. Informational only.
    running: Arc<AtomicUsize>,
}

impl Pool {
    /// Allocate the queue, the registry, and `max_workers` workers. Nothing
    /// runs until [`start`](Self::start).
    pub fn new(max_workers: usize, max_queue_depth: usize) -> Result<Self, PoolError> {
        Self::from_config(&PoolConfig::new(max_workers, max_queue_depth))
    }

    pub fn from_config(config: &PoolConfig) -> Result<Self, PoolError> {
        config.validate()?;

        let (jobs_tx, jobs_rx) = mpsc::channel(config.max_queue_depth);
        let (registry, idle) = Registry::bounded(config.max_workers);
        let running = Arc::new(AtomicUsize::new(0));

        let workers = (0..config.max_workers)
            .map(|id| Worker::new(id, registry.clone(), Arc::clone(&running)))
            .collect();

        debug!(
            workers = config.max_workers,
            queue_depth = config.max_queue_depth,
            "pool created"
        );

        Ok(Self {
            max_workers: config.max_workers,
            max_queue_depth: config.max_queue_depth,
            handle: PoolHandle {
                jobs: jobs_tx,
                quit: Arc::new(Notify::new()),
            },
            pending: Some((jobs_rx, idle)),
            workers,
            tasks: JoinSet::new(),
            dispatcher: None,
            running,
        })
    }

    /// Start every worker, then the dispatcher. Must be called from within a
    /// tokio runtime. A second call does nothing.
    pub fn start(&mut self) {
        let Some((jobs, idle)) = self.pending.take() else {
            warn!("pool already started");
            return;
        };

        for worker in &mut self.workers {
            worker.start(&mut self.tasks);
        }

        let handles = self.workers.iter().map(Worker::handle).collect();
        let dispatcher = Dispatcher::new(jobs, idle, Arc::clone(&self.handle.quit), handles);
        self.dispatcher = Some(dispatcher.spawn());

        info!(
            workers = self.max_workers,
            queue_depth = self.max_queue_depth,
            "pool started"
        );
    }

    /// Queue a job, waiting while the queue is full. See [`PoolHandle::submit`].
    pub async fn submit(&self, job: Job) -> Result<(), PoolError> {
        self.handle.submit(job).await
    }

    /// Signal the dispatcher to stop. Returns immediately.
    ///
    /// Jobs still sitting in the queue when the dispatcher sees the signal are
    /// discarded, not run.
    pub fn stop(&self) {
        info!("pool stop requested");
        self.handle.stop();
    }

    /// Wait until every worker task has exited, then reap the dispatcher.
    ///
    /// Returns immediately if the pool was never started. Worker tasks that
    /// died from a panicking job are logged and otherwise ignored.
    pub async fn wait(&mut self) {
        while let Some(res) = self.tasks.join_next().await {
            match res {
                Ok(id) => debug!(worker = id, "worker joined"),
                Err(e) if e.is_panic() => {
                    warn!(error = %e, "worker terminated by a panicking job")
                }
                Err(e) => warn!(error = %e, "worker task failed"),
            }
        }

        if let Some(dispatcher) = self.dispatcher.take() {
            if let Err(e) = dispatcher.await {
                warn!(error = %e, "dispatcher task failed");
            }
        }
        info!("pool drained");
    }

    /// Cloneable handle for producers running in other tasks.
    pub fn handle(&self) -> PoolHandle {
        self.handle.clone()
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    pub fn max_queue_depth(&self) -> usize {
        self.max_queue_depth
    }

    pub fn is_started(&self) -> bool {
        self.pending.is_none()
    }

    /// Advisory number of workers currently executing a job. Read with
    /// relaxed ordering; never use it to make correctness decisions.
    pub fn running_count(&self) -> usize {
        self.running.load(Ordering::Relaxed)
    }

    /// Last recorded state of each worker, indexed by worker id.
    pub fn worker_states(&self) -> Vec<WorkerState> {
        self.workers.iter().map(Worker::state).collect()
    }
}
