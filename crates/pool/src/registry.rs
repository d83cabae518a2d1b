//! Availability registry: a bounded channel of idle workers' inboxes.
//!
//! Workers hold a cloned [`Registry`] and [`release`](Registry::release) their
//! [`Inbox`] each time they become idle. The dispatcher owns the single
//! [`IdleWorkers`] receiver and [`acquire`](IdleWorkers::acquire)s an inbox
//! whenever it has a job to hand out. Capacity equals the worker count, so a
//! worker can always deposit its inbox without waiting on another worker.

use tokio::sync::mpsc;

use crate::job::Job;

/// Handle to one worker's private job inbox.
#[derive(Debug, Clone)]
pub struct Inbox {
    worker_id: usize,
    tx: mpsc::Sender<Job>,
}

impl Inbox {
    pub(crate) fn new(worker_id: usize, tx: mpsc::Sender<Job>) -> Self {
        Self { worker_id, tx }
    }

    /// Id of the worker that owns this inbox.
    pub fn worker_id(&self) -> usize {
        self.worker_id
    }

    /// Hand a job to the owning worker. Gives the job back if the worker's
    /// task is gone.
    pub async fn deliver(&self, job: Job) -> Result<(), Job> {
        self.tx.send(job).await.map_err(|e| e.0)
    }
}

/// Producer side of the registry, one clone per worker.
#[derive(Debug, Clone)]
pub struct Registry {
    tx: mpsc::Sender<Inbox>,
}

/// Consumer side of the registry, owned by the dispatcher.
#[derive(Debug)]
pub struct IdleWorkers {
    rx: mpsc::Receiver<Inbox>,
}

impl Registry {
    /// Create a registry that holds at most `capacity` idle inboxes.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero. [`Pool`](crate::Pool) validates this
    /// before getting here.
    pub fn bounded(capacity: usize) -> (Registry, IdleWorkers) {
        let (tx, rx) = mpsc::channel(capacity);
        (Registry { tx }, IdleWorkers { rx })
    }

    /// Advertise an idle worker. Returns `false` once the dispatcher has gone
    /// away and nobody will ever acquire it.
    pub async fn release(&self, inbox: Inbox) -> bool {
        self.tx.send(inbox).await.is_ok()
    }
}

impl IdleWorkers {
    /// Wait for the next idle worker. `None` means every worker task has
    /// exited and dropped its registry handle.
    pub async fn acquire(&mut self) -> Option<Inbox> {
        self.rx.recv().await
    }

    /// Number of inboxes currently parked in the registry.
    pub fn idle_count(&self) -> usize {
        self.rx.len()
    }
}
