use std::fmt;
use std::future::Future;

use futures::future::BoxFuture;
use futures::FutureExt;

/// A nullary unit of work executed for its side effects only.
///
/// Jobs carry no identity and no result. They run inline on whichever worker
/// receives them; a panic inside a job takes that worker's task down with it.
pub struct Job {
    task: BoxFuture<'static, ()>,
}

impl Job {
    /// Wrap an async block or any other `Send` future.
    pub fn new<F>(future: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Self {
            task: future.boxed(),
        }
    }

    /// Wrap a plain synchronous closure. It runs to completion on the worker
    /// task without yielding, so keep it short.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self::new(async move { f() })
    }

    pub(crate) async fn run(self) {
        self.task.await
    }
}

impl<F> From<F> for Job
where
    F: FnOnce() + Send + 'static,
{
    fn from(f: F) -> Self {
        Job::from_fn(f)
    }
}

impl fmt::Debug for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Job").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn closure_job_runs_once() {
        let hits = Arc::new(AtomicUsize::new(0));
        let h = hits.clone();
        let job = Job::from_fn(move || {
            h.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(hits.load(Ordering::SeqCst), 0, "constructing a job must not run it");
        job.run().await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn closure_converts_into_job() {
        let hits = Arc::new(AtomicUsize::new(0));
        let h = hits.clone();
        let job: Job = (move || {
            h.fetch_add(1, Ordering::SeqCst);
        })
        .into();

        job.run().await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn async_job_can_await() {
        let (tx, rx) = tokio::sync::oneshot::channel();
        let job = Job::new(async move {
            tokio::task::yield_now().await;
            let _ = tx.send(42u32);
        });

        job.run().await;
        assert_eq!(rx.await.unwrap(), 42);
    }
}
