//! Bounded worker pool with a dispatcher that matches queued jobs to idle workers.
//!
//! A [`Pool`] owns a fixed set of [`Worker`] tasks, a bounded job queue, and an
//! availability [`Registry`] through which idle workers advertise their inbox.
//! A single dispatcher task pulls jobs off the queue and hands each one to the
//! first idle worker. Shutdown is cooperative: [`Pool::stop`] signals the
//! dispatcher, which forwards a stop to every worker, and [`Pool::wait`]
//! resolves once all workers have exited.

pub mod config;
mod dispatcher;
pub mod error;
pub mod job;
pub mod pool;
pub mod registry;
pub mod worker;

pub use config::PoolConfig;
pub use error::PoolError;
pub use job::Job;
pub use pool::{Pool, PoolHandle};
pub use registry::{IdleWorkers, Inbox, Registry};
pub use worker::{Worker, WorkerHandle, WorkerState};
