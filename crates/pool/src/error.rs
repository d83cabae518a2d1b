use thiserror::Error;

/// Errors surfaced by pool construction, configuration, and submission.
///
/// Job execution never produces one of these: a job has no error channel.
#[derive(Debug, Error)]
pub enum PoolError {
    #[error("invalid pool config: {0}")]
    InvalidConfig(String),

    #[error("pool is stopped, job queue is closed")]
    Stopped,

    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("config I/O error: {0}")]
    ConfigIo(#[from] std::io::Error),
}
