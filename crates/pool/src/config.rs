use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::PoolError;

/// Pool sizing, typically parsed from TOML with environment overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Number of workers. Fixed for the lifetime of the pool.
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,
    /// Job queue capacity. `submit` waits once this many jobs are queued.
    #[serde(default = "default_max_queue_depth")]
    pub max_queue_depth: usize,
}

fn default_max_workers() -> usize { 4 }
fn default_max_queue_depth() -> usize { 64 }

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_workers: default_max_workers(),
            max_queue_depth: default_max_queue_depth(),
        }
    }
}

impl PoolConfig {
    pub fn new(max_workers: usize, max_queue_depth: usize) -> Self {
        Self {
            max_workers,
            max_queue_depth,
        }
    }

    /// Parse config from a TOML string, apply env overrides, and validate.
    pub fn from_toml(toml_str: &str) -> Result<Self, PoolError> {
        let mut config: Self = toml::from_str(toml_str)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load config from a file path.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, PoolError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml(&content)
    }

    /// Defaults with env overrides applied (call `dotenvy::dotenv()` first if
    /// you want a `.env` file honoured).
    pub fn from_env() -> Result<Self, PoolError> {
        let mut config = Self::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides.
    ///
    /// - `JOBPOOL_MAX_WORKERS` -> `max_workers`
    /// - `JOBPOOL_MAX_QUEUE_DEPTH` -> `max_queue_depth`
    ///
    /// Unparseable values are ignored.
    pub fn apply_env_overrides(&mut self) {
        if let Some(n) = env_usize("JOBPOOL_MAX_WORKERS") {
            self.max_workers = n;
        }
        if let Some(n) = env_usize("JOBPOOL_MAX_QUEUE_DEPTH") {
            self.max_queue_depth = n;
        }
    }

    /// Both bounds must be positive: the underlying channels cannot be
    /// created with zero capacity.
    pub fn validate(&self) -> Result<(), PoolError> {
        if self.max_workers == 0 {
            return Err(PoolError::InvalidConfig(
                "max_workers must be at least 1".into(),
            ));
        }
        if self.max_queue_depth == 0 {
            return Err(PoolError::InvalidConfig(
                "max_queue_depth must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

fn env_usize(key: &str) -> Option<usize> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = PoolConfig::default();
        assert_eq!(cfg.max_workers, 4);
        assert_eq!(cfg.max_queue_depth, 64);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn parse_partial_toml_fills_defaults() {
        let cfg: PoolConfig = toml::from_str("max_workers = 3").unwrap();
        assert_eq!(cfg.max_workers, 3);
        assert_eq!(cfg.max_queue_depth, 64);
    }

    #[test]
    fn parse_full_toml() {
        let cfg: PoolConfig = toml::from_str(
            r#"
max_workers = 2
max_queue_depth = 5
"#,
        )
        .unwrap();
        assert_eq!(cfg, PoolConfig::new(2, 5));
    }

    #[test]
    fn zero_workers_rejected() {
        let err = PoolConfig::new(0, 5).validate().unwrap_err();
        assert!(matches!(err, PoolError::InvalidConfig(ref m) if m.contains("max_workers")));
    }

    #[test]
    fn zero_depth_rejected() {
        let err = PoolConfig::new(1, 0).validate().unwrap_err();
        assert!(matches!(err, PoolError::InvalidConfig(ref m) if m.contains("max_queue_depth")));
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        let err = PoolConfig::from_toml("max_workers = \"many\"").unwrap_err();
        assert!(matches!(err, PoolError::ConfigParse(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = PoolConfig::from_file("/nonexistent/jobpool.toml").unwrap_err();
        assert!(matches!(err, PoolError::ConfigIo(_)));
    }

    #[test]
    fn env_overrides_apply() {
        // Only this test touches these variables.
        std::env::set_var("JOBPOOL_MAX_WORKERS", "7");
        std::env::set_var("JOBPOOL_MAX_QUEUE_DEPTH", "not-a-number");
        let mut cfg = PoolConfig::new(1, 9);
        cfg.apply_env_overrides();
        std::env::remove_var("JOBPOOL_MAX_WORKERS");
        std::env::remove_var("JOBPOOL_MAX_QUEUE_DEPTH");

        assert_eq!(cfg.max_workers, 7);
        assert_eq!(cfg.max_queue_depth, 9);
    }
}
