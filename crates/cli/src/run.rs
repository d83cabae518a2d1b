use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tracing::info;

use jobpool::{Job, Pool, PoolConfig};

use crate::cli::RunArgs;

/// Resolve pool sizing: file (or defaults) with env overrides, then flags.
fn resolve_config(args: &RunArgs) -> Result<PoolConfig> {
    let mut config = match &args.config {
        Some(path) => PoolConfig::from_file(path)
            .with_context(|| format!("failed to load pool config from {}", path.display()))?,
        None => PoolConfig::from_env().context("invalid pool config in environment")?,
    };
    if let Some(n) = args.workers {
        config.max_workers = n;
    }
    if let Some(n) = args.queue_depth {
        config.max_queue_depth = n;
    }
    config.validate().context("invalid pool size")?;
    Ok(config)
}

pub async fn run(args: RunArgs) -> Result<()> {
    let config = resolve_config(&args)?;
    let mut pool = Pool::from_config(&config).context("failed to create pool")?;
    pool.start();

    let finished = Arc::new(AtomicUsize::new(0));
    let job_time = Duration::from_millis(args.job_millis);
    let began = Instant::now();

    for i in 0..args.jobs {
        let finished = Arc::clone(&finished);
        pool.submit(Job::new(async move {
            info!(job = i, "job started");
            tokio::time::sleep(job_time).await;
            info!(job = i, "job finished");
            finished.fetch_add(1, Ordering::SeqCst);
        }))
        .await
        .context("pool stopped while submitting")?;
    }
    info!(jobs = args.jobs, elapsed = ?began.elapsed(), "all jobs submitted");

    if !args.stop_early {
        while finished.load(Ordering::SeqCst) < args.jobs {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    pool.stop();
    pool.wait().await;

    let done = finished.load(Ordering::SeqCst);
    println!(
        "{done}/{} jobs finished on {} workers in {:.2?}",
        args.jobs,
        pool.max_workers(),
        began.elapsed()
    );
    Ok(())
}
