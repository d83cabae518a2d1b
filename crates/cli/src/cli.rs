use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Bounded worker pool demo and tree builder.
#[derive(Parser, Debug)]
#[command(name = "jobpool", version, about)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a batch of sleeping jobs through a pool and report what happened.
    Run(RunArgs),
    /// Read flat nodes as JSON and print them as a tree.
    Tree(TreeArgs),
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Path to a TOML pool config (max_workers, max_queue_depth).
    #[arg(long, env = "JOBPOOL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Worker count (overrides config and env).
    #[arg(long)]
    pub workers: Option<usize>,

    /// Job queue depth (overrides config and env).
    #[arg(long)]
    pub queue_depth: Option<usize>,

    /// Number of jobs to submit.
    #[arg(long, default_value_t = 20)]
    pub jobs: usize,

    /// How long each job sleeps, in milliseconds.
    #[arg(long, default_value_t = 1000)]
    pub job_millis: u64,

    /// Stop as soon as everything is submitted instead of waiting for the
    /// jobs to finish. Jobs still queued at that point may never run.
    #[arg(long)]
    pub stop_early: bool,
}

#[derive(Args, Debug)]
pub struct TreeArgs {
    /// JSON file with an array of `{id, name, parent_id?}` objects; `-` reads stdin.
    #[arg(long, default_value = "-")]
    pub input: String,

    /// Print compact JSON instead of pretty.
    #[arg(long)]
    pub compact: bool,
}
