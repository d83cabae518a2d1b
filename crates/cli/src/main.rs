mod cli;
mod run;
mod tree;

use anyhow::Result;
use clap::Parser;

use crate::cli::{CliArgs, Command};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = CliArgs::parse();
    match args.command {
        Command::Run(run_args) => run::run(run_args).await,
        Command::Tree(tree_args) => tree::run(tree_args),
    }
}
