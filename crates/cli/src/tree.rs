use std::io::Read;

use anyhow::{Context, Result};
use tracing::info;

use jobpool_tree::{from_flat, Node};

use crate::cli::TreeArgs;

fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read nodes from stdin")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(input).with_context(|| format!("failed to read {input}"))
    }
}

pub fn run(args: TreeArgs) -> Result<()> {
    let raw = read_input(&args.input)?;
    let flat: Vec<Node> = serde_json::from_str(&raw).context("input is not a JSON array of nodes")?;
    let count = flat.len();

    let forest = from_flat(flat);
    info!(nodes = count, roots = forest.len(), "tree built");

    let out = if args.compact {
        serde_json::to_string(&forest)?
    } else {
        serde_json::to_string_pretty(&forest)?
    };
    println!("{out}");
    Ok(())
}
