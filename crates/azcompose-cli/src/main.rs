//! # azc: azcompose CLI
//!
//! Composes the built-in programs against a stack file and shows what an
//! engine would receive: resources in dependency order, the graph, the
//! configuration consumed, and the stack outputs.

mod commands;
mod output;

use clap::Parser;

use crate::commands::Cli;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    commands::execute(cli)
}
