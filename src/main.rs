mod cli;
mod commands;
mod config;
mod dedupe;
mod grounding;
mod merge;
mod model;
mod reconcile;
mod repair;
mod report;
mod similarity;
mod util;

use anyhow::Result;
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};

fn main() {
    init_tracing();

    if let Err(err) = run() {
        error!(error = %err, "command failed");
        for cause in err.chain().skip(1) {
            error!(cause = %cause, "caused by");
        }
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Repair(args) => commands::repair::run(args),
        Commands::Merge(args) => commands::merge::run(args),
        Commands::Validate(args) => commands::validate::run(args),
        Commands::Report(args) => commands::report::run(args),
        Commands::Run(args) => commands::run::run(args),
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
