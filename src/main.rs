// src/main.rs

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing subscriber for logging
    let filter = if cli.verbose {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if cli.list {
        return commands::cmd_list(cli.catalog.as_deref());
    }

    commands::cmd_install(
        &cli.libs,
        &cli.ldir,
        commands::InstallOptions {
            jobs: cli.jobs,
            strict: cli.strict,
            catalog: cli.catalog,
            scratch: cli.scratch,
        },
    )
}
