mod cli;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Commands};

// Re-export from lib for internal use
use codedrops::error;

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let default_filter = if cli.debug {
        "codedrops=debug"
    } else {
        "codedrops=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let config = cli::load_config(cli.config.as_deref())?;

    let success = match &cli.command {
        Commands::Compose {
            inputs,
            name,
            output,
            pattern,
        } => cli::compose(&config, inputs, name, output, pattern.as_deref())?,
        Commands::Extract(args) => cli::extract(&config, args)?,
        Commands::Construct(args) => cli::construct(&config, args)?,
    };

    Ok(if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
