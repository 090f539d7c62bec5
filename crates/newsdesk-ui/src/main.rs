//! NewsDesk terminal application

use anyhow::{Context, Result};
use clap::Parser;
use newsdesk_ui::cli::{self, Cli, Commands};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = cli.load_config()?;

    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(config.log_filter.as_deref().unwrap_or("warn"))
    });
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("NewsDesk v{}", env!("CARGO_PKG_VERSION"));

    let runtime = Arc::new(
        tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .context("failed to start the async runtime")?,
    );

    let command = cli.command.unwrap_or(Commands::Panel);
    cli::execute(command, &config, runtime)
}
