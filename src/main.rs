//! Asset build pipeline CLI.
//!
//! Resolves the directory configuration once at startup, then dispatches
//! to the build, dev, clean, or config subcommand.

use anyhow::{Context, Result};
use assetpipe::cli::{Cli, Command};
use assetpipe::config::{ConfigResolver, ResolvedConfig};
use assetpipe::pipeline;
use assetpipe::watcher::{start_watcher, ChangeEvent, WatcherConfig};
use clap::Parser;
use std::fs::OpenOptions;
use std::sync::Arc;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on --log option
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    match cli.log.as_str() {
        "0" | "off" => {
            // No logging
        }
        "1" | "stdout" => {
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(std::io::stdout)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        "2" | "stderr" => {
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(std::io::stderr)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        filename => {
            // Log to file (append mode)
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(filename)?;
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(file)
                .with_ansi(false)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }

    // Resolve the configuration exactly once, before any task is defined.
    // Configuration errors abort here; no task ever sees a partial tree.
    let resolver = ConfigResolver::discover(cli.root.as_deref());
    let config = Arc::new(
        resolver
            .load()
            .context("failed to resolve directory configuration")?,
    );
    info!(root = %resolver.project_root().display(), "Project root");

    match cli.command {
        Some(Command::Build) => {
            pipeline::build(&config, cli.prod).await?;
        }
        Some(Command::Clean) => {
            pipeline::clean(&config)?;
        }
        Some(Command::Config) => {
            println!("{}", serde_json::to_string_pretty(config.as_ref())?);
        }
        Some(Command::Dev) | None => {
            pipeline::build(&config, cli.prod).await?;
            run_watch_loop(config, cli.prod).await?;
        }
    }

    Ok(())
}

/// Re-run the owning tasks whenever their watched sources change.
async fn run_watch_loop(config: Arc<ResolvedConfig>, production: bool) -> Result<()> {
    let mut handle = start_watcher(&config, WatcherConfig::default())?;
    info!("Watching for changes (ctrl-c to stop)");

    while let Some(event) = handle.wait_for_change().await {
        match event {
            ChangeEvent::Changed(tasks) => {
                info!(?tasks, "Sources changed, re-running");
                if let Err(e) = pipeline::run_tasks(&tasks, &config, production).await {
                    warn!(error = %e, "Rebuild failed, still watching");
                }
            }
            ChangeEvent::Error(message) => {
                warn!(error = %message, "Watcher reported an error");
            }
        }
    }
    Ok(())
}
