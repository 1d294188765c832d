//! CLI command definitions for assetpipe.
//!
//! This module defines the CLI structure using clap's derive macros.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Asset build pipeline
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Project root directory (overrides ASSETPIPE_ROOT)
    #[arg(short, long, global = true)]
    pub root: Option<PathBuf>,

    /// Production build variant (minified, no sourcemaps)
    #[arg(short, long, global = true)]
    pub prod: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Clean, run all tasks, then watch sources (default if no subcommand given)
    Dev,

    /// Clean and run all tasks once
    Build,

    /// Remove the output directory
    Clean,

    /// Print the resolved configuration as JSON
    Config,
}
