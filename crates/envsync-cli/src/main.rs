//! envsync CLI - keep a `.env` store in line with its `.env.template`
//!
//! Reconciles the store against the template, reports drift, prints the
//! typed settings and edits individual store entries.

// Clippy pedantic allows - these are intentional design choices
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::needless_pass_by_value)]

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;

use commands::{reconcile, show, store};
use crate::config::Config;

#[derive(Parser)]
#[command(name = "envsync")]
#[command(author, version, about = "envsync - template-driven settings store", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Template file (overrides paths.template)
    #[arg(long, global = true, value_name = "PATH")]
    template: Option<PathBuf>,

    /// Store file (overrides paths.store)
    #[arg(long, global = true, value_name = "PATH")]
    store: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge template changes into the store, asking for approval
    Reconcile,

    /// Show drift between template and store without changing anything
    Diff {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Reconcile, then print the typed settings
    Show {
        /// Print as JSON
        #[arg(long)]
        json: bool,

        /// Print credentials unmasked
        #[arg(long)]
        reveal: bool,
    },

    /// Read or edit single store entries
    #[command(subcommand)]
    Store(store::StoreCommands),

    /// Configuration management
    #[command(subcommand)]
    Config(commands::config::ConfigCommands),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load()?;
    if let Some(template) = cli.template {
        config.paths.template = template;
    }
    if let Some(store) = cli.store {
        config.paths.store = store;
    }

    // Initialize logging based on verbosity; stdout stays free for prompts
    let log_level = if cli.verbose {
        "debug"
    } else {
        config.logging.level.as_str()
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("envsync={log_level},envsync_core={log_level}").into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Reconcile => reconcile::run(&config),
        Commands::Diff { json } => reconcile::diff(&config, json),
        Commands::Show { json, reveal } => show::run(&config, json, reveal),
        Commands::Store(cmd) => store::run(cmd, &config),
        Commands::Config(cmd) => commands::config::run(cmd, &config),
    }
}
