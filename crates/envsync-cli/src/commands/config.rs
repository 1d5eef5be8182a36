//! Configuration management commands

use anyhow::Result;
use clap::Subcommand;

use crate::config::{Config, CONFIG_FILE_NAME, DEFAULT_CONFIG_TOML};

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,
    /// Write a default envsync.toml in the current directory
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}

pub fn run(cmd: ConfigCommands, config: &Config) -> Result<()> {
    match cmd {
        ConfigCommands::Show => show(config),
        ConfigCommands::Init { force } => init(force),
    }
}

fn show(config: &Config) -> Result<()> {
    println!("Current Configuration");
    println!("=====================\n");

    match Config::find_config_file() {
        Some(path) => println!("Config file: {}\n", path.display()),
        None => println!("No configuration file found. Using defaults.\n"),
    }

    println!("  paths.template = {}", config.paths.template.display());
    println!("  paths.store = {}", config.paths.store.display());
    println!("  logging.level = {}", config.logging.level);
    println!("  registry.env_override = {}", config.registry.env_override);

    Ok(())
}

fn init(force: bool) -> Result<()> {
    if std::path::Path::new(CONFIG_FILE_NAME).exists() && !force {
        println!("Configuration file already exists: {CONFIG_FILE_NAME}");
        println!("Use --force to overwrite");
        return Ok(());
    }

    std::fs::write(CONFIG_FILE_NAME, DEFAULT_CONFIG_TOML)?;
    println!("Configuration file created: {CONFIG_FILE_NAME}");

    Ok(())
}
