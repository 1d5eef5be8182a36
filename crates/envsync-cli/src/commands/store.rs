//! Direct store edits

use anyhow::{bail, Context, Result};
use clap::Subcommand;
use envsync_core::store::is_valid_key;
use envsync_core::{EnvSyncError, KeyValueStore};

use crate::config::Config;

#[derive(Subcommand)]
pub enum StoreCommands {
    /// Print the stored value of a key
    Get {
        /// Key name (e.g., FAST_LLM_MODEL)
        key: String,
    },
    /// Set a key and save the store
    Set {
        /// Key name
        key: String,
        /// Value to store
        value: String,
    },
    /// Remove a key and save the store
    Unset {
        /// Key name
        key: String,
    },
    /// List stored keys
    List,
}

pub fn run(cmd: StoreCommands, config: &Config) -> Result<()> {
    match cmd {
        StoreCommands::Get { key } => get(config, &key),
        StoreCommands::Set { key, value } => set(config, &key, &value),
        StoreCommands::Unset { key } => unset(config, &key),
        StoreCommands::List => list(config),
    }
}

fn load(config: &Config) -> Result<KeyValueStore> {
    KeyValueStore::load(&config.paths.store)
        .with_context(|| format!("Could not read {}", config.paths.store.display()))
}

fn get(config: &Config, key: &str) -> Result<()> {
    match load(config)?.get(key) {
        Some(value) => println!("{value}"),
        None => bail!("{key} is not set in {}", config.paths.store.display()),
    }
    Ok(())
}

fn set(config: &Config, key: &str, value: &str) -> Result<()> {
    if !is_valid_key(key) {
        bail!(EnvSyncError::InvalidKey(key.to_string()));
    }

    let path = &config.paths.store;
    let mut store = match KeyValueStore::load(path) {
        Ok(store) => store,
        Err(EnvSyncError::NotFound(_)) => {
            println!("Creating {}", path.display());
            KeyValueStore::new()
        }
        Err(e) => return Err(e).with_context(|| format!("Could not read {}", path.display())),
    };

    store.set(key, value)?;
    store.save(path)?;
    println!("Updated {key} in {}", path.display());
    Ok(())
}

fn unset(config: &Config, key: &str) -> Result<()> {
    let mut store = load(config)?;
    if store.unset(key).is_none() {
        println!("{key} was not set");
        return Ok(());
    }

    store.save(&config.paths.store)?;
    println!("Removed {key} from {}", config.paths.store.display());
    Ok(())
}

fn list(config: &Config) -> Result<()> {
    let store = load(config)?;
    if store.is_empty() {
        println!("{} is empty", config.paths.store.display());
        return Ok(());
    }

    for (key, value) in store.iter() {
        if value.is_empty() {
            println!("{key} (empty)");
        } else {
            println!("{key}");
        }
    }
    Ok(())
}
