//! Settings listing

use anyhow::{Context, Result};
use envsync_core::settings::SettingView;
use envsync_core::util::{mask_secret, safe_truncate_with_ellipsis};
use envsync_core::{ConsolePrompter, SettingsRegistry};

use crate::config::Config;

/// Longest value shown in the table before truncation
const MAX_VALUE_CHARS: usize = 60;

fn display_value(row: &SettingView, reveal: bool) -> Option<String> {
    row.value.as_ref().map(|value| {
        if row.secret && !reveal {
            mask_secret(value)
        } else {
            value.clone()
        }
    })
}

/// Build the registry (reconciling first) and print every setting
pub fn run(config: &Config, json: bool, reveal: bool) -> Result<()> {
    let registry = SettingsRegistry::new(config.registry_options());
    let settings = registry
        .instance(&mut ConsolePrompter::stdio())
        .context("Could not load settings")?;
    let rows = settings.read().view();

    if json {
        let map: serde_json::Map<String, serde_json::Value> = rows
            .iter()
            .map(|row| {
                let value = display_value(row, reveal)
                    .map_or(serde_json::Value::Null, serde_json::Value::String);
                (row.name.to_string(), value)
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&map)?);
        return Ok(());
    }

    println!("Settings ({})", config.paths.store.display());
    println!("========\n");
    for row in &rows {
        let value = match display_value(row, reveal) {
            Some(v) => safe_truncate_with_ellipsis(&v, MAX_VALUE_CHARS),
            None => "(unset)".to_string(),
        };
        println!("  {:<26} {value}", row.name);
    }

    Ok(())
}
