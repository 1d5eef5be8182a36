//! Reconciliation and drift reporting commands

use anyhow::{Context, Result};
use envsync_core::{ConsolePrompter, ReconcileOutcome, TemplateReconciler};

use crate::config::Config;

fn reconciler(config: &Config) -> TemplateReconciler {
    TemplateReconciler::new(&config.paths.template, &config.paths.store)
}

/// Interactive reconciliation of the store against the template
pub fn run(config: &Config) -> Result<()> {
    let reconciler = reconciler(config);
    let mut prompter = ConsolePrompter::stdio();

    let outcome = reconciler
        .reconcile(&mut prompter)
        .context("Reconciliation failed")?;

    let store = config.paths.store.display();
    match outcome {
        ReconcileOutcome::NoDrift => {
            println!("{store} is up to date with {}", config.paths.template.display());
        }
        ReconcileOutcome::Declined(diff) => {
            println!(
                "Left {store} unchanged ({} addition(s), {} removal(s) pending)",
                diff.additions.len(),
                diff.removals.len()
            );
        }
        ReconcileOutcome::Applied(applied) => {
            println!(
                "Updated {store}: {} key(s) filled, {} key(s) removed",
                applied.filled.len(),
                applied.removed.len()
            );
        }
    }

    Ok(())
}

/// Print drift without prompting or writing
pub fn diff(config: &Config, json: bool) -> Result<()> {
    let diff = reconciler(config)
        .diff_only()
        .context("Could not compute drift")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&diff)?);
    } else {
        print!("{diff}");
    }

    Ok(())
}
