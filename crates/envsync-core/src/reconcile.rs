//! Template reconciliation
//!
//! Brings the live store in line with the template's key set:
//! 1. Load the template (absent template is fatal, store untouched)
//! 2. Load the store, offering to create an empty one if it is absent
//! 3. Compute the [`Diff`]; an empty diff returns without prompting
//! 4. Ask once for approval of the whole merge
//! 5. On approval, ask for a value per addition and drop every removal,
//!    then write the store in a single save
//!
//! Nothing is written unless the merge is approved (store creation aside),
//! and the single save happens only after every answer has been collected.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::diff::Diff;
use crate::error::{EnvSyncError, Result};
use crate::prompt::Prompter;
use crate::store::KeyValueStore;

/// Where an added value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueSource {
    /// Typed in by the operator
    Operator,
    /// Operator left the answer empty
    TemplateDefault,
}

/// A key written during an approved merge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilledKey {
    pub key: String,
    pub value: String,
    pub source: ValueSource,
}

/// What an approved merge changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedChanges {
    pub filled: Vec<FilledKey>,
    pub removed: Vec<String>,
}

/// How a reconciliation pass ended. None of these are failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Store already matches the template
    NoDrift,
    /// Operator declined the merge; the store was not modified
    Declined(Diff),
    /// Merge approved and saved
    Applied(AppliedChanges),
}

impl ReconcileOutcome {
    pub fn changed_store(&self) -> bool {
        matches!(self, ReconcileOutcome::Applied(_))
    }
}

/// Diffs a template file against a live store file and applies approved merges.
#[derive(Debug, Clone)]
pub struct TemplateReconciler {
    template_path: PathBuf,
    store_path: PathBuf,
}

impl TemplateReconciler {
    pub fn new(template_path: impl Into<PathBuf>, store_path: impl Into<PathBuf>) -> Self {
        Self {
            template_path: template_path.into(),
            store_path: store_path.into(),
        }
    }

    pub fn template_path(&self) -> &Path {
        &self.template_path
    }

    pub fn store_path(&self) -> &Path {
        &self.store_path
    }

    fn load_template(&self) -> Result<KeyValueStore> {
        KeyValueStore::load(&self.template_path).map_err(|e| match e {
            EnvSyncError::NotFound(path) => EnvSyncError::TemplateMissing(path),
            other => other,
        })
    }

    /// Report drift without prompting or writing. A missing store is
    /// compared as if it were empty.
    pub fn diff_only(&self) -> Result<Diff> {
        let template = self.load_template()?;
        let store = match KeyValueStore::load(&self.store_path) {
            Ok(store) => store,
            Err(EnvSyncError::NotFound(_)) => KeyValueStore::new(),
            Err(e) => return Err(e),
        };
        Ok(Diff::compute(&template, &store))
    }

    /// Run one reconciliation pass.
    pub fn reconcile(&self, prompter: &mut dyn Prompter) -> Result<ReconcileOutcome> {
        let template = match self.load_template() {
            Ok(template) => template,
            Err(e) => {
                warn!("Reconciliation aborted: {}", e);
                return Err(e);
            }
        };
        let mut store = self.load_or_create_store(prompter)?;

        let diff = Diff::compute(&template, &store);
        if diff.is_empty() {
            debug!(
                "{} matches {}",
                self.store_path.display(),
                self.template_path.display()
            );
            return Ok(ReconcileOutcome::NoDrift);
        }

        debug!(
            additions = diff.additions.len(),
            removals = diff.removals.len(),
            "Drift detected"
        );
        prompter.notify(diff.to_string().trim_end())?;

        let question = format!(
            "Do you want to apply changes to {}?",
            self.store_path.display()
        );
        if !prompter.confirm(&question)? {
            prompter.notify("No changes applied")?;
            info!("Merge declined, {} left unchanged", self.store_path.display());
            return Ok(ReconcileOutcome::Declined(diff));
        }

        let applied = self.apply(&diff, &mut store, prompter)?;
        store.save(&self.store_path)?;

        info!(
            filled = applied.filled.len(),
            removed = applied.removed.len(),
            "Merged template into {}",
            self.store_path.display()
        );
        Ok(ReconcileOutcome::Applied(applied))
    }

    fn load_or_create_store(&self, prompter: &mut dyn Prompter) -> Result<KeyValueStore> {
        match KeyValueStore::load(&self.store_path) {
            Ok(store) => Ok(store),
            Err(EnvSyncError::NotFound(path)) => {
                let question = format!("File {} not found. Create an empty file?", path.display());
                if !prompter.confirm(&question)? {
                    return Err(EnvSyncError::StoreMissing(path));
                }

                let store = KeyValueStore::new();
                store.save(&path)?;
                info!("Created empty store at {}", path.display());
                Ok(store)
            }
            Err(e) => Err(e),
        }
    }

    /// Collects every answer into `store` in memory; the caller saves.
    fn apply(
        &self,
        diff: &Diff,
        store: &mut KeyValueStore,
        prompter: &mut dyn Prompter,
    ) -> Result<AppliedChanges> {
        let mut applied = AppliedChanges::default();

        if !diff.additions.is_empty() {
            prompter.notify(
                "Warning: You may enter confidential information. \
                 Do not share this part of the log with third parties.",
            )?;
            prompter.notify(
                "Enter new values for the following keys or leave empty to keep the default:",
            )?;
        }

        for addition in &diff.additions {
            let answer = prompter.ask_value(&addition.key, &addition.default)?;
            let answer = answer.trim();

            let (value, source) = if answer.is_empty() {
                (addition.default.clone(), ValueSource::TemplateDefault)
            } else {
                (answer.to_string(), ValueSource::Operator)
            };

            store.set(addition.key.clone(), value.clone())?;
            match source {
                ValueSource::Operator => prompter.notify(&format!("Updated {}", addition.key))?,
                ValueSource::TemplateDefault => {
                    prompter.notify(&format!("Kept {} = {}", addition.key, value))?;
                }
            }
            applied.filled.push(FilledKey {
                key: addition.key.clone(),
                value,
                source,
            });
        }

        for key in &diff.removals {
            store.unset(key);
            prompter.notify(&format!("Removed {key}"))?;
            applied.removed.push(key.clone());
        }

        Ok(applied)
    }
}
