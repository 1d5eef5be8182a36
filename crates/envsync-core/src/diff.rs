//! Drift between a template and a live store
//!
//! Pure computation, no I/O: the reconciler decides what to do with the result.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::store::KeyValueStore;

/// A key the template wants filled in, with its suggested default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Addition {
    pub key: String,
    pub default: String,
}

/// Result of comparing a store against a template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diff {
    /// Template keys with a non-empty default whose store entry is missing or empty.
    pub additions: Vec<Addition>,
    /// Store keys the template does not mention.
    pub removals: Vec<String>,
}

impl Diff {
    /// Compare `store` against `template`.
    ///
    /// Non-empty store values are never proposed for change, and a template
    /// key with an empty default is never proposed as an addition.
    pub fn compute(template: &KeyValueStore, store: &KeyValueStore) -> Self {
        let additions = template
            .iter()
            .filter(|(_, default)| !default.is_empty())
            .filter(|(key, _)| store.get(key).map_or(true, str::is_empty))
            .map(|(key, default)| Addition {
                key: key.to_string(),
                default: default.to_string(),
            })
            .collect();

        let removals = store
            .keys()
            .filter(|key| !template.contains(key))
            .map(str::to_string)
            .collect();

        Self {
            additions,
            removals,
        }
    }

    /// No drift at all.
    pub fn is_empty(&self) -> bool {
        self.additions.is_empty() && self.removals.is_empty()
    }

    pub fn addition_keys(&self) -> impl Iterator<Item = &str> {
        self.additions.iter().map(|a| a.key.as_str())
    }
}

impl fmt::Display for Diff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return writeln!(f, "No changes found in template");
        }

        writeln!(f, "Changes found in template:")?;
        for addition in &self.additions {
            writeln!(f, "{} = {}", addition.key, addition.default)?;
        }
        if !self.removals.is_empty() {
            writeln!(f, "Removed keys from template: {}", self.removals.join(", "))?;
        }
        Ok(())
    }
}
