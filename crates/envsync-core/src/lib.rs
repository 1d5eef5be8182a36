//! envsync core - template-driven settings store
//!
//! This crate keeps a flat `KEY=VALUE` store in line with a template that
//! declares the expected keys and their defaults, and exposes the reconciled
//! values as typed settings.

// Clippy pedantic allows - these are intentional design choices
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::module_name_repetitions)]

pub mod diff;
pub mod error;
pub mod prompt;
pub mod reconcile;
pub mod registry;
pub mod settings;
pub mod store;
pub mod util;

pub use diff::{Addition, Diff};
pub use error::{EnvSyncError, Result};
pub use prompt::{ConsolePrompter, Prompter, ScriptedPrompter};
pub use reconcile::{AppliedChanges, ReconcileOutcome, TemplateReconciler};
pub use registry::{RegistryOptions, SettingsRegistry, SharedSettings};
pub use settings::{Settings, SettingsSource};
pub use store::KeyValueStore;
