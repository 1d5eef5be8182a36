//! Process-wide settings registry
//!
//! The registry owns the template/store path pair and builds [`Settings`]
//! exactly once: the first [`SettingsRegistry::instance`] call reconciles the
//! store, reloads it and populates the typed fields. Concurrent first calls
//! block on the same initialization, and every later call hands back the same
//! [`SharedSettings`] without reconciling again. A failed construction leaves
//! the registry empty, so no caller ever sees settings read from a store that
//! was not reconciled.

use std::path::PathBuf;
use std::sync::Arc;

use once_cell::sync::{Lazy, OnceCell};
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info};

use crate::error::Result;
use crate::prompt::{ConsolePrompter, Prompter};
use crate::reconcile::{ReconcileOutcome, TemplateReconciler};
use crate::settings::{Settings, SettingsSource};
use crate::store::KeyValueStore;

/// Default template file, relative to the working directory.
pub const DEFAULT_TEMPLATE_PATH: &str = ".env.template";
/// Default live store file, relative to the working directory.
pub const DEFAULT_STORE_PATH: &str = ".env";

/// Construction parameters for a [`SettingsRegistry`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryOptions {
    pub template_path: PathBuf,
    pub store_path: PathBuf,
    /// Let exported environment variables win over store entries
    pub env_override: bool,
}

impl Default for RegistryOptions {
    fn default() -> Self {
        Self {
            template_path: PathBuf::from(DEFAULT_TEMPLATE_PATH),
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
            env_override: true,
        }
    }
}

/// Cloneable handle to the one settings object.
///
/// Clones share state: a setter called through any clone is visible through
/// all of them. Setters never write the store.
#[derive(Debug, Clone)]
pub struct SharedSettings(Arc<RwLock<Settings>>);

impl SharedSettings {
    pub fn new(settings: Settings) -> Self {
        Self(Arc::new(RwLock::new(settings)))
    }

    pub fn read(&self) -> RwLockReadGuard<'_, Settings> {
        self.0.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, Settings> {
        self.0.write()
    }

    /// Copy of the current values.
    pub fn snapshot(&self) -> Settings {
        self.0.read().clone()
    }

    /// True if both handles point at the same settings object.
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }
}

/// Lazily constructed, reconcile-once settings holder.
#[derive(Debug)]
pub struct SettingsRegistry {
    options: RegistryOptions,
    cell: OnceCell<SharedSettings>,
}

impl SettingsRegistry {
    pub fn new(options: RegistryOptions) -> Self {
        Self {
            options,
            cell: OnceCell::new(),
        }
    }

    pub fn options(&self) -> &RegistryOptions {
        &self.options
    }

    /// The settings handle, constructing it on first call.
    ///
    /// `prompter` is only consulted by the call that performs construction.
    pub fn instance(&self, prompter: &mut dyn Prompter) -> Result<SharedSettings> {
        self.cell
            .get_or_try_init(|| self.construct(prompter))
            .cloned()
    }

    /// Like [`instance`](Self::instance), but the prompter is only created
    /// by the call that performs construction, inside the init lock.
    pub fn instance_with<P, F>(&self, make_prompter: F) -> Result<SharedSettings>
    where
        P: Prompter,
        F: FnOnce() -> P,
    {
        self.cell
            .get_or_try_init(|| {
                let mut prompter = make_prompter();
                self.construct(&mut prompter)
            })
            .cloned()
    }

    /// The handle if construction already happened.
    pub fn get(&self) -> Option<SharedSettings> {
        self.cell.get().cloned()
    }

    fn construct(&self, prompter: &mut dyn Prompter) -> Result<SharedSettings> {
        let reconciler =
            TemplateReconciler::new(&self.options.template_path, &self.options.store_path);

        match reconciler.reconcile(prompter)? {
            ReconcileOutcome::NoDrift => debug!("Store already reconciled"),
            ReconcileOutcome::Declined(diff) => debug!(
                additions = diff.additions.len(),
                removals = diff.removals.len(),
                "Continuing with unmerged store"
            ),
            ReconcileOutcome::Applied(_) => debug!("Reloading merged store"),
        }

        let store = KeyValueStore::load(&self.options.store_path)?;
        let source = SettingsSource::new(&store, self.options.env_override);
        let settings = Settings::from_source(&source);

        info!(
            "Settings loaded from {} ({} entries)",
            self.options.store_path.display(),
            store.len()
        );
        Ok(SharedSettings::new(settings))
    }
}

static GLOBAL: Lazy<SettingsRegistry> =
    Lazy::new(|| SettingsRegistry::new(RegistryOptions::default()));

/// Process-wide settings over `.env.template` / `.env` in the working
/// directory, prompting on the console during first construction.
///
/// Prefer building a [`SettingsRegistry`] at process entry and passing the
/// handle down; this exists for code that has no such handle.
pub fn global() -> Result<SharedSettings> {
    GLOBAL.instance_with(ConsolePrompter::stdio)
}
