//! CLI command modules

pub mod config;
pub mod reconcile;
pub mod show;
pub mod store;
