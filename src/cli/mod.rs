//! pNode Health Command Line Interface.
//!
//! Operator tooling around the health monitor: configuration assembly and
//! report rendering. Argument parsing lives in the binary.

pub mod output;

pub use output::*;

use std::path::Path;

use crate::core::{config::MonitorConfig, directory::NodeDirectory};
use crate::error::Result;
use crate::monitoring::HealthMonitor;
use crate::storage::FileStore;

// ═══════════════════════════════════════════════════════════════════════════════
// MONITOR ASSEMBLY
// ═══════════════════════════════════════════════════════════════════════════════

/// Resolve configuration: file (if any), then environment, then validation
pub fn load_config(path: Option<&Path>) -> Result<MonitorConfig> {
    let config = match path {
        Some(path) => MonitorConfig::load(path)?,
        None => MonitorConfig::default(),
    };
    let config = config.with_env()?;
    config.validate()?;
    Ok(config)
}

/// Build a file-backed monitor from a resolved configuration
pub fn open_monitor(config: MonitorConfig) -> Result<HealthMonitor<FileStore>> {
    let store = FileStore::new(&config.data_dir)?;
    let directory = match &config.directory_file {
        Some(path) => NodeDirectory::load(path)?,
        None => NodeDirectory::new(),
    };
    Ok(HealthMonitor::new(store, config, directory))
}

// ═══════════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════════
