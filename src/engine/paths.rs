// LeadScout Engine — Centralized path management
//
// All paths under the LeadScout data root are resolved through this module.
// Default root: `~/.leadscout/`, overridable via `CoreConfig::data_dir`.

use std::path::{Path, PathBuf};

use crate::engine::config::CoreConfig;

/// The default data root: `~/.leadscout/`
pub fn default_data_dir() -> PathBuf {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".leadscout")
}

/// The root data directory, honoring the config override.
pub fn data_dir(config: &CoreConfig) -> PathBuf {
    config.data_dir.clone().unwrap_or_else(default_data_dir)
}

/// Encrypted session slots: `{data_root}/sessions/`
pub fn sessions_dir(root: &Path) -> PathBuf {
    root.join("sessions")
}

/// Per-caller last-used-handle hints: `{data_root}/callers/`
pub fn callers_dir(root: &Path) -> PathBuf {
    root.join("callers")
}
