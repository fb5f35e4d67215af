//! Configuration loader with XDG-compliant path resolution
//!
//! Loads configuration from multiple locations with layered priority:
//! 1. `/etc/mcpinit/config.toml` (lowest priority)
//! 2. `~/.config/mcpinit/config.toml`
//! 3. `~/.mcpinit.toml`
//! 4. `./.mcpinit.toml` (highest priority)

use std::path::PathBuf;

use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use super::model::Config;

/// Application name used for XDG directories
const APP_NAME: &str = "mcpinit";

/// Get XDG config search paths in priority order (lowest to highest)
pub fn config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    // 1. System-wide config (lowest priority)
    paths.push(PathBuf::from(format!("/etc/{}/config.toml", APP_NAME)));

    // 2. XDG config home
    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join(APP_NAME).join("config.toml"));
    }

    // 3. Home directory (legacy/convenience)
    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(format!(".{}.toml", APP_NAME)));
    }

    // 4. Current directory / project root (highest priority)
    paths.push(PathBuf::from(format!(".{}.toml", APP_NAME)));

    paths
}

/// Load configuration with XDG layering
///
/// Configurations are merged in priority order, with later files
/// overriding earlier ones. Environment variables with prefix
/// `MCPINIT_` override all file-based configuration.
///
/// # Arguments
/// * `override_path` - Optional path to a config file that takes highest priority
///
/// # Returns
/// * `Result<Config>` - The merged configuration
pub fn load_config(override_path: Option<&str>) -> Result<Config> {
    let mut figment = Figment::new();

    // Start with defaults
    figment = figment.merge(Serialized::defaults(Config::default()));

    // Layer configs from lowest to highest priority
    for path in config_paths() {
        if path.exists() {
            tracing::debug!("Loading config from: {}", path.display());
            figment = figment.merge(Toml::file(&path));
        }
    }

    // Override path takes highest priority (if provided)
    if let Some(path) = override_path {
        let path = PathBuf::from(path);
        if path.exists() {
            tracing::debug!("Loading override config from: {}", path.display());
            figment = figment.merge(Toml::file(&path));
        } else {
            tracing::warn!("Override config not found: {}", path.display());
        }
    }

    // Environment variables override everything
    // Format: MCPINIT_DEFAULTS__LANGUAGE=python
    // Maps to: defaults.language = "python"
    figment = figment.merge(Env::prefixed("MCPINIT_").split("__"));

    figment.extract().context("Failed to load configuration")
}
