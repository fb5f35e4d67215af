//! Configuration module for mcpinit
//!
//! Provides XDG-compliant layered configuration loading for tool-wide
//! defaults, plus the resolved per-run [`InitConfig`] model.

pub mod loader;
pub mod model;

pub use loader::{config_paths, load_config};
pub use model::*;
