//! Common traits and types for MCP integration modules
//!
//! Defines the interface that all modules (serena, cipher, ...) must
//! implement so the installer can treat them polymorphically.

use serde::Serialize;
use std::path::Path;

use crate::config::InitConfig;
use crate::error::InitResult;
use crate::output::ServerEntry;

/// Immutable metadata describing a module
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ModuleMetadata {
    /// Unique module name; the registry key
    pub name: String,
    /// Module version
    pub version: String,
    /// One-line description
    pub description: String,
    /// Module author
    pub author: String,
}

/// Descriptor for a CLI option a module contributes.
///
/// The actual flag binding happens at compile time via clap `Args` structs
/// flattened into the `init` subcommand; these descriptors drive the
/// `modules` listing and documentation output.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CliOptionSpec {
    /// Long flag name, including leading dashes (e.g. "--cipher-openai-key")
    pub flag: String,
    /// Value placeholder, if the flag takes a value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_name: Option<String>,
    /// Default value, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    /// Help text
    pub help: String,
}

impl CliOptionSpec {
    /// Create a new option descriptor
    pub fn new(flag: impl Into<String>, help: impl Into<String>) -> Self {
        Self {
            flag: flag.into(),
            value_name: None,
            default: None,
            help: help.into(),
        }
    }

    /// Set the value placeholder
    pub fn with_value(mut self, value_name: impl Into<String>) -> Self {
        self.value_name = Some(value_name.into());
        self
    }

    /// Set the default value
    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }
}

/// Trait for MCP integration modules
///
/// Each module contributes configuration files, environment variables, and
/// an MCP server entry. The installer drives the lifecycle:
/// `validate_requirements` -> `pre_install_hook` -> `validate_config` ->
/// `generate_config_files` -> collect env/server entries ->
/// `post_install_hook`.
pub trait McpModule: Send + Sync {
    /// Module metadata; `metadata().name` is the registry key
    fn metadata(&self) -> ModuleMetadata;

    /// CLI options this module contributes, for listing and documentation
    fn cli_options(&self) -> Vec<CliOptionSpec>;

    /// Check environment preconditions (e.g. a required tool on PATH).
    ///
    /// Pure check, no mutation. The error string is user-facing.
    fn validate_requirements(&self) -> Result<(), String>;

    /// Validate the module's slice of the run configuration.
    ///
    /// The default accepts anything; modules override to enforce required
    /// fields or format rules.
    fn validate_config(&self, _config: &InitConfig) -> Result<(), String> {
        Ok(())
    }

    /// Write module-specific files under `project_path`.
    ///
    /// Must create parent directories as needed. An error here is fatal to
    /// the run.
    fn generate_config_files(&self, project_path: &Path, config: &InitConfig) -> InitResult<()>;

    /// The launch descriptor merged into the shared `.mcp.json`.
    ///
    /// Embedded paths must be absolute (or use the `{project_path}`
    /// placeholder), since other tools launching the server may run from
    /// a different working directory.
    fn mcp_json_section(&self, project_path: &Path, config: &InitConfig) -> ServerEntry;

    /// Environment variables this module contributes.
    ///
    /// Only variables with non-empty values are written to `.env`.
    fn env_variables(&self, _config: &InitConfig) -> Vec<(String, String)> {
        Vec::new()
    }

    /// Human-readable post-install steps, no side effects
    fn setup_instructions(&self) -> Vec<String>;

    /// Static defaults reference, not the config actually applied
    fn default_config(&self) -> serde_json::Value;

    /// Called before the generation phase, in registration order
    fn pre_install_hook(&self, _project_path: &Path, _config: &InitConfig) -> InitResult<()> {
        Ok(())
    }

    /// Called after the generation phase, in registration order
    fn post_install_hook(&self, _project_path: &Path, _config: &InitConfig) -> InitResult<()> {
        Ok(())
    }
}
