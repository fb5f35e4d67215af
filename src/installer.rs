//! Project initialization orchestrator
//!
//! Drives a single `init` run through fixed phases: safety checks,
//! requirement and configuration validation, module hooks and file
//! generation, then the consolidated output files. Unknown-module and
//! requirement failures surface before any file is touched; later
//! failures leave already-written files in place (no rollback).

use std::fs;
use std::path::PathBuf;

use crate::config::{find_project_marker, is_valid_project_name, InitConfig};
use crate::error::{InitError, InitResult};
use crate::module::{McpModule, ModuleRegistry};
use crate::output::OutputWriter;

/// Patterns every run unions into the project's `.gitignore`
pub const GITIGNORE_PATTERNS: &[&str] = &[
    ".env",
    "*.pyc",
    "__pycache__/",
    ".DS_Store",
    "node_modules/",
    ".venv/",
    "venv/",
];

/// Outcome of a successful `init` run
#[derive(Debug)]
pub struct InstallReport {
    /// Directory the project was written to
    pub project_path: PathBuf,
    /// Names of the modules that were installed, in registration order
    pub modules: Vec<String>,
    /// Consolidated files written by this run
    pub files: Vec<PathBuf>,
}

/// Runs the `init` lifecycle against a module registry
pub struct Installer {
    registry: ModuleRegistry,
    /// Directory new project directories are created under
    root: PathBuf,
}

impl Installer {
    /// Create an installer over the built-in modules, rooted at the
    /// current working directory
    pub fn new() -> Self {
        Self {
            registry: ModuleRegistry::builtin(),
            root: PathBuf::from("."),
        }
    }

    /// Replace the registry (used by tests to install stub modules)
    pub fn with_registry(mut self, registry: ModuleRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Set the directory project directories are created under
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    /// The registry this installer resolves modules against
    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    /// Run the full initialization lifecycle.
    ///
    /// Phases, in order:
    /// 1. in-place safety check and project name validation
    /// 2. module resolution (unknown names abort the run)
    /// 3. requirement checks, aggregated across all modules
    /// 4. project directory creation, then pre-install hooks
    /// 5. per-module configuration validation (aborts the run; files from
    ///    earlier phases are not rolled back)
    /// 6. per-module config file generation, collecting env variables and
    ///    server entries as we go
    /// 7. consolidated outputs: `.env`, `.mcp.json`, instructions, `.gitignore`
    /// 8. post-install hooks
    pub fn install(&self, config: &InitConfig) -> InitResult<InstallReport> {
        let project_path = self.resolve_project_path(config)?;

        if config.modules.is_empty() {
            return Err(InitError::NoModulesSelected);
        }
        let unknown = self.registry.unknown_names(&config.modules);
        if !unknown.is_empty() {
            return Err(InitError::UnknownModules { names: unknown });
        }
        let modules = self.registry.enabled(&config.modules);

        if let Err(errors) = self.registry.validate_all(&config.modules) {
            return Err(InitError::RequirementsNotMet { errors });
        }

        // Nothing has touched the filesystem until here.
        fs::create_dir_all(&project_path)?;
        tracing::info!("Initializing project at {}", project_path.display());

        for module in &modules {
            module.pre_install_hook(&project_path, config)?;
        }

        for module in &modules {
            if let Err(reason) = module.validate_config(config) {
                return Err(InitError::InvalidModuleConfig {
                    module: module.metadata().name,
                    reason,
                });
            }
        }

        let mut writer = OutputWriter::new(&project_path);
        for module in &modules {
            let name = module.metadata().name;
            tracing::debug!("Generating configuration for module: {}", name);
            module.generate_config_files(&project_path, config)?;
            writer.add_env_variables(module.env_variables(config));
            writer.add_server(name, module.mcp_json_section(&project_path, config));
        }

        let mut files = Vec::new();
        if let Some(env_file) = writer.write_env_file()? {
            files.push(env_file);
        }
        files.push(writer.write_mcp_json()?);
        files.push(writer.write_setup_instructions(&modules)?);
        files.push(writer.update_gitignore(GITIGNORE_PATTERNS)?);

        for module in &modules {
            module.post_install_hook(&project_path, config)?;
        }

        Ok(InstallReport {
            project_path,
            modules: modules.iter().map(|m| m.metadata().name).collect(),
            files,
        })
    }

    /// Validate the name and resolve the target directory.
    ///
    /// In-place runs target the root directory itself and refuse to proceed
    /// when it already contains a project marker file.
    fn resolve_project_path(&self, config: &InitConfig) -> InitResult<PathBuf> {
        if config.in_place {
            if let Some(marker) = find_project_marker(&self.root) {
                return Err(InitError::InPlaceUnsafe {
                    marker: marker.to_string(),
                });
            }
            return Ok(self.root.clone());
        }

        if !is_valid_project_name(&config.project_name) {
            return Err(InitError::InvalidProjectName {
                name: config.project_name.clone(),
            });
        }
        Ok(self.root.join(&config.project_name))
    }

    /// Format the `modules` listing as human-readable text
    pub fn describe_modules(&self) -> String {
        let mut out = String::new();
        for meta in self.registry.list() {
            out.push_str(&format!("{} v{}\n", meta.name, meta.version));
            out.push_str(&format!("  {}\n", meta.description));
            if let Some(module) = self.registry.get(&meta.name) {
                for opt in module.cli_options() {
                    let value = opt
                        .value_name
                        .as_deref()
                        .map(|v| format!(" <{}>", v))
                        .unwrap_or_default();
                    let default = opt
                        .default
                        .as_deref()
                        .map(|d| format!(" [default: {}]", d))
                        .unwrap_or_default();
                    out.push_str(&format!("  {}{}  {}{}\n", opt.flag, value, opt.help, default));
                }
            }
            out.push('\n');
        }
        out
    }
}

impl Default for Installer {
    fn default() -> Self {
        Self::new()
    }
}
