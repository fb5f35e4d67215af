//! Error types for mcpinit
//!
//! Provides structured error types with suggestions for common issues.

use thiserror::Error;

/// Result type for init operations
pub type InitResult<T> = Result<T, InitError>;

/// Main error type for project initialization
#[derive(Error, Debug)]
pub enum InitError {
    /// Project name does not match the accepted pattern
    #[error("Invalid project name: '{name}'")]
    InvalidProjectName { name: String },

    /// No modules were selected for installation
    #[error("No MCP modules selected")]
    NoModulesSelected,

    /// One or more requested modules are not in the registry
    #[error("Unknown module(s): {}", names.join(", "))]
    UnknownModules { names: Vec<String> },

    /// Module requirements are not met (external tools missing, etc.)
    #[error("Module requirements not met:\n{}", errors.join("\n"))]
    RequirementsNotMet { errors: Vec<String> },

    /// A module rejected the supplied configuration
    #[error("Invalid configuration for module '{module}': {reason}")]
    InvalidModuleConfig { module: String, reason: String },

    /// In-place mode refused because the directory looks like a project
    #[error("Cannot initialize in place: directory already contains '{marker}'")]
    InPlaceUnsafe { marker: String },

    /// JSON serialization/parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl InitError {
    /// A short hint the CLI prints below the error message, if any.
    pub fn suggestion(&self) -> Option<String> {
        match self {
            InitError::InvalidProjectName { .. } => Some(
                "Project names must start with a letter or digit and contain only \
                 letters, digits, dots, hyphens, and underscores (max 100 chars)."
                    .to_string(),
            ),
            InitError::NoModulesSelected => Some(
                "Pass --mcp with a comma-separated module list, e.g. --mcp serena,cipher."
                    .to_string(),
            ),
            InitError::UnknownModules { .. } => {
                Some("Run 'mcpinit modules' to see the available modules.".to_string())
            }
            InitError::RequirementsNotMet { .. } => {
                Some("Install the missing tools and re-run.".to_string())
            }
            InitError::InPlaceUnsafe { .. } => Some(
                "Run without --in-place to create a new project directory instead.".to_string(),
            ),
            _ => None,
        }
    }
}
