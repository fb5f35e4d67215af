//! Configuration data model
//!
//! Two kinds of configuration live here:
//! - [`Config`]: the layered file/env configuration (tool-wide defaults)
//! - [`InitConfig`]: the fully resolved input for a single `init` run,
//!   composing global fields with per-module typed sections

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::module::cipher::CipherConfig;
use crate::module::serena::SerenaConfig;

/// Accepted project name pattern: starts alphanumeric, then letters,
/// digits, dots, hyphens, underscores; at most 100 characters total.
static PROJECT_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9][a-zA-Z0-9._-]{0,99}$").expect("valid regex"));

/// Files whose presence marks a directory as an existing project,
/// blocking --in-place initialization.
pub const PROJECT_MARKERS: &[&str] = &[
    "package.json",
    "requirements.txt",
    "Cargo.toml",
    "go.mod",
    "pom.xml",
    "build.gradle",
    "composer.json",
    ".git",
];

/// Validate a project name against the accepted pattern
pub fn is_valid_project_name(name: &str) -> bool {
    PROJECT_NAME_RE.is_match(name)
}

/// Return the first project marker present in `dir`, if any
pub fn find_project_marker(dir: &Path) -> Option<&'static str> {
    PROJECT_MARKERS
        .iter()
        .find(|marker| dir.join(marker).exists())
        .copied()
}

/// Tool-wide configuration loaded from layered config files
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Default values applied when CLI flags are omitted
    pub defaults: Defaults,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            defaults: Defaults::default(),
        }
    }
}

/// Default settings section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Defaults {
    /// Default project language when no positional language is given
    pub language: String,
    /// Default module set when --mcp is omitted
    pub modules: Vec<String>,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            language: "typescript".to_string(),
            modules: vec!["serena".to_string(), "cipher".to_string()],
        }
    }
}

/// Fully resolved input for a single `init` run.
///
/// Global fields plus one typed section per module; each module reads
/// only its own section and the globals.
#[derive(Debug, Clone, Default)]
pub struct InitConfig {
    /// Name of the project (and of the target directory unless in-place)
    pub project_name: String,
    /// Project language (module sections may override for their own files)
    pub language: String,
    /// Configure the current directory instead of creating a new one
    pub in_place: bool,
    /// Names of the modules to enable
    pub modules: Vec<String>,
    /// Serena module options
    pub serena: SerenaConfig,
    /// Cipher module options
    pub cipher: CipherConfig,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_valid_project_names() {
        assert!(is_valid_project_name("my-proj"));
        assert!(is_valid_project_name("Project_1.2"));
        assert!(is_valid_project_name("x"));
        assert!(is_valid_project_name("9lives"));
    }

    #[test]
    fn test_invalid_project_names() {
        assert!(!is_valid_project_name(""));
        assert!(!is_valid_project_name("-leading-dash"));
        assert!(!is_valid_project_name(".hidden"));
        assert!(!is_valid_project_name("has space"));
        assert!(!is_valid_project_name("bang!"));
        assert!(!is_valid_project_name(&"a".repeat(101)));
    }

    #[test]
    fn test_project_name_max_length() {
        assert!(is_valid_project_name(&"a".repeat(100)));
    }

    #[test]
    fn test_find_project_marker_empty_dir() {
        let dir = TempDir::new().unwrap();
        assert_eq!(find_project_marker(dir.path()), None);
    }

    #[test]
    fn test_find_project_marker_cargo_toml() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("Cargo.toml"), "[package]").unwrap();
        assert_eq!(find_project_marker(dir.path()), Some("Cargo.toml"));
    }

    #[test]
    fn test_find_project_marker_git_dir() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        assert_eq!(find_project_marker(dir.path()), Some(".git"));
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert_eq!(config.defaults.language, "typescript");
        assert_eq!(config.defaults.modules, vec!["serena", "cipher"]);
    }

    #[test]
    fn test_config_deserialize_partial() {
        let config: Config = toml_from_str(
            r#"
            [defaults]
            language = "python"
            "#,
        );
        assert_eq!(config.defaults.language, "python");
        // unspecified fields keep their defaults
        assert_eq!(config.defaults.modules, vec!["serena", "cipher"]);
    }

    fn toml_from_str(s: &str) -> Config {
        use figment::providers::{Format, Toml};
        use figment::Figment;
        Figment::new()
            .merge(figment::providers::Serialized::defaults(Config::default()))
            .merge(Toml::string(s))
            .extract()
            .unwrap()
    }
}
