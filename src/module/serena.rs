//! Serena module: semantic code retrieval and editing toolkit
//!
//! Generates `.serena/project.yml` and registers a `uvx`-launched MCP
//! server pointed at the project directory.

use clap::Args;
use serde::Serialize;
use serde_json::json;
use std::fs;
use std::path::Path;

use crate::config::{is_valid_project_name, InitConfig};
use crate::error::InitResult;
use crate::module::traits::{CliOptionSpec, McpModule, ModuleMetadata};
use crate::output::ServerEntry;

/// Git source `uvx` fetches Serena from
pub const SERENA_REPO: &str = "git+https://github.com/oraios/serena";

/// Languages Serena's language servers support directly
const SUPPORTED_LANGUAGES: &[&str] = &[
    "csharp",
    "python",
    "rust",
    "java",
    "typescript",
    "javascript",
    "go",
    "cpp",
    "ruby",
];

/// Check if a language is supported (legacy names included)
pub fn is_supported_language(language: &str) -> bool {
    let language = language.to_lowercase();
    SUPPORTED_LANGUAGES.contains(&language.as_str())
        || matches!(language.as_str(), "php" | "elixir" | "clojure" | "c")
}

/// Normalize a language name.
///
/// Lowercases, maps legacy languages to typescript, and falls back to
/// typescript for anything unsupported.
pub fn normalize_language(language: &str) -> String {
    let language = language.to_lowercase();
    match language.as_str() {
        "php" | "elixir" | "clojure" | "c" => "typescript".to_string(),
        _ if SUPPORTED_LANGUAGES.contains(&language.as_str()) => language,
        _ => {
            tracing::warn!("Unsupported language '{}', falling back to typescript", language);
            "typescript".to_string()
        }
    }
}

/// CLI flags contributed by the Serena module
#[derive(Args, Debug, Clone, Default)]
pub struct SerenaArgs {
    /// Language for the Serena project config (overrides the positional language)
    #[arg(long = "serena-language", value_name = "LANG")]
    pub serena_language: Option<String>,

    /// Generate a read-only Serena configuration
    #[arg(long = "serena-read-only")]
    pub serena_read_only: bool,

    /// Comma-separated list of Serena tools to exclude
    #[arg(long = "serena-excluded-tools", value_name = "TOOLS")]
    pub serena_excluded_tools: Option<String>,

    /// Initial prompt embedded in the Serena project config
    #[arg(long = "serena-initial-prompt", value_name = "PROMPT")]
    pub serena_initial_prompt: Option<String>,
}

/// Serena's typed slice of the run configuration
#[derive(Debug, Clone, Default)]
pub struct SerenaConfig {
    /// Language override; falls back to the global language when unset
    pub language: Option<String>,
    /// Generate a read-only configuration
    pub read_only: bool,
    /// Tools to exclude
    pub excluded_tools: Vec<String>,
    /// Initial prompt (empty string when unset)
    pub initial_prompt: String,
}

impl From<SerenaArgs> for SerenaConfig {
    fn from(args: SerenaArgs) -> Self {
        Self {
            language: args.serena_language,
            read_only: args.serena_read_only,
            excluded_tools: args
                .serena_excluded_tools
                .map(|tools| {
                    tools
                        .split(',')
                        .map(str::trim)
                        .filter(|t| !t.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
            initial_prompt: args.serena_initial_prompt.unwrap_or_default(),
        }
    }
}

/// Shape of the generated `.serena/project.yml`
#[derive(Debug, Serialize)]
struct SerenaProjectConfig<'a> {
    project_name: &'a str,
    language: String,
    read_only: bool,
    excluded_tools: &'a [String],
    initial_prompt: &'a str,
}

/// The Serena integration module
#[derive(Debug, Default)]
pub struct SerenaModule;

impl SerenaModule {
    /// Create the module
    pub fn new() -> Self {
        Self
    }

    /// Resolve the effective language: module flag wins over the global one
    fn resolve_language(&self, config: &InitConfig) -> String {
        let language = config
            .serena
            .language
            .as_deref()
            .unwrap_or(&config.language);
        normalize_language(language)
    }
}

impl McpModule for SerenaModule {
    fn metadata(&self) -> ModuleMetadata {
        ModuleMetadata {
            name: "serena".to_string(),
            version: "1.0.0".to_string(),
            description: "Semantic code retrieval and editing toolkit".to_string(),
            author: "mcpinit".to_string(),
        }
    }

    fn cli_options(&self) -> Vec<CliOptionSpec> {
        vec![
            CliOptionSpec::new("--serena-language", "Language for the Serena project config")
                .with_value("LANG")
                .with_default("typescript"),
            CliOptionSpec::new("--serena-read-only", "Generate a read-only configuration"),
            CliOptionSpec::new(
                "--serena-excluded-tools",
                "Comma-separated list of Serena tools to exclude",
            )
            .with_value("TOOLS"),
            CliOptionSpec::new(
                "--serena-initial-prompt",
                "Initial prompt embedded in the project config",
            )
            .with_value("PROMPT"),
        ]
    }

    fn validate_requirements(&self) -> Result<(), String> {
        which::which("uvx").map(|_| ()).map_err(|_| {
            "'uvx' not found on PATH (install uv: https://docs.astral.sh/uv/)".to_string()
        })
    }

    fn validate_config(&self, config: &InitConfig) -> Result<(), String> {
        if !is_valid_project_name(&config.project_name) {
            return Err(format!("Invalid project name: '{}'", config.project_name));
        }
        Ok(())
    }

    fn generate_config_files(&self, project_path: &Path, config: &InitConfig) -> InitResult<()> {
        let language = self.resolve_language(config);

        // Serena's C# support needs a solution file to anchor on
        if language == "csharp" && !has_solution_file(project_path) {
            tracing::warn!(
                "C# projects need a .sln file for Serena; none found in {}",
                project_path.display()
            );
        }

        let serena_dir = project_path.join(".serena");
        fs::create_dir_all(&serena_dir)?;

        let project_config = SerenaProjectConfig {
            project_name: &config.project_name,
            language,
            read_only: config.serena.read_only,
            excluded_tools: &config.serena.excluded_tools,
            initial_prompt: &config.serena.initial_prompt,
        };

        let config_file = serena_dir.join("project.yml");
        fs::write(&config_file, serde_yaml::to_string(&project_config)?)?;
        tracing::info!("Created Serena configuration: {}", config_file.display());
        Ok(())
    }

    fn mcp_json_section(&self, project_path: &Path, _config: &InitConfig) -> ServerEntry {
        let absolute = std::path::absolute(project_path)
            .unwrap_or_else(|_| project_path.to_path_buf());

        ServerEntry::stdio("uvx")
            .with_arg("--from")
            .with_arg(SERENA_REPO)
            .with_arg("serena-mcp-server")
            .with_arg("--context")
            .with_arg("ide-assistant")
            .with_arg("--project")
            .with_arg(absolute.to_string_lossy())
    }

    fn setup_instructions(&self) -> Vec<String> {
        vec![
            "**Serena** (semantic code toolkit)".to_string(),
            String::new(),
            "1. Install uv, which provides the `uvx` launcher:".to_string(),
            "   `curl -LsSf https://astral.sh/uv/install.sh | sh`".to_string(),
            format!("2. Serena itself is fetched on demand via `uvx --from {}`", SERENA_REPO),
            "3. Review `.serena/project.yml` and adjust the language or excluded tools if needed"
                .to_string(),
        ]
    }

    fn default_config(&self) -> serde_json::Value {
        json!({
            "language": "typescript",
            "read_only": false,
            "excluded_tools": [],
            "initial_prompt": "",
        })
    }
}

/// Check for a .sln file directly under the project directory
fn has_solution_file(project_path: &Path) -> bool {
    fs::read_dir(project_path)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .any(|e| e.path().extension().is_some_and(|ext| ext == "sln"))
        })
        .unwrap_or(false)
}
