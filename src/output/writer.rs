//! Consolidated artifact writer
//!
//! Accumulates environment variables and MCP server entries contributed by
//! modules during a run, then serializes the consolidated files: `.env`,
//! `.mcp.json` (merged with any pre-existing file), the setup instructions
//! document, and the `.gitignore` pattern list.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use crate::error::InitResult;
use crate::module::McpModule;
use crate::output::manifest::{McpServers, ServerEntry, MCP_JSON_FILE, PROJECT_PATH_PLACEHOLDER};
use crate::output::merge::merge_json_file;

/// File name of the generated instructions document
pub const INSTRUCTIONS_FILE: &str = "MCP_SETUP_INSTRUCTIONS.md";

/// File name of the generated environment file
pub const ENV_FILE: &str = ".env";

/// Accumulates cross-module output state and serializes it to disk
#[derive(Debug)]
pub struct OutputWriter {
    project_path: PathBuf,
    /// Env vars in insertion order; later additions overwrite earlier
    /// entries with the same name in place.
    env_vars: Vec<(String, String)>,
    servers: BTreeMap<String, ServerEntry>,
}

impl OutputWriter {
    /// Create a writer targeting the given project directory
    pub fn new(project_path: impl Into<PathBuf>) -> Self {
        Self {
            project_path: project_path.into(),
            env_vars: Vec::new(),
            servers: BTreeMap::new(),
        }
    }

    /// Add a single environment variable, overwriting any earlier value
    pub fn add_env_variable(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.env_vars.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.env_vars.push((name, value)),
        }
    }

    /// Add several environment variables
    pub fn add_env_variables(&mut self, variables: impl IntoIterator<Item = (String, String)>) {
        for (name, value) in variables {
            self.add_env_variable(name, value);
        }
    }

    /// Register an MCP server entry under the given module name
    pub fn add_server(&mut self, name: impl Into<String>, entry: ServerEntry) {
        self.servers.insert(name.into(), entry);
    }

    /// Write the `.env` file.
    ///
    /// One `KEY=VALUE` line per variable in insertion order, preceded by a
    /// header comment. Values are written verbatim, no quoting. Variables
    /// with empty values are skipped; if nothing remains, no file is
    /// written and `None` is returned.
    pub fn write_env_file(&self) -> InitResult<Option<PathBuf>> {
        let non_empty: Vec<_> = self
            .env_vars
            .iter()
            .filter(|(_, value)| !value.is_empty())
            .collect();

        if non_empty.is_empty() {
            tracing::debug!("No environment variables to write, skipping .env");
            return Ok(None);
        }

        let mut content = vec![
            "# Environment Variables for MCP Servers".to_string(),
            format!("# Generated by mcpinit v{}", env!("CARGO_PKG_VERSION")),
            String::new(),
        ];
        for (name, value) in non_empty {
            content.push(format!("{}={}", name, value));
        }
        content.push(String::new());

        let env_file = self.project_path.join(ENV_FILE);
        fs::write(&env_file, content.join("\n"))?;
        tracing::info!("Created environment file: {}", env_file.display());
        Ok(Some(env_file))
    }

    /// Write the `.mcp.json` registry.
    ///
    /// Any `{project_path}` placeholder in server args is replaced with the
    /// project's absolute path first; the result is deep-merged into a
    /// pre-existing file so entries for other modules survive.
    pub fn write_mcp_json(&self) -> InitResult<PathBuf> {
        let absolute = std::path::absolute(&self.project_path)?;
        let absolute_str = absolute.to_string_lossy();

        let mut doc = McpServers::default();
        for (name, entry) in &self.servers {
            let mut entry = entry.clone();
            for arg in &mut entry.args {
                if arg.contains(PROJECT_PATH_PLACEHOLDER) {
                    *arg = arg.replace(PROJECT_PATH_PLACEHOLDER, &absolute_str);
                }
            }
            doc.servers.insert(name.clone(), entry);
        }

        let mcp_file = self.project_path.join(MCP_JSON_FILE);
        let existed = mcp_file.exists();
        merge_json_file(&mcp_file, &serde_json::to_value(&doc)?)?;

        tracing::info!(
            "{} MCP configuration: {}",
            if existed { "Updated" } else { "Created" },
            mcp_file.display()
        );
        Ok(mcp_file)
    }

    /// Write the setup instructions document.
    ///
    /// A fixed skeleton (overview, per-module sections, API-key reminder,
    /// client configuration notes, troubleshooting) interleaved with each
    /// module's own instruction lines verbatim.
    pub fn write_setup_instructions(&self, modules: &[&dyn McpModule]) -> InitResult<PathBuf> {
        let mut content = vec![
            "# MCP Setup Instructions".to_string(),
            String::new(),
            "This project has been configured with MCP (Model Context Protocol) servers."
                .to_string(),
            String::new(),
            "## Configured Modules".to_string(),
            String::new(),
        ];

        for module in modules {
            let meta = module.metadata();
            content.push(format!("### {}", meta.name));
            content.push(format!("- Version: {}", meta.version));
            content.push(format!("- Description: {}", meta.description));
            content.push(String::new());
        }

        content.push("## Setup Steps".to_string());
        content.push(String::new());

        for module in modules {
            let instructions = module.setup_instructions();
            if !instructions.is_empty() {
                content.extend(instructions);
                content.push(String::new());
            }
        }

        content.extend(
            [
                "## Configure API Keys",
                "",
                "Edit the `.env` file and add your actual API keys:",
                "",
                "```bash",
                "nano .env",
                "```",
                "",
                "## Configure Your MCP Client",
                "",
                "- **Claude Code**: The `.mcp.json` file is already configured",
                "- **Cursor**: Copy `.mcp.json` to `.cursor/mcp.json`",
                "- **Other clients**: Use the server configurations from `.mcp.json`",
                "",
                "## Troubleshooting",
                "",
                "- Ensure all dependencies are installed",
                "- Verify API keys are correctly set",
                "- Check that file paths in `.mcp.json` are absolute",
                "- Review module-specific logs for errors",
                "",
            ]
            .iter()
            .map(|s| s.to_string()),
        );

        let instructions_file = self.project_path.join(INSTRUCTIONS_FILE);
        fs::write(&instructions_file, content.join("\n"))?;
        tracing::info!("Created setup instructions: {}", instructions_file.display());
        Ok(instructions_file)
    }

    /// Union the given patterns into `.gitignore`.
    ///
    /// Existing lines are kept; the file is rewritten sorted and
    /// deduplicated (set semantics, original ordering is not preserved).
    pub fn update_gitignore(&self, patterns: &[&str]) -> InitResult<PathBuf> {
        let gitignore_file = self.project_path.join(".gitignore");

        let mut lines: std::collections::BTreeSet<String> = match fs::read_to_string(&gitignore_file)
        {
            Ok(text) => text
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect(),
            Err(_) => Default::default(),
        };

        for pattern in patterns {
            lines.insert(pattern.to_string());
        }

        let mut text = lines.into_iter().collect::<Vec<_>>().join("\n");
        text.push('\n');
        fs::write(&gitignore_file, text)?;
        tracing::info!("Updated .gitignore: {}", gitignore_file.display());
        Ok(gitignore_file)
    }
}
