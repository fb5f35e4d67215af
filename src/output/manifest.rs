//! Data model for the `.mcp.json` server registry

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// File name of the shared MCP server registry
pub const MCP_JSON_FILE: &str = ".mcp.json";

/// Placeholder token replaced with the project's absolute path when the
/// registry is written. Modules may embed it in their argument lists.
pub const PROJECT_PATH_PLACEHOLDER: &str = "{project_path}";

/// Launch descriptor for a single MCP server
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServerEntry {
    /// Transport type ("stdio")
    #[serde(rename = "type")]
    pub transport: String,
    /// Executable to launch
    pub command: String,
    /// Arguments passed to the executable
    pub args: Vec<String>,
    /// Environment variables set for the server process
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

impl ServerEntry {
    /// Create a stdio server entry with no args or env
    pub fn stdio(command: impl Into<String>) -> Self {
        Self {
            transport: "stdio".to_string(),
            command: command.into(),
            args: vec![],
            env: BTreeMap::new(),
        }
    }

    /// Add an argument
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add an environment variable
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }
}

/// The `.mcp.json` document: module name -> server entry
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct McpServers {
    #[serde(rename = "mcpServers")]
    pub servers: BTreeMap<String, ServerEntry>,
}
