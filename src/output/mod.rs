//! Generated artifact handling
//!
//! Models the `.mcp.json` server registry, provides recursive JSON
//! merging, and writes the consolidated output files.

pub mod manifest;
pub mod merge;
pub mod writer;

pub use manifest::{McpServers, ServerEntry, MCP_JSON_FILE, PROJECT_PATH_PLACEHOLDER};
pub use merge::{deep_merge, merge_json_file};
pub use writer::{OutputWriter, ENV_FILE, INSTRUCTIONS_FILE};
