//! MCP integration modules
//!
//! Each module owns one tool integration end to end: requirement checks,
//! CLI options, generated config files, and its `.mcp.json` server entry.

pub mod cipher;
pub mod registry;
pub mod serena;
pub mod traits;

pub use cipher::{CipherArgs, CipherConfig, CipherModule};
pub use registry::ModuleRegistry;
pub use serena::{SerenaArgs, SerenaConfig, SerenaModule};
pub use traits::{CliOptionSpec, McpModule, ModuleMetadata};
