//! CLI module for mcpinit
//!
//! Provides the command-line interface with the following subcommands:
//! - `init` - Initialize MCP configuration for a project
//! - `modules` - List available MCP modules

pub mod commands;

pub use commands::{Cli, Commands, InitArgs, ModulesArgs, OutputFormat};
