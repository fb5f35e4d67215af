//! mcpinit - MCP project configuration initializer
//!
//! Scaffolds Model Context Protocol server configuration for a project:
//! discovers the requested integration modules, validates their
//! requirements and options, and writes the consolidated output files
//! (`.mcp.json`, `.env`, per-module configs, setup instructions).
//!
//! # Architecture
//!
//! - `cli` - Command-line interface (clap)
//! - `config` - Layered file/env configuration and the resolved run input
//! - `module` - Integration modules (serena, cipher) and their registry
//! - `installer` - The fixed-phase `init` lifecycle
//! - `output` - Consolidated artifact writing and JSON merging
//! - `error` - Error types

pub mod cli;
pub mod config;
pub mod error;
pub mod installer;
pub mod module;
pub mod output;

pub use config::{load_config, Config, InitConfig};
pub use error::{InitError, InitResult};
pub use installer::{InstallReport, Installer};
pub use module::{McpModule, ModuleRegistry};
