//! CLI command definitions using clap
//!
//! Defines all CLI subcommands and their arguments. Module-specific flags
//! are flattened into `init` from the Args structs each module exports.

use clap::{Parser, Subcommand, ValueEnum};

use crate::module::{CipherArgs, SerenaArgs};

/// MCP project initializer.
///
/// Scaffolds Model Context Protocol server configuration for a project:
/// a shared `.mcp.json`, an `.env` file, and per-module config files.
#[derive(Parser, Debug)]
#[command(name = "mcpinit")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file path (overrides default XDG paths)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize MCP configuration for a project
    Init(InitArgs),

    /// List available MCP modules and their options
    Modules(ModulesArgs),
}

/// Arguments for the `init` subcommand
#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Project name (also the directory created, unless --in-place)
    #[arg(required_unless_present = "in_place")]
    pub project_name: Option<String>,

    /// Project language (defaults from config, then typescript)
    pub language: Option<String>,

    /// Comma-separated list of modules to enable
    #[arg(long = "mcp", value_name = "MODULES")]
    pub mcp: Option<String>,

    /// Configure the current directory instead of creating a new one
    #[arg(short = 'n', long = "in-place")]
    pub in_place: bool,

    #[command(flatten)]
    pub serena: SerenaArgs,

    #[command(flatten)]
    pub cipher: CipherArgs,
}

impl InitArgs {
    /// Module names from --mcp, comma-split with whitespace trimmed.
    ///
    /// `None` when the flag was omitted, so config defaults apply.
    pub fn module_names(&self) -> Option<Vec<String>> {
        self.mcp.as_ref().map(|list| {
            list.split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect()
        })
    }
}

/// Arguments for the `modules` subcommand
#[derive(Parser, Debug)]
pub struct ModulesArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Output format options
#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table format
    Table,
    /// JSON output
    Json,
    /// Plain text (one module per line)
    Plain,
}
