//! mcpinit CLI entry point
//!
//! Usage:
//!   mcpinit init <name> [language]  Initialize MCP config in a new directory
//!   mcpinit init --in-place         Configure the current directory
//!   mcpinit modules                 List available MCP modules

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use mcpinit::cli::{Cli, Commands, InitArgs, ModulesArgs, OutputFormat};
use mcpinit::config::{load_config, InitConfig};
use mcpinit::error::InitError;
use mcpinit::installer::Installer;
use mcpinit::module::McpModule;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {:#}", "error".red().bold(), e);
            if let Some(suggestion) = e.downcast_ref::<InitError>().and_then(InitError::suggestion)
            {
                eprintln!("{}: {}", "hint".yellow(), suggestion);
            }
            ExitCode::FAILURE
        }
    }
}

/// Route log events to stderr; RUST_LOG overrides the verbosity flag
fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "mcpinit=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Init(args) => run_init(args, cli.config.as_deref()),
        Commands::Modules(args) => list_modules(args),
    }
}

/// Initialize MCP configuration for a project
fn run_init(args: InitArgs, config_path: Option<&str>) -> Result<()> {
    let config = load_config(config_path)?;

    let project_name = match args.project_name.clone() {
        Some(name) => name,
        // in-place runs take the current directory's name
        None => std::env::current_dir()
            .context("Failed to get current directory")?
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .context("Current directory has no name")?,
    };

    let init_config = InitConfig {
        project_name,
        language: args
            .language
            .clone()
            .unwrap_or_else(|| config.defaults.language.clone()),
        in_place: args.in_place,
        modules: args
            .module_names()
            .unwrap_or_else(|| config.defaults.modules.clone()),
        serena: args.serena.into(),
        cipher: args.cipher.into(),
    };

    let installer = Installer::new();
    let report = installer.install(&init_config)?;

    println!(
        "{} MCP configuration for '{}'",
        "Initialized".green().bold(),
        init_config.project_name
    );
    println!(
        "{}: {}",
        "Location".cyan(),
        report.project_path.display()
    );
    println!("{}: {}", "Modules".cyan(), report.modules.join(", "));
    println!("{}:", "Files".cyan());
    for file in &report.files {
        println!("  - {}", file.display());
    }
    println!();
    println!(
        "Next: review {} for setup steps.",
        report
            .project_path
            .join("MCP_SETUP_INSTRUCTIONS.md")
            .display()
    );

    Ok(())
}

/// List available MCP modules and their options
fn list_modules(args: ModulesArgs) -> Result<()> {
    let installer = Installer::new();
    let registry = installer.registry();

    match args.format {
        OutputFormat::Json => {
            let modules: Vec<_> = registry
                .list()
                .into_iter()
                .map(|meta| {
                    let options = registry
                        .get(&meta.name)
                        .map(|m| m.cli_options())
                        .unwrap_or_default();
                    serde_json::json!({
                        "name": meta.name,
                        "version": meta.version,
                        "description": meta.description,
                        "options": options,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&modules)?);
        }
        OutputFormat::Plain => {
            for meta in registry.list() {
                println!("{}", meta.name);
            }
        }
        OutputFormat::Table => {
            print!("{}", installer.describe_modules());
        }
    }

    Ok(())
}
