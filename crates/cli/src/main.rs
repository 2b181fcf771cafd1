//! Navigator CLI — the main entry point.
//!
//! Commands:
//! - `prompt` — Print the system prompt
//! - `build`  — Assemble the user message for one step
//! - `config` — Show the effective configuration

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "navigator",
    about = "Navigator — context builder for an LLM-driven browser agent",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the system prompt
    Prompt,

    /// Assemble the user message for one decision step
    Build(commands::build::BuildArgs),

    /// Show the effective configuration as TOML
    Config,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing; stdout is reserved for the assembled output
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Prompt => commands::prompt::run()?,
        Commands::Build(args) => commands::build::run(args)?,
        Commands::Config => commands::config_cmd::run()?,
    }

    Ok(())
}
