//! Tourbook CLI - Main Entry Point
//!
//! Turns the browser suite's runner output into text, HTML and JSON reports
//! and mails them.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod output;

use commands::{clean, email, report};

/// Tourbook - Tour Booking browser test reporting
#[derive(Parser)]
#[command(name = "tourbook")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Project root that holds logs/, html-report/ and test-results/
    #[arg(long, default_value = ".", env = "TOURBOOK_ROOT", global = true)]
    root: PathBuf,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: output::OutputFormat,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate reports from the runner's JSON output
    Report(report::ReportArgs),

    /// Mail reports
    #[command(subcommand)]
    Email(email::EmailCommands),

    /// Remove artifacts left by the previous run
    Clean,

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Report(args) => report::execute(args, &cli.root, cli.format).await?,
        Commands::Email(cmd) => email::execute(cmd, &cli.root, cli.format).await?,
        Commands::Clean => clean::execute(&cli.root).await?,
        Commands::Version => {
            println!("Tourbook CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("Reporting and notification toolkit for the Tour Booking browser suite");
        }
    }

    Ok(())
}
