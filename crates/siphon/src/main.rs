//! siphon - dual-transport syslog collector
//!
//! # Usage
//!
//! ```bash
//! # Run the collector (default)
//! siphon
//! siphon --config configs/siphon.toml
//!
//! # Explicit subcommand form
//! siphon serve --config configs/siphon.toml
//! ```

mod cmd;

use anyhow::Result;
use clap::{Parser, Subcommand};

/// siphon - dual-transport syslog collector
#[derive(Parser, Debug)]
#[command(name = "siphon")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    // Serve args accepted directly when no subcommand is given
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,

    /// Log level (trace, debug, info, warn, error); overrides the config
    #[arg(short, long)]
    log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the collector
    Serve(cmd::serve::ServeArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Command::Serve(args)) => cmd::serve::run(args).await,
        // No subcommand = run the collector (default behavior)
        None => {
            cmd::serve::run(cmd::serve::ServeArgs {
                config: cli.config,
                log_level: cli.log_level,
            })
            .await
        }
    }
}
