//! Serve command - run the collector
//!
//! Startup order matters: configuration and the filter are validated before
//! any listener opens, so a bad config never leaves a half-started server.

use std::convert::Infallible;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Args;
use tokio::signal;
use tokio::task::JoinError;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use siphon_config::Config;
use siphon_filter::{FilterOptions, MessageFilter};
use siphon_ingest::{TcpIngestor, TcpIngestorConfig, UdpIngestor, UdpIngestorConfig};
use siphon_record::RecordSink;
use siphon_sinks::{ConsoleSink, FanoutSink, FileSink};

/// Serve command arguments
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Path to configuration file (defaults to siphon.toml if present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); overrides the config
    #[arg(short, long)]
    pub log_level: Option<String>,
}

/// Run the serve command
pub async fn run(args: ServeArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;

    init_logging(
        args.log_level
            .as_deref()
            .unwrap_or_else(|| config.log.level.as_str()),
    )?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        port = config.server.port,
        filter_enabled = config.filter.enabled,
        "siphon starting"
    );

    if let Err(e) = run_server(config).await {
        error!(error = %e, "server error");
        return Err(e);
    }

    info!("siphon shutdown complete");
    Ok(())
}

/// Load configuration from an explicit path or the default locations
fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => {
            // User explicitly provided a config path - it must exist
            if !path.exists() {
                bail!("config file not found: {}", path.display());
            }
            Config::from_file(path).context("failed to load configuration")
        }
        None => {
            let default_paths = [Path::new("siphon.toml"), Path::new("configs/siphon.toml")];

            for path in default_paths {
                if path.exists() {
                    return Config::from_file(path).context("failed to load configuration");
                }
            }

            // No config anywhere: defaults (port 514, console output)
            Ok(Config::default())
        }
    }
}

/// Initialize the tracing subscriber for logging
fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(level)
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(|e| anyhow::anyhow!("invalid log level: {}", e))?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(false))
        .with(filter)
        .init();

    Ok(())
}

/// Main server run loop
async fn run_server(config: Config) -> Result<()> {
    // Filter construction is fatal on a malformed allow-list; nothing binds
    // before this succeeds.
    let filter = Arc::new(
        MessageFilter::new(FilterOptions::from(&config.filter))
            .context("invalid filter configuration")?,
    );

    let sink = build_sink(&config).context("failed to initialize outputs")?;

    let tcp = TcpIngestor::new(
        TcpIngestorConfig {
            address: config.server.address.clone(),
            port: config.server.port,
            max_message_size: config.server.max_message_size,
            max_connections: config.server.max_connections,
            ..Default::default()
        },
        Arc::clone(&filter),
        Arc::clone(&sink),
    );
    let udp = UdpIngestor::new(
        UdpIngestorConfig {
            address: config.server.address.clone(),
            port: config.server.port,
            ..Default::default()
        },
        filter,
        sink,
    );

    let mut tcp_task = tokio::spawn(async move { tcp.run().await });
    let mut udp_task = tokio::spawn(async move { udp.run().await });

    // Either transport failing takes the whole process down; the healthy
    // transport is not kept alive. Shutdown is abrupt - no drain phase,
    // open connections die with the process.
    tokio::select! {
        res = &mut tcp_task => Err(ingestor_error("TCP", res)),
        res = &mut udp_task => Err(ingestor_error("UDP", res)),
        _ = shutdown_signal() => {
            info!("shutdown signal received");
            Ok(())
        }
    }
}

/// Build the configured sink stack
fn build_sink(config: &Config) -> Result<Arc<dyn RecordSink>> {
    let mut sinks: Vec<Arc<dyn RecordSink>> = Vec::new();

    if config.server.console_output {
        sinks.push(Arc::new(ConsoleSink::new()));
    }
    if let Some(path) = &config.server.log_file {
        sinks.push(Arc::new(FileSink::open(path)?));
    }

    // Config normalization guarantees at least one output
    Ok(if sinks.len() == 1 {
        sinks.remove(0)
    } else {
        Arc::new(FanoutSink::new(sinks))
    })
}

/// Turn an ingestor task exit into the fatal error it represents
fn ingestor_error<E>(
    transport: &str,
    result: std::result::Result<std::result::Result<Infallible, E>, JoinError>,
) -> anyhow::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    match result {
        Ok(Err(e)) => anyhow::Error::new(e).context(format!("{} ingestor failed", transport)),
        Err(e) => anyhow::Error::new(e).context(format!("{} ingestor task aborted", transport)),
        Ok(Ok(never)) => match never {},
    }
}

/// Wait for SIGINT or SIGTERM
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler");

        tokio::select! {
            _ = signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }

    #[cfg(not(unix))]
    {
        let _ = signal::ctrl_c().await;
    }
}
