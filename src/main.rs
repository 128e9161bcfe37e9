//! hello-eks entry point.
//!
//! Initializes tracing, resolves configuration (config file, then `PORT`,
//! then `--port`), builds the router and serves until SIGTERM/SIGINT.

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use hello_eks::config::{
    AppConfig, LogFormat, DEFAULT_LOG_FILTER, LISTENER_LOG_DIRECTIVE, PORT_ENV_VAR,
};
use hello_eks::{create_router, start_server};

/// hello-eks: greeting and health-check HTTP service
#[derive(Parser, Debug)]
#[command(name = "hello-eks", version, about)]
struct Args {
    /// Optional TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on (overrides PORT and the config file)
    #[arg(short, long)]
    port: Option<u16>,

    /// Log level filter (e.g., "hello_eks=debug")
    #[arg(short, long)]
    log_level: Option<String>,
}

/// Install the global subscriber.
///
/// Warnings and errors go to stderr, everything else to stdout. Listener
/// lifecycle lines stay enabled even under a quiet filter such as `warn`.
fn init_tracing(filter: &str, format: LogFormat) -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::new(filter).add_directive(LISTENER_LOG_DIRECTIVE.parse()?);
    let writer = std::io::stderr
        .with_max_level(tracing::Level::WARN)
        .or_else(std::io::stdout);
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Text => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(std::io::stdout().is_terminal())
                    .with_writer(writer),
            )
            .init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(writer))
            .init(),
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // The log format lives in the config file, so it is read before tracing
    // is up. Errors here still reach stderr through main's return value.
    let mut config = AppConfig::load_or_default(args.config.as_deref())?;

    // Priority: CLI > env > default
    let log_filter = args
        .log_level
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());
    init_tracing(&log_filter, config.logging.format)?;

    config.apply_port_env(std::env::var(PORT_ENV_VAR).ok().as_deref());
    if let Some(port) = args.port {
        config.http.port = port;
    }

    tracing::debug!(
        host = %config.http.host,
        port = config.http.port,
        shutdown_timeout_secs = config.http.shutdown_timeout_seconds,
        "Loaded configuration"
    );

    let app = create_router();

    if let Err(e) = start_server(app, &config.http).await {
        tracing::error!(error = %e, "Server failed");
        return Err(e.into());
    }

    Ok(())
}
