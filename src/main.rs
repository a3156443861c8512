//! Tenant router edge host.
//!
//! ```text
//!     Viewer Request           ┌──────────────────────────────────────────────┐
//!     Host: blog.example.com   │                 EDGE HOST                    │
//!     GET /post/1              │                                              │
//!     ─────────────────────────┼─▶ request id ─▶ tenant router ─▶ forward ────┼──▶ Origin
//!                              │                 "/blog/post/1"               │    (shared bucket)
//!                              │                      │                       │
//!                              │        foreign host  ▼                       │
//!     ◀────────────────────────┼──────────── 421 Misdirected Request          │
//!                              └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use tenant_router::config::{load_config, ConfigWatcher, RouterConfig};
use tenant_router::lifecycle::{signals, Shutdown};
use tenant_router::observability::{logging, metrics};
use tenant_router::routing::{resolve, BaseDomain};
use tenant_router::HttpServer;

#[derive(Parser)]
#[command(name = "tenant-router")]
#[command(about = "Host-based tenant routing for a shared static-site origin", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the edge host
    Serve {
        /// TOML configuration file; watched for changes
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Route a single host and request target, printing the result as JSON
    Resolve {
        #[arg(short, long)]
        base_domain: BaseDomain,

        #[arg(long)]
        host: String,

        #[arg(default_value = "/")]
        uri: String,
    },
    /// Load and validate a configuration file
    CheckConfig { path: PathBuf },
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config } => {
            serve(config).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Resolve {
            base_domain,
            host,
            uri,
        } => match resolve(&host, &uri, &base_domain) {
            Ok(resolution) => {
                println!("{}", serde_json::to_string_pretty(&resolution)?);
                Ok(ExitCode::SUCCESS)
            }
            Err(e) => {
                eprintln!("error: {e}");
                Ok(ExitCode::from(2))
            }
        },
        Commands::CheckConfig { path } => {
            let config = load_config(&path)?;
            println!(
                "ok: base_domain={} origin={}",
                config.routing.base_domain, config.origin.url
            );
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn serve(config_path: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let config = match &config_path {
        Some(path) => load_config(path)?,
        None => RouterConfig::default(),
    };

    logging::init(&config.observability)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        base_domain = %config.routing.base_domain,
        bind_address = %config.listener.bind_address,
        origin = %config.origin.url,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;

    // Keep the watcher handle alive for the lifetime of the server.
    let (_watcher, config_updates) = match &config_path {
        Some(path) => {
            let (watcher, updates) = ConfigWatcher::new(path);
            (Some(watcher.run()?), updates)
        }
        None => {
            let (_, updates) = mpsc::unbounded_channel();
            (None, updates)
        }
    };

    let shutdown = Shutdown::new();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        signals::shutdown_signal().await;
        trigger.trigger();
    });

    let server = HttpServer::new(config)?;
    server.run(listener, config_updates, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
