//! API Gateway
//!
//! Sits in front of a dynamic set of microservices and forwards every request
//! to the instance the discovery service names.
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌───────────────────────────────────────────────────┐
//!                         │                    API GATEWAY                    │
//!                         │                                                   │
//!   Client Request        │  ┌─────────┐   ┌──────────┐   ┌───────────────┐   │
//!   ──────────────────────┼─▶│  http   │──▶│ gateway  │──▶│     auth      │───┼──▶ Auth Service
//!                         │  │ server  │   │orchestr. │   │   delegate    │   │
//!                         │  └────┬────┘   └────┬─────┘   └───────────────┘   │
//!                         │       │             │         ┌───────────────┐   │
//!                         │       │             ├────────▶│ rules+security│   │
//!                         │       │             │         └───────────────┘   │
//!                         │       │             │         ┌───────────────┐   │
//!                         │       │             ├────────▶│   discovery   │───┼──▶ Discovery
//!                         │       │             │         └───────────────┘   │
//!   Client Response       │       │             │         ┌───────────────┐   │
//!   ◀─────────────────────┼───────┘             └────────▶│     proxy     │───┼──▶ Backend
//!                         │                               └───────────────┘   │
//!                         │  admin API: /admin/login, /admin/rules, ...       │
//!                         └───────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;

use api_gateway::config::{load_config, load_config_or_default, GatewayConfig};
use api_gateway::observability::init_tracing;
use api_gateway::rules::{MemoryRuleStore, RuleStore};
use api_gateway::{HttpServer, Shutdown};

const DEFAULT_CONFIG: &str = "config.toml";

#[derive(Parser)]
#[command(name = "api-gateway")]
#[command(about = "API gateway with discovery, authentication and rule-based authorization", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the gateway
    Start {
        /// Configuration file; a missing default file means built-in defaults
        #[arg(env = "API_GATEWAY_CONFIG_FILE")]
        config: Option<PathBuf>,
    },
    /// Validate a configuration file and exit
    Check {
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Start { config } => {
            let config = match config {
                Some(path) => load_config(&path)?,
                None => load_config_or_default(&PathBuf::from(DEFAULT_CONFIG))?,
            };
            start(config).await
        }
        Commands::Check { config } => {
            load_config(&config)?;
            println!("{} is valid", config.display());
            Ok(())
        }
    }
}

async fn start(config: GatewayConfig) -> Result<(), Box<dyn std::error::Error>> {
    init_tracing(&config.observability);

    tracing::info!("api-gateway v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address(),
        discovery = %format!("{}:{}", config.discovery.host, config.discovery.port),
        auth_enabled = config.auth.enabled,
        authorization_enabled = config.authorization.enabled,
        "Configuration loaded"
    );

    let store: Arc<dyn RuleStore> = match &config.storage.rules_path {
        Some(path) => Arc::new(MemoryRuleStore::load_from_file(path)?),
        None => Arc::new(MemoryRuleStore::default()),
    };

    let listener = TcpListener::bind(config.listener.bind_address()).await?;
    let server = HttpServer::new(config, store)?;

    let shutdown = Arc::new(Shutdown::new());
    let receiver = shutdown.subscribe();
    let signals = shutdown.clone();
    tokio::spawn(async move { signals.trigger_on_signal().await });

    server.run(listener, receiver).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
