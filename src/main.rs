//! zlb API server
//!
//! ```text
//!   operator / zlb-cli
//!          │  POST /zlb/domains/...
//!          ▼
//!   ┌──────────────────────────────────────────────┐
//!   │  http: request id → trace → timeout → limit  │
//!   │        → metrics → api key                   │
//!   │  api:  list / inspect / create / update /    │
//!   │        remove / cookie filters / healthcheck │
//!   │  domain: keys + explode                      │
//!   └──────────────────────┬───────────────────────┘
//!                          │ KvStore
//!                          ▼
//!             Consul agent (/v1/kv)  or  memory
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use zlb_api::config::{self, ApiConfig, StoreBackend};
use zlb_api::lifecycle::{startup, Shutdown};
use zlb_api::observability::logging;

#[derive(Parser)]
#[command(name = "zlb-api", version, about = "zanecloud zlb api")]
struct Cli {
    /// Log level (options: trace, debug, info, warn, error)
    #[arg(short = 'l', long, env = "LOG_LEVEL", global = true)]
    log_level: Option<String>,

    /// TOML configuration file; flags override its values
    #[arg(short, long, env = "ZLB_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the zlb api
    Start(StartArgs),
}

#[derive(Args)]
struct StartArgs {
    /// Consul agent address
    #[arg(long, env = "CONSUL_ADDR")]
    consul_addr: Option<String>,

    /// Address the API listens on
    #[arg(long, env = "ZLB_ADDR")]
    addr: Option<String>,

    /// Consul ACL token
    #[arg(long, env = "CONSUL_HTTP_TOKEN", hide_env_values = true)]
    consul_token: Option<String>,

    /// Store backend
    #[arg(long, value_enum)]
    store: Option<StoreBackend>,
}

fn build_config(cli: &Cli, args: &StartArgs) -> Result<ApiConfig, config::ConfigError> {
    let mut config = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => ApiConfig::default(),
    };

    if let Some(level) = &cli.log_level {
        config.observability.log_level = level.clone();
    }
    if let Some(addr) = &args.consul_addr {
        config.store.consul_address = addr.clone();
    }
    if let Some(addr) = &args.addr {
        config.listener.bind_address = addr.clone();
    }
    if let Some(token) = &args.consul_token {
        config.store.token = Some(token.clone());
    }
    if let Some(backend) = args.store {
        config.store.backend = backend;
    }

    config::finalize(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Start(args) => {
            let config = build_config(&cli, args)?;
            logging::init(&config.observability)?;

            tracing::info!("zlb-api v{} starting", env!("CARGO_PKG_VERSION"));
            tracing::info!(
                bind_address = %config.listener.bind_address,
                store = ?config.store.backend,
                consul_address = %config.store.consul_address,
                request_timeout_secs = config.timeouts.request_secs,
                "Configuration loaded"
            );

            let shutdown = Shutdown::new();
            shutdown.trigger_on_signal();

            if let Err(e) = startup::run(config, &shutdown).await {
                tracing::error!(error = %e, "zlb-api terminated");
                return Err(e.into());
            }
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
