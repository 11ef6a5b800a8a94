//! pantryctl - household inventory service
//!
//! Entry point for the `pantryctl` command-line tool. The only subcommand so
//! far is `serve`, which picks a storage backend (Postgres or in-memory) at
//! start and runs the HTTP API.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};

use pantryctl_core::config::{Backend, FileConfig, ServeConfig, ServeOverrides};
use pantryctl_server::http::{run_server, ServerConfig};
use pantryctl_server::store::{MemStore, PgStore, Store};

mod tracing_setup;

#[derive(Parser, Debug)]
#[command(
    name = "pantryctl",
    version,
    about = "Household inventory tracker: items, barcodes, stock movements, and ferment projects"
)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API server
    Serve(ServeArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum BackendArg {
    Postgres,
    Memory,
}

impl From<BackendArg> for Backend {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Postgres => Backend::Postgres,
            BackendArg::Memory => Backend::Memory,
        }
    }
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// Address to bind to (default: 127.0.0.1:5000)
    #[arg(long, short = 'b')]
    bind: Option<SocketAddr>,

    /// Storage backend; defaults to postgres when DATABASE_URL is set,
    /// memory otherwise
    #[arg(long, value_enum)]
    backend: Option<BackendArg>,

    /// Namespace (Postgres schema) holding the inventory tables
    #[arg(long)]
    schema: Option<String>,

    /// Optional TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    cors_permissive: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    tracing_setup::init(cli.debug)?;

    match cli.command {
        Commands::Serve(args) => serve(args).await,
    }
}

async fn serve(args: ServeArgs) -> Result<()> {
    let file = match &args.config {
        Some(path) => FileConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => FileConfig::default(),
    };

    let overrides = ServeOverrides {
        bind: args.bind,
        backend: args.backend.map(Backend::from),
        schema: args.schema,
        cors_permissive: args.cors_permissive,
    };
    let config = ServeConfig::resolve(overrides, file)?;

    let store: Arc<dyn Store> = match config.backend {
        Backend::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL is required for the postgres backend")?;
            tracing::info!(schema = %config.schema, "using postgres backend");
            Arc::new(
                PgStore::connect(url, config.schema.clone(), config.max_connections)
                    .await
                    .context("connecting to postgres")?,
            )
        }
        Backend::Memory => {
            tracing::info!("using in-memory backend; data will not survive restart");
            Arc::new(MemStore::new())
        }
    };

    run_server(
        store,
        ServerConfig {
            bind_addr: config.bind,
            cors_permissive: config.cors_permissive,
        },
    )
    .await
    .context("server failed")
}
