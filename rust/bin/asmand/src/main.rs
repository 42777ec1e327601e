//! `asmand`: the asset allocation server binary.
//!
//! Usage:
//!   asmand -c <context-name-or-path> [--listen <addr>]
//!
//! The context name resolves to `/etc/asman/<name>.toml`.
//! If a path with `/` or `.` is given, it's used directly.

mod bootstrap;
mod config;
mod routes;

use std::sync::Arc;

use asman_core::Module;
use clap::Parser;
use tracing::info;

use asset::service::AllocationService;
use asset::AssetModule;
use config::ServerConfig;

/// Asset allocation server.
#[derive(Parser, Debug)]
#[command(name = "asmand", about = "Asset allocation server")]
struct Cli {
    /// Context name or path to config file.
    #[arg(short = 'c', long = "config", required = true)]
    config: String,

    /// Listen address (overrides the configured one).
    #[arg(long = "listen")]
    listen: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    // Load server configuration.
    let config_path = ServerConfig::resolve_path(&cli.config);
    info!("Loading configuration from {}", config_path.display());
    let server_config = ServerConfig::load(&config_path)?;

    bootstrap::verify_config(&server_config)?;

    let core_config = server_config.to_service_config(cli.listen.as_deref());
    if let Some(data_dir) = &core_config.data_dir {
        std::fs::create_dir_all(data_dir)?;
    }

    // Initialize storage.
    let sqlite_path = core_config.resolve_sqlite_path();
    let sql: Arc<dyn asman_sql::SQLStore> = Arc::new(
        asman_sql::SqliteStore::open(&sqlite_path)
            .map_err(|e| anyhow::anyhow!("failed to open SQL store: {}", e))?,
    );
    info!("SQL store opened at {}", sqlite_path.display());

    // Schema first, then seed data.
    let service = AllocationService::with_sql(Arc::clone(&sql))?;
    bootstrap::seed_facilities(&sql, &core_config.resolve_seed_dir())?;

    let asset_module = AssetModule::new(service);
    info!("Asset module initialized");

    let module_routes = vec![(asset_module.name(), asset_module.routes())];
    let app = routes::build_router(module_routes);

    // Start server.
    let listener = tokio::net::TcpListener::bind(&core_config.listen).await?;
    info!("asmand listening on {}", core_config.listen);
    axum::serve(listener, app).await?;

    Ok(())
}
