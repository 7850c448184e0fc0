// Company Catalog - Web Server
// Seeds an empty store from the catalog, then serves the REST API

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use company_catalog::{
    create_router, init_logging, CompanyService, Config, CsvRecordSource, NameMatch, SourceKey,
    SqliteCompanyStore,
};

#[derive(Parser, Debug)]
#[command(name = "catalog-server", version, about = "Company catalog REST server")]
struct Args {
    /// TOML configuration file
    #[arg(long, env = "CATALOG_CONFIG", default_value = "catalog.toml")]
    config: PathBuf,

    /// SQLite database (overrides config)
    #[arg(long, env = "CATALOG_DB")]
    database: Option<PathBuf>,

    /// Catalog used to seed an empty store (overrides config)
    #[arg(long, env = "CATALOG_CSV")]
    catalog: Option<PathBuf>,

    /// Listen address (overrides config)
    #[arg(long, env = "CATALOG_BIND")]
    bind: Option<String>,

    /// exact | contains (overrides config)
    #[arg(long, env = "CATALOG_NAME_MATCH")]
    name_match: Option<NameMatch>,
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    info!("Company Catalog server v{}", company_catalog::VERSION);

    let args = Args::parse();
    let mut config = Config::load(&args.config)?;
    if let Some(database) = args.database {
        config.database_path = database;
    }
    if let Some(catalog) = args.catalog {
        config.catalog_path = catalog;
    }
    if let Some(bind) = args.bind {
        config.bind_address = bind;
    }
    if let Some(name_match) = args.name_match {
        config.name_match = name_match;
    }

    let store = Arc::new(SqliteCompanyStore::open(&config.database_path)?);
    info!("Database opened: {}", config.database_path.display());

    let service = CompanyService::new(store, Arc::new(CsvRecordSource::new()))
        .with_name_match(config.name_match);

    // A missing catalog should not keep the API down
    match service.bootstrap(&SourceKey::path(&config.catalog_path)) {
        Ok(report) => info!("Bootstrap: {}", report.summary()),
        Err(e) => warn!("Bootstrap from {} failed: {}", config.catalog_path.display(), e.detailed()),
    }

    let app = create_router(service);

    let listener = tokio::net::TcpListener::bind(&config.bind_address)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_address))?;

    info!("Server running on http://{}", config.bind_address);
    info!("API: http://{}/v1/companies", config.bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    info!("Shutdown signal received");
}
