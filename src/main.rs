use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use company_catalog::{
    init_logging, CompanyService, Config, CsvRecordSource, NameMatch, SourceKey, SqliteCompanyStore,
};

#[derive(Parser, Debug)]
#[command(name = "company-catalog", version, about = "Company catalog import and reconciliation")]
struct Cli {
    /// TOML configuration file
    #[arg(long, env = "CATALOG_CONFIG", default_value = "catalog.toml")]
    config: PathBuf,

    /// SQLite database (overrides config)
    #[arg(long, env = "CATALOG_DB")]
    database: Option<PathBuf>,

    /// Name matching for duplicate detection: exact | contains (overrides config)
    #[arg(long, env = "CATALOG_NAME_MATCH")]
    name_match: Option<NameMatch>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Seed an empty store from the catalog CSV
    Import {
        /// Catalog file (defaults to catalog_path from config)
        catalog: Option<PathBuf>,
    },
    /// Merge a client-update CSV onto existing companies
    Merge { feed: PathBuf },
    /// Print every stored company as JSON
    List,
    /// Look up one company by name (and zip)
    Find {
        name: String,
        #[arg(long)]
        zip: Option<String>,
    },
    /// Delete a company by exact name
    Delete { name: String },
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let mut config = Config::load(&cli.config)?;
    if let Some(database) = cli.database {
        config.database_path = database;
    }
    if let Some(name_match) = cli.name_match {
        config.name_match = name_match;
    }

    let store = Arc::new(SqliteCompanyStore::open(&config.database_path)?);
    let service = CompanyService::new(store, Arc::new(CsvRecordSource::new()))
        .with_name_match(config.name_match);

    match cli.command {
        Commands::Import { catalog } => {
            let catalog = catalog.unwrap_or(config.catalog_path);
            let report = service.bootstrap(&SourceKey::path(catalog))?;
            println!("{}", report.summary());
        }
        Commands::Merge { feed } => {
            let report = service.merge_from_feed(&SourceKey::path(feed))?;
            println!("{}", report.summary());
            for failure in &report.failures {
                println!("  row {} ({}): {}", failure.row, failure.name, failure.reason);
            }
        }
        Commands::List => {
            let companies = service.get_companies()?;
            println!("{}", serde_json::to_string_pretty(&companies)?);
        }
        Commands::Find { name, zip } => {
            let company = match zip {
                Some(zip) => service.find_by_name_and_zip(&name, &zip)?,
                None => service.find_by_name(&name)?,
            };
            match company {
                Some(company) => println!("{}", serde_json::to_string_pretty(&company)?),
                None => return Err(anyhow!("No company named '{}'", name)),
            }
        }
        Commands::Delete { name } => {
            let company = service
                .find_by_name(&name)?
                .ok_or_else(|| anyhow!("No company named '{}'", name))?;
            service.delete_company(&company)?;
            info!("Deleted {} ({})", company.name, company.zip);
        }
    }

    Ok(())
}
