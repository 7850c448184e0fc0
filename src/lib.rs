// Company Catalog - Core Library
// Exposes all modules for use in CLI, API server, and tests

pub mod company;
pub mod config;
pub mod db;
pub mod error;
pub mod report;
pub mod service;
pub mod source;
pub mod validation;

#[cfg(feature = "server")]
pub mod api;

// Re-export commonly used types
pub use company::{canonical_name, Company, NameMatch};
pub use config::Config;
pub use db::{setup_database, verify_count, CompanyStore, SqliteCompanyStore};
pub use error::{ErrorKind, Result, ServiceError};
pub use report::{BatchReport, RowFailure};
pub use service::CompanyService;
pub use source::{read_csv, CsvRecordSource, RecordSource, SourceKey, CSV_DELIMITER};
pub use validation::{valid_name, valid_website, valid_zip, validate_company};

#[cfg(feature = "server")]
pub use api::{create_router, AppState};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Install the fmt subscriber, honouring RUST_LOG (default: info)
pub fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    // try_init: a second call (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
