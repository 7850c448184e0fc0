// ⚖️ Reconciliation Service - decides what happens to every incoming company
//
// Stateless facade over two collaborators:
//   - a RecordSource (catalog file, client-update feed, upload)
//   - a CompanyStore (the system of record)
//
// Lifecycle of a catalog:
//   EMPTY_STORE --bootstrap (catalog has valid rows)--> POPULATED
//   EMPTY_STORE --bootstrap (empty / all invalid)-----> EMPTY_STORE
//   POPULATED   --merge from update feed-------------> POPULATED
//
// Rows of a batch are processed strictly in order, so a later row sees the
// writes of an earlier one.

use crate::company::{canonical_name, Company, NameMatch};
use crate::db::CompanyStore;
use crate::error::{Result, ServiceError};
use crate::report::BatchReport;
use crate::source::{RecordSource, SourceKey};
use crate::validation::validate_company;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Clone)]
pub struct CompanyService {
    store: Arc<dyn CompanyStore>,
    source: Arc<dyn RecordSource>,
    name_match: NameMatch,
}

impl CompanyService {
    pub fn new(store: Arc<dyn CompanyStore>, source: Arc<dyn RecordSource>) -> Self {
        CompanyService {
            store,
            source,
            name_match: NameMatch::default(),
        }
    }

    /// Choose how create and search compare names
    pub fn with_name_match(mut self, name_match: NameMatch) -> Self {
        self.name_match = name_match;
        self
    }

    // ========================================================================
    // BULK OPERATIONS
    // ========================================================================

    /// Seed an empty store from the catalog at `key`.
    ///
    /// No-op when the store already holds at least one company. Invalid rows
    /// are skipped; a read or insert failure aborts the whole run.
    pub fn bootstrap(&self, key: &SourceKey) -> Result<BatchReport> {
        let existing = self.store.list_all().map_err(ServiceError::read)?;
        if !existing.is_empty() {
            info!(
                "Store already holds {} companies, skipping bootstrap from {}",
                existing.len(),
                key.describe()
            );
            return Ok(BatchReport::already_populated().finish());
        }

        let candidates = self.source.read_companies(key).map_err(ServiceError::read)?;
        let mut report = BatchReport::new();

        for (index, mut company) in candidates.into_iter().enumerate() {
            company.canonicalize();
            company.assign_new_id();

            if !should_write(index + 1, &company, validate_company(&company))? {
                report.record_skipped();
                continue;
            }

            self.store.insert(&company).map_err(ServiceError::write)?;
            report.record_written();
        }

        let report = report.finish();
        info!("Bootstrap from {}: {}", key.describe(), report.summary());
        Ok(report)
    }

    /// Apply an update feed onto existing companies, best effort.
    ///
    /// Only a failure to read the feed aborts. Per-row failures (unknown
    /// name, invalid fields, rejected write) land in the report.
    pub fn merge_from_feed(&self, key: &SourceKey) -> Result<BatchReport> {
        let candidates = self.source.read_companies(key).map_err(ServiceError::read)?;
        let mut report = BatchReport::new();

        for (index, mut company) in candidates.into_iter().enumerate() {
            match self.update_company(&mut company) {
                Ok(()) => report.record_written(),
                Err(e) => {
                    warn!("Merge row {} ({}) not applied: {}", index + 1, company.name, e.detailed());
                    report.record_failure(index + 1, &company.name, &e);
                }
            }
        }

        let report = report.finish();
        info!("Merge from {}: {}", key.describe(), report.summary());
        Ok(report)
    }

    // ========================================================================
    // SINGLE RECORD WRITES
    // ========================================================================

    /// Insert a new company. Never overwrites: an existing name + zip is
    /// `AlreadyExists`. On success `company.id` holds the new identity.
    pub fn create_company(&self, company: &mut Company) -> Result<()> {
        company.canonicalize();

        let existing = self
            .store
            .find_by_name_and_zip(&company.name, &company.zip, self.name_match)
            .map_err(ServiceError::read)?;

        if existing.is_some() {
            return Err(ServiceError::AlreadyExists {
                name: company.name.clone(),
                zip: company.zip.clone(),
            });
        }

        validate_company(company)?;

        company.assign_new_id();
        self.store.insert(company).map_err(ServiceError::write)?;

        debug!("Created company {} ({})", company.name, company.zip);
        Ok(())
    }

    /// Update an existing company found by exact name. Never creates.
    /// The stored identity wins over whatever id the caller sent.
    pub fn update_company(&self, company: &mut Company) -> Result<()> {
        company.canonicalize();

        let existing = self
            .store
            .find_by_name(&company.name)
            .map_err(ServiceError::read)?
            .ok_or_else(|| ServiceError::NotFound {
                name: company.name.clone(),
            })?;

        company.id = existing.id;

        validate_company(company)?;

        self.store.update(company).map_err(ServiceError::write)?;

        debug!("Updated company {} ({})", company.name, company.zip);
        Ok(())
    }

    /// Forwarded as is; the store decides what deleting a missing row means.
    pub fn delete_company(&self, company: &Company) -> Result<()> {
        self.store.delete(company).map_err(ServiceError::write)
    }

    // ========================================================================
    // READS
    // ========================================================================

    pub fn get_companies(&self) -> Result<Vec<Company>> {
        self.store.list_all().map_err(ServiceError::read)
    }

    pub fn find_by_name(&self, name: &str) -> Result<Option<Company>> {
        self.store
            .find_by_name(&canonical_name(name))
            .map_err(ServiceError::read)
    }

    pub fn find_by_name_and_zip(&self, name: &str, zip: &str) -> Result<Option<Company>> {
        self.store
            .find_by_name_and_zip(&canonical_name(name), zip, self.name_match)
            .map_err(ServiceError::read)
    }
}

/// Bootstrap row verdict: invalid fields skip the row, any other
/// validation failure (a broken pattern) aborts the run.
fn should_write(row: usize, company: &Company, verdict: Result<()>) -> Result<bool> {
    match verdict {
        Ok(()) => Ok(true),
        Err(ServiceError::ValidationFailed { fields }) => {
            debug!("Skipping row {} ({}): invalid {}", row, company.name, fields.join(", "));
            Ok(false)
        }
        Err(e) => Err(e),
    }
}

// ============================================================================
// TESTS
// ============================================================================
