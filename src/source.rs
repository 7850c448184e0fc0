// 📂 Record Sources - turn a location key into candidate company records
//
// Column layout is positional and fixed:
//   0 = name, 1 = zip, 2 = website
// Row 0 is always a header and is skipped. Short rows leave the missing
// fields empty, extra columns are ignored. Fields are not required to be
// UTF-8: bad bytes become U+FFFD and the row fails validation on its own.

use crate::company::Company;
use anyhow::{Context, Result};
use std::io::Read;
use std::path::PathBuf;

/// Field delimiter of catalog and client-update files
pub const CSV_DELIMITER: u8 = b';';

// ============================================================================
// SOURCE KEY
// ============================================================================

/// Where a batch of records comes from
#[derive(Debug, Clone)]
pub enum SourceKey {
    /// Catalog or feed file on disk
    Path(PathBuf),

    /// Feed uploaded through the HTTP merge endpoint
    Upload { filename: String, bytes: Vec<u8> },
}

impl SourceKey {
    pub fn path(path: impl Into<PathBuf>) -> Self {
        SourceKey::Path(path.into())
    }

    pub fn describe(&self) -> String {
        match self {
            SourceKey::Path(path) => path.display().to_string(),
            SourceKey::Upload { filename, bytes } => format!("upload '{}' ({} bytes)", filename, bytes.len()),
        }
    }
}

// ============================================================================
// RECORD SOURCE
// ============================================================================

pub trait RecordSource: Send + Sync {
    /// Read every candidate record at `key`, in file order
    fn read_companies(&self, key: &SourceKey) -> Result<Vec<Company>>;
}

/// Semicolon-delimited CSV files and uploads
#[derive(Debug, Default, Clone)]
pub struct CsvRecordSource;

impl CsvRecordSource {
    pub fn new() -> Self {
        CsvRecordSource
    }
}

impl RecordSource for CsvRecordSource {
    fn read_companies(&self, key: &SourceKey) -> Result<Vec<Company>> {
        match key {
            SourceKey::Path(path) => {
                let file = std::fs::File::open(path)
                    .with_context(|| format!("Failed to open CSV file {}", path.display()))?;
                read_csv(file).with_context(|| format!("Failed to parse CSV file {}", path.display()))
            }
            SourceKey::Upload { filename, bytes } => {
                read_csv(bytes.as_slice()).with_context(|| format!("Failed to parse uploaded CSV '{}'", filename))
            }
        }
    }
}

/// Parse semicolon-delimited rows into raw (not yet canonicalized) companies
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<Company>> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(CSV_DELIMITER)
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut companies = Vec::new();

    for (index, result) in rdr.byte_records().enumerate() {
        // +2: header is line 1, records start at line 2
        let record = result.with_context(|| format!("Failed to read CSV row {}", index + 2))?;
        companies.push(company_from_fields(record.iter()));
    }

    Ok(companies)
}

fn company_from_fields<'a>(fields: impl Iterator<Item = &'a [u8]>) -> Company {
    let mut company = Company::default();

    for (column, field) in fields.enumerate() {
        let value = String::from_utf8_lossy(field).into_owned();
        match column {
            0 => company.name = value,
            1 => company.zip = value,
            2 => company.website = value,
            _ => break,
        }
    }

    company
}

// ============================================================================
// TESTS
// ============================================================================
