// 🗄️ System of Record - SQLite persistence for companies
//
// One relation keyed by identifier. Names are stored in canonical
// (uppercase) form; the store itself does not enforce that, the service does.

use crate::company::{Company, NameMatch};
use anyhow::{anyhow, Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

// ============================================================================
// STORE CONTRACT
// ============================================================================

/// Everything the reconciliation service needs from the system of record.
/// "Absent" is `Ok(None)`, never an error.
pub trait CompanyStore: Send + Sync {
    fn insert(&self, company: &Company) -> Result<()>;
    fn find_by_name(&self, name: &str) -> Result<Option<Company>>;
    fn find_by_name_and_zip(&self, name: &str, zip: &str, mode: NameMatch) -> Result<Option<Company>>;
    fn update(&self, company: &Company) -> Result<()>;
    fn delete(&self, company: &Company) -> Result<()>;
    fn list_all(&self) -> Result<Vec<Company>>;
}

// ============================================================================
// SCHEMA
// ============================================================================

pub fn setup_database(conn: &Connection) -> Result<()> {
    // Enable WAL mode for crash recovery (in-memory databases answer "memory")
    let _mode: String = conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS companies (
            id TEXT PRIMARY KEY NOT NULL,
            name TEXT NOT NULL,
            zip TEXT NOT NULL,
            website TEXT NOT NULL DEFAULT '',
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_companies_name ON companies(name)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_companies_zip ON companies(zip)",
        [],
    )?;

    Ok(())
}

pub fn verify_count(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM companies", [], |row| row.get(0))?;
    Ok(count)
}

fn company_from_row(row: &Row<'_>) -> rusqlite::Result<(String, Company)> {
    let id: String = row.get(0)?;
    Ok((
        id,
        Company {
            id: None,
            name: row.get(1)?,
            zip: row.get(2)?,
            website: row.get(3)?,
        },
    ))
}

fn with_parsed_id((id, mut company): (String, Company)) -> Result<Company> {
    let uuid = Uuid::parse_str(&id).with_context(|| format!("Stored company id is not a UUID: {}", id))?;
    company.id = Some(uuid);
    Ok(company)
}

fn require_id(company: &Company) -> Result<String> {
    company
        .id
        .map(|id| id.to_string())
        .ok_or_else(|| anyhow!("Company '{}' has no identifier", company.name))
}

// ============================================================================
// SQLITE STORE
// ============================================================================

/// SQLite-backed store. A single connection shared behind a mutex.
pub struct SqliteCompanyStore {
    conn: Mutex<Connection>,
}

impl SqliteCompanyStore {
    /// Open (or create) a database file and make sure the schema exists
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database {}", path.display()))?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    pub fn from_connection(conn: Connection) -> Result<Self> {
        setup_database(&conn).context("Failed to set up companies schema")?;
        Ok(SqliteCompanyStore { conn: Mutex::new(conn) })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| anyhow!("Database connection lock poisoned"))
    }

    pub fn count(&self) -> Result<i64> {
        let conn = self.conn()?;
        verify_count(&conn)
    }
}

impl CompanyStore for SqliteCompanyStore {
    fn insert(&self, company: &Company) -> Result<()> {
        let id = require_id(company)?;
        self.conn()?
            .execute(
                "INSERT INTO companies (id, name, zip, website) VALUES (?1, ?2, ?3, ?4)",
                params![id, company.name, company.zip, company.website],
            )
            .with_context(|| format!("Failed to insert company {}", company.name))?;
        Ok(())
    }

    fn find_by_name(&self, name: &str) -> Result<Option<Company>> {
        let found = self
            .conn()?
            .query_row(
                "SELECT id, name, zip, website FROM companies WHERE name = ?1 ORDER BY rowid LIMIT 1",
                params![name],
                company_from_row,
            )
            .optional()
            .context("Failed to query company by name")?;

        found.map(with_parsed_id).transpose()
    }

    fn find_by_name_and_zip(&self, name: &str, zip: &str, mode: NameMatch) -> Result<Option<Company>> {
        // instr() instead of LIKE so '%' and '_' in the probe are literal
        let sql = match mode {
            NameMatch::Exact => {
                "SELECT id, name, zip, website FROM companies
                 WHERE name = ?1 AND zip = ?2 ORDER BY rowid LIMIT 1"
            }
            NameMatch::Contains => {
                "SELECT id, name, zip, website FROM companies
                 WHERE instr(name, ?1) > 0 AND zip = ?2 ORDER BY rowid LIMIT 1"
            }
        };

        let found = self
            .conn()?
            .query_row(sql, params![name, zip], company_from_row)
            .optional()
            .context("Failed to query company by name and zip")?;

        found.map(with_parsed_id).transpose()
    }

    fn update(&self, company: &Company) -> Result<()> {
        let id = require_id(company)?;
        let changed = self
            .conn()?
            .execute(
                "UPDATE companies SET name = ?2, zip = ?3, website = ?4 WHERE id = ?1",
                params![id, company.name, company.zip, company.website],
            )
            .with_context(|| format!("Failed to update company {}", company.name))?;

        if changed == 0 {
            return Err(anyhow!("No stored company with id {}", id));
        }
        Ok(())
    }

    fn delete(&self, company: &Company) -> Result<()> {
        let id = require_id(company)?;
        self.conn()?
            .execute("DELETE FROM companies WHERE id = ?1", params![id])
            .with_context(|| format!("Failed to delete company {}", company.name))?;
        Ok(())
    }

    fn list_all(&self) -> Result<Vec<Company>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT id, name, zip, website FROM companies ORDER BY rowid")?;

        let rows = stmt
            .query_map([], company_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to read companies")?;

        rows.into_iter().map(with_parsed_id).collect()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn stored(name: &str, zip: &str, website: &str) -> Company {
        let mut company = Company::new(name, zip, website);
        company.assign_new_id();
        company
    }

    #[test]
    fn test_insert_and_find_by_name() {
        let store = SqliteCompanyStore::open_in_memory().unwrap();
        let acme = stored("ACME CORP", "10001", "http://acme.com");

        store.insert(&acme).unwrap();

        let found = store.find_by_name("ACME CORP").unwrap();
        assert_eq!(found, Some(acme));
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_absent_is_none_not_error() {
        let store = SqliteCompanyStore::open_in_memory().unwrap();
        assert_eq!(store.find_by_name("NOBODY").unwrap(), None);
        assert_eq!(
            store.find_by_name_and_zip("NOBODY", "10001", NameMatch::Exact).unwrap(),
            None
        );
        assert!(store.list_all().unwrap().is_empty());
    }

    #[test]
    fn test_find_by_name_and_zip_modes() {
        let store = SqliteCompanyStore::open_in_memory().unwrap();
        store.insert(&stored("ACME SUBSIDIARY", "10001", "")).unwrap();

        assert_eq!(
            store.find_by_name_and_zip("ACME", "10001", NameMatch::Exact).unwrap(),
            None
        );

        let contains = store
            .find_by_name_and_zip("ACME", "10001", NameMatch::Contains)
            .unwrap()
            .unwrap();
        assert_eq!(contains.name, "ACME SUBSIDIARY");

        // zip always matches exactly
        assert_eq!(
            store.find_by_name_and_zip("ACME", "10002", NameMatch::Contains).unwrap(),
            None
        );
    }

    #[test]
    fn test_contains_treats_wildcards_literally() {
        let store = SqliteCompanyStore::open_in_memory().unwrap();
        store.insert(&stored("ACME", "10001", "")).unwrap();

        assert_eq!(
            store.find_by_name_and_zip("%", "10001", NameMatch::Contains).unwrap(),
            None
        );
    }

    #[test]
    fn test_update_and_delete() {
        let store = SqliteCompanyStore::open_in_memory().unwrap();
        let mut acme = stored("ACME", "10001", "");
        store.insert(&acme).unwrap();

        acme.website = "http://acme.com".to_string();
        store.update(&acme).unwrap();
        assert_eq!(store.find_by_name("ACME").unwrap().unwrap().website, "http://acme.com");

        store.delete(&acme).unwrap();
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_update_unknown_id_fails() {
        let store = SqliteCompanyStore::open_in_memory().unwrap();
        let ghost = stored("GHOST", "10001", "");
        assert!(store.update(&ghost).is_err());
    }

    #[test]
    fn test_writes_require_an_id() {
        let store = SqliteCompanyStore::open_in_memory().unwrap();
        let err = store.insert(&Company::new("ACME", "10001", "")).unwrap_err();
        assert!(err.to_string().contains("has no identifier"));
    }

    #[test]
    fn test_list_all_keeps_insert_order() {
        let store = SqliteCompanyStore::open_in_memory().unwrap();
        store.insert(&stored("FIRST", "10001", "")).unwrap();
        store.insert(&stored("SECOND", "10002", "")).unwrap();

        let names: Vec<String> = store.list_all().unwrap().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["FIRST", "SECOND"]);
    }

    #[test]
    fn test_open_file_database_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("companies.db");

        {
            let store = SqliteCompanyStore::open(&path).unwrap();
            store.insert(&stored("ACME", "10001", "")).unwrap();
        }

        let reopened = SqliteCompanyStore::open(&path).unwrap();
        assert_eq!(reopened.count().unwrap(), 1);
    }
}
