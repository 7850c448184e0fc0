// 📋 Batch Report - per-row outcome of bootstrap and merge
//
// Bulk operations never guess how much failure is acceptable. They count
// what happened and let the caller decide.

use crate::error::{ErrorKind, ServiceError};
use chrono::{DateTime, Utc};
use serde::Serialize;

// ============================================================================
// ROW FAILURE
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct RowFailure {
    /// 1-based position among the data rows (header excluded)
    pub row: usize,
    pub name: String,
    pub kind: ErrorKind,
    pub reason: String,
}

// ============================================================================
// BATCH REPORT
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    /// Candidate records looked at
    pub processed: usize,

    /// Records inserted (bootstrap) or updated (merge)
    pub written: usize,

    /// Records dropped on purpose (invalid rows during bootstrap)
    pub skipped: usize,

    /// Records that could not be applied, with the reason
    pub failures: Vec<RowFailure>,

    /// Bootstrap found a populated store and did nothing
    pub already_populated: bool,

    pub completed_at: DateTime<Utc>,
}

impl BatchReport {
    pub fn new() -> Self {
        BatchReport {
            processed: 0,
            written: 0,
            skipped: 0,
            failures: Vec::new(),
            already_populated: false,
            completed_at: Utc::now(),
        }
    }

    /// Report for a bootstrap that found existing data
    pub fn already_populated() -> Self {
        BatchReport {
            already_populated: true,
            ..Self::new()
        }
    }

    pub fn record_written(&mut self) {
        self.processed += 1;
        self.written += 1;
    }

    pub fn record_skipped(&mut self) {
        self.processed += 1;
        self.skipped += 1;
    }

    pub fn record_failure(&mut self, row: usize, name: &str, error: &ServiceError) {
        self.processed += 1;
        self.failures.push(RowFailure {
            row,
            name: name.to_string(),
            kind: error.kind(),
            reason: error.detailed(),
        });
    }

    pub fn finish(mut self) -> Self {
        self.completed_at = Utc::now();
        self
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// Every processed row was written
    pub fn is_clean(&self) -> bool {
        self.skipped == 0 && self.failures.is_empty()
    }

    pub fn failures_of(&self, kind: ErrorKind) -> usize {
        self.failures.iter().filter(|f| f.kind == kind).count()
    }

    pub fn summary(&self) -> String {
        if self.already_populated {
            return "store already populated, nothing imported".to_string();
        }
        format!(
            "{} processed: {} written, {} skipped, {} failed",
            self.processed,
            self.written,
            self.skipped,
            self.failed()
        )
    }
}

impl Default for BatchReport {
    fn default() -> Self {
        Self::new()
    }
}
