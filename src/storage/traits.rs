//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::state::{AuditRun, NewAuditRun};
use crate::storage::{Finding, NewFinding, NewPage, Page};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Page not found: {0}")]
    PageNotFound(i64),

    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("Content not found: {0}")]
    ContentNotFound(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Persistence for audit runs, pages and findings
///
/// Records reference each other by id only. Pages and findings are
/// write-once; runs are updated as a whole.
pub trait Storage {
    // ===== Run Management =====

    /// Creates a run in the DRAFT state and returns its id
    fn create_run(&mut self, run: &NewAuditRun) -> StorageResult<i64>;

    /// Gets a run by id
    fn get_run(&self, run_id: i64) -> StorageResult<AuditRun>;

    /// Writes every mutable field of the run (state, totals, times, error)
    fn update_run(&mut self, run: &AuditRun) -> StorageResult<()>;

    /// Lists all runs, newest first
    fn list_runs(&self) -> StorageResult<Vec<AuditRun>>;

    // ===== Page Management =====

    /// Inserts a page and returns its id
    ///
    /// Fails with a constraint error if the run already has a page for the URL.
    fn insert_page(&mut self, page: &NewPage) -> StorageResult<i64>;

    /// Gets a page by id
    fn get_page(&self, page_id: i64) -> StorageResult<Page>;

    /// Gets all pages of a run in crawl order
    fn get_pages_for_run(&self, run_id: i64) -> StorageResult<Vec<Page>>;

    // ===== Finding Management =====

    /// Inserts a finding and returns the stored record
    fn insert_finding(&mut self, finding: &NewFinding) -> StorageResult<Finding>;

    /// Gets all findings of a run in creation order
    fn get_findings_for_run(&self, run_id: i64) -> StorageResult<Vec<Finding>>;

    /// Removes all findings of a run, returning how many were deleted
    fn delete_findings_for_run(&mut self, run_id: i64) -> StorageResult<u64>;
}
