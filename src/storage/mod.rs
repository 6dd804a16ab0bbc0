//! Storage module for persisting audit data
//!
//! This module handles all persistence for the audit engine:
//! - SQLite database initialization and schema management
//! - Audit run, page and finding records
//! - Optional content storage for raw page bodies

mod content;
mod schema;
mod sqlite;
mod traits;

pub use content::{ContentStore, FsContentStore};
pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageError, StorageResult};

pub use crate::state::{AuditRun, NewAuditRun};

use crate::analyzer::{Category, Effort, Severity};
use crate::crawler::StatusClass;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

/// Storage handle shared between the crawler, analyzer and scorer
pub type SharedStorage = Arc<Mutex<dyn Storage + Send>>;

/// Wraps a storage backend for sharing
pub fn shared<S: Storage + Send + 'static>(storage: S) -> SharedStorage {
    Arc::new(Mutex::new(storage))
}

/// Locks shared storage, turning a poisoned lock into a storage error
pub fn lock(storage: &SharedStorage) -> StorageResult<MutexGuard<'_, dyn Storage + Send + 'static>> {
    storage
        .lock()
        .map_err(|_| StorageError::Database("storage lock poisoned".to_string()))
}

/// Opens (or creates) the SQLite database at `path`
pub fn open_storage(path: &Path) -> StorageResult<SqliteStorage> {
    SqliteStorage::new(path)
}

/// HTML signals the checks evaluate, captured once when a page is stored
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageFacts {
    /// Text of every `<h1>`
    pub h1: Vec<String>,
    /// Number of `<img>` elements
    pub image_count: u32,
    /// Images without an `alt` attribute (an empty `alt` counts as present)
    pub images_missing_alt: u32,
    /// Content of the viewport meta tag
    pub viewport: Option<String>,
    /// `@type` values found in JSON-LD blocks
    pub structured_data_types: Vec<String>,
}

/// A page about to be stored
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewPage {
    pub run_id: i64,
    pub url: String,
    pub status_code: u16,
    pub content_type: String,
    pub content_length: u64,
    /// Wall-clock fetch time in seconds
    pub response_time: f64,
    pub headers: BTreeMap<String, String>,
    pub title: Option<String>,
    pub meta_description: Option<String>,
    pub canonical_url: Option<String>,
    pub robots_directives: Vec<String>,
    pub is_indexable: bool,
    pub word_count: u32,
    pub body_hash: Option<String>,
    pub content_ref: Option<String>,
    pub facts: PageFacts,
}

/// A stored page; immutable once written
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page {
    pub id: i64,
    pub run_id: i64,
    pub url: String,
    pub status_code: u16,
    pub content_type: String,
    pub content_length: u64,
    pub response_time: f64,
    pub headers: BTreeMap<String, String>,
    pub title: Option<String>,
    pub meta_description: Option<String>,
    pub canonical_url: Option<String>,
    pub robots_directives: Vec<String>,
    pub is_indexable: bool,
    pub word_count: u32,
    pub body_hash: Option<String>,
    pub content_ref: Option<String>,
    pub facts: PageFacts,
    pub crawled_at: DateTime<Utc>,
}

impl Page {
    /// Builds the stored form of a new page
    pub fn from_new(id: i64, page: NewPage, crawled_at: DateTime<Utc>) -> Self {
        Self {
            id,
            run_id: page.run_id,
            url: page.url,
            status_code: page.status_code,
            content_type: page.content_type,
            content_length: page.content_length,
            response_time: page.response_time,
            headers: page.headers,
            title: page.title,
            meta_description: page.meta_description,
            canonical_url: page.canonical_url,
            robots_directives: page.robots_directives,
            is_indexable: page.is_indexable,
            word_count: page.word_count,
            body_hash: page.body_hash,
            content_ref: page.content_ref,
            facts: page.facts,
            crawled_at,
        }
    }

    pub fn status_class(&self) -> StatusClass {
        StatusClass::of(self.status_code)
    }

    pub fn is_successful(&self) -> bool {
        self.status_class() == StatusClass::Success
    }

    pub fn is_html(&self) -> bool {
        self.content_type.to_lowercase().contains("text/html")
    }

    pub fn has_robots_directive(&self, directive: &str) -> bool {
        self.robots_directives
            .iter()
            .any(|d| d.eq_ignore_ascii_case(directive))
    }
}

/// A finding about to be stored
#[derive(Debug, Clone, PartialEq)]
pub struct NewFinding {
    pub run_id: i64,
    pub page_id: Option<i64>,
    pub category: Category,
    pub severity: Severity,
    pub title: String,
    pub description: String,
    pub recommendation: String,
    pub evidence: Map<String, Value>,
    pub affected_pages_count: u32,
    pub impact_score: f64,
    pub effort: Effort,
    pub check_key: String,
}

/// A stored finding; immutable once written
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Finding {
    pub id: i64,
    pub run_id: i64,
    pub page_id: Option<i64>,
    pub category: Category,
    pub severity: Severity,
    pub title: String,
    pub description: String,
    pub recommendation: String,
    pub evidence: Map<String, Value>,
    pub affected_pages_count: u32,
    pub impact_score: f64,
    pub effort: Effort,
    pub check_key: String,
    pub created_at: DateTime<Utc>,
}

impl Finding {
    /// Builds the stored form of a new finding
    pub fn from_new(id: i64, finding: NewFinding, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            run_id: finding.run_id,
            page_id: finding.page_id,
            category: finding.category,
            severity: finding.severity,
            title: finding.title,
            description: finding.description,
            recommendation: finding.recommendation,
            evidence: finding.evidence,
            affected_pages_count: finding.affected_pages_count,
            impact_score: finding.impact_score,
            effort: finding.effort,
            check_key: finding.check_key,
            created_at,
        }
    }
}
