//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.
//! Structured columns (seed URLs, configs, totals, headers, evidence) are
//! stored as JSON text; timestamps as RFC 3339 strings.

use crate::analyzer::{Category, Effort, Severity};
use crate::state::{AuditRun, NewAuditRun, RunState};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{Finding, NewFinding, NewPage, Page};
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

const RUN_COLUMNS: &str = "id, tenant_ref, audit_ref, state, seed_urls, config, totals, \
     started_at, finished_at, error, created_at";

const PAGE_COLUMNS: &str = "id, run_id, url, status_code, content_type, content_length, \
     response_time, headers, title, meta_description, canonical_url, robots_directives, \
     is_indexable, word_count, body_hash, content_ref, facts, crawled_at";

const FINDING_COLUMNS: &str = "id, run_id, page_id, category, severity, title, description, \
     recommendation, evidence, affected_pages_count, impact_score, effort, check_key, created_at";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens or creates the database file and makes sure the schema exists
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

fn to_json<T: Serialize>(value: &T) -> StorageResult<String> {
    serde_json::to_string(value).map_err(|e| StorageError::Serialization(e.to_string()))
}

fn conversion_error(
    idx: usize,
    err: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

fn json_column<T: DeserializeOwned>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw).map_err(|e| conversion_error(idx, e))
}

fn time_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| conversion_error(idx, e))
}

fn optional_time_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    match row.get::<_, Option<String>>(idx)? {
        Some(raw) => DateTime::parse_from_rfc3339(&raw)
            .map(|t| Some(t.with_timezone(&Utc)))
            .map_err(|e| conversion_error(idx, e)),
        None => Ok(None),
    }
}

fn enum_column<T>(row: &Row<'_>, idx: usize, parse: fn(&str) -> Option<T>) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    parse(&raw).ok_or_else(|| {
        conversion_error(
            idx,
            StorageError::Database(format!("unexpected value '{}'", raw)),
        )
    })
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<AuditRun> {
    Ok(AuditRun {
        id: row.get(0)?,
        tenant_ref: row.get(1)?,
        audit_ref: row.get(2)?,
        state: enum_column(row, 3, RunState::from_db_string)?,
        seed_urls: json_column(row, 4)?,
        config: json_column(row, 5)?,
        totals: json_column(row, 6)?,
        started_at: optional_time_column(row, 7)?,
        finished_at: optional_time_column(row, 8)?,
        error: row.get(9)?,
        created_at: time_column(row, 10)?,
    })
}

fn page_from_row(row: &Row<'_>) -> rusqlite::Result<Page> {
    Ok(Page {
        id: row.get(0)?,
        run_id: row.get(1)?,
        url: row.get(2)?,
        status_code: row.get::<_, i64>(3)? as u16,
        content_type: row.get(4)?,
        content_length: row.get::<_, i64>(5)? as u64,
        response_time: row.get(6)?,
        headers: json_column(row, 7)?,
        title: row.get(8)?,
        meta_description: row.get(9)?,
        canonical_url: row.get(10)?,
        robots_directives: json_column(row, 11)?,
        is_indexable: row.get(12)?,
        word_count: row.get::<_, i64>(13)? as u32,
        body_hash: row.get(14)?,
        content_ref: row.get(15)?,
        facts: json_column(row, 16)?,
        crawled_at: time_column(row, 17)?,
    })
}

fn finding_from_row(row: &Row<'_>) -> rusqlite::Result<Finding> {
    Ok(Finding {
        id: row.get(0)?,
        run_id: row.get(1)?,
        page_id: row.get(2)?,
        category: enum_column(row, 3, Category::from_db_string)?,
        severity: enum_column(row, 4, Severity::from_db_string)?,
        title: row.get(5)?,
        description: row.get(6)?,
        recommendation: row.get(7)?,
        evidence: json_column(row, 8)?,
        affected_pages_count: row.get::<_, i64>(9)? as u32,
        impact_score: row.get(10)?,
        effort: enum_column(row, 11, Effort::from_db_string)?,
        check_key: row.get(12)?,
        created_at: time_column(row, 13)?,
    })
}

impl Storage for SqliteStorage {
    // ===== Run Management =====

    fn create_run(&mut self, run: &NewAuditRun) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO audit_runs (tenant_ref, audit_ref, state, seed_urls, config, totals, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, '{}', ?6)",
            params![
                run.tenant_ref,
                run.audit_ref,
                RunState::Draft.to_db_string(),
                to_json(&run.seed_urls)?,
                to_json(&run.config)?,
                now
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_run(&self, run_id: i64) -> StorageResult<AuditRun> {
        let sql = format!("SELECT {} FROM audit_runs WHERE id = ?1", RUN_COLUMNS);
        self.conn
            .query_row(&sql, params![run_id], run_from_row)
            .optional()?
            .ok_or(StorageError::RunNotFound(run_id))
    }

    fn update_run(&mut self, run: &AuditRun) -> StorageResult<()> {
        let updated = self.conn.execute(
            "UPDATE audit_runs
             SET state = ?1, config = ?2, totals = ?3, started_at = ?4, finished_at = ?5, error = ?6
             WHERE id = ?7",
            params![
                run.state.to_db_string(),
                to_json(&run.config)?,
                to_json(&run.totals)?,
                run.started_at.map(|t| t.to_rfc3339()),
                run.finished_at.map(|t| t.to_rfc3339()),
                run.error,
                run.id
            ],
        )?;

        if updated == 0 {
            return Err(StorageError::RunNotFound(run.id));
        }
        Ok(())
    }

    fn list_runs(&self) -> StorageResult<Vec<AuditRun>> {
        let sql = format!("SELECT {} FROM audit_runs ORDER BY id DESC", RUN_COLUMNS);
        let mut stmt = self.conn.prepare(&sql)?;
        let runs = stmt
            .query_map([], run_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(runs)
    }

    // ===== Page Management =====

    fn insert_page(&mut self, page: &NewPage) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO pages (run_id, url, status_code, content_type, content_length,
                response_time, headers, title, meta_description, canonical_url,
                robots_directives, is_indexable, word_count, body_hash, content_ref, facts, crawled_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
            params![
                page.run_id,
                page.url,
                page.status_code,
                page.content_type,
                page.content_length as i64,
                page.response_time,
                to_json(&page.headers)?,
                page.title,
                page.meta_description,
                page.canonical_url,
                to_json(&page.robots_directives)?,
                page.is_indexable,
                page.word_count,
                page.body_hash,
                page.content_ref,
                to_json(&page.facts)?,
                now
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_page(&self, page_id: i64) -> StorageResult<Page> {
        let sql = format!("SELECT {} FROM pages WHERE id = ?1", PAGE_COLUMNS);
        self.conn
            .query_row(&sql, params![page_id], page_from_row)
            .optional()?
            .ok_or(StorageError::PageNotFound(page_id))
    }

    fn get_pages_for_run(&self, run_id: i64) -> StorageResult<Vec<Page>> {
        let sql = format!("SELECT {} FROM pages WHERE run_id = ?1 ORDER BY id", PAGE_COLUMNS);
        let mut stmt = self.conn.prepare(&sql)?;
        let pages = stmt
            .query_map(params![run_id], page_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(pages)
    }

    // ===== Finding Management =====

    fn insert_finding(&mut self, finding: &NewFinding) -> StorageResult<Finding> {
        let now = Utc::now();
        self.conn.execute(
            "INSERT INTO findings (run_id, page_id, category, severity, title, description,
                recommendation, evidence, affected_pages_count, impact_score, effort, check_key, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                finding.run_id,
                finding.page_id,
                finding.category.to_db_string(),
                finding.severity.to_db_string(),
                finding.title,
                finding.description,
                finding.recommendation,
                to_json(&finding.evidence)?,
                finding.affected_pages_count,
                finding.impact_score,
                finding.effort.to_db_string(),
                finding.check_key,
                now.to_rfc3339()
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        Ok(Finding::from_new(id, finding.clone(), now))
    }

    fn get_findings_for_run(&self, run_id: i64) -> StorageResult<Vec<Finding>> {
        let sql = format!(
            "SELECT {} FROM findings WHERE run_id = ?1 ORDER BY id",
            FINDING_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let findings = stmt
            .query_map(params![run_id], finding_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(findings)
    }

    fn delete_findings_for_run(&mut self, run_id: i64) -> StorageResult<u64> {
        let deleted = self
            .conn
            .execute("DELETE FROM findings WHERE run_id = ?1", params![run_id])?;
        Ok(deleted as u64)
    }
}
