//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the audit database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Audit runs and their lifecycle
CREATE TABLE IF NOT EXISTS audit_runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    tenant_ref TEXT,
    audit_ref TEXT,
    state TEXT NOT NULL,
    seed_urls TEXT NOT NULL,          -- JSON array
    config TEXT NOT NULL DEFAULT '{}',   -- JSON object
    totals TEXT NOT NULL DEFAULT '{}',   -- JSON object
    started_at TEXT,
    finished_at TEXT,
    error TEXT,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_audit_runs_state ON audit_runs(state);

-- One row per fetched URL per run
CREATE TABLE IF NOT EXISTS pages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    run_id INTEGER NOT NULL REFERENCES audit_runs(id),
    url TEXT NOT NULL,
    status_code INTEGER NOT NULL,
    content_type TEXT NOT NULL,
    content_length INTEGER NOT NULL,
    response_time REAL NOT NULL,
    headers TEXT NOT NULL,            -- JSON object
    title TEXT,
    meta_description TEXT,
    canonical_url TEXT,
    robots_directives TEXT NOT NULL,  -- JSON array
    is_indexable INTEGER NOT NULL,
    word_count INTEGER NOT NULL,
    body_hash TEXT,
    content_ref TEXT,
    facts TEXT NOT NULL,              -- JSON object
    crawled_at TEXT NOT NULL,
    UNIQUE(run_id, url)
);

CREATE INDEX IF NOT EXISTS idx_pages_run ON pages(run_id);

-- Findings emitted by checks
CREATE TABLE IF NOT EXISTS findings (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    run_id INTEGER NOT NULL REFERENCES audit_runs(id),
    page_id INTEGER REFERENCES pages(id),
    category TEXT NOT NULL,
    severity TEXT NOT NULL,
    title TEXT NOT NULL,
    description TEXT NOT NULL,
    recommendation TEXT NOT NULL,
    evidence TEXT NOT NULL,           -- JSON object
    affected_pages_count INTEGER NOT NULL DEFAULT 1,
    impact_score REAL NOT NULL,
    effort TEXT NOT NULL,
    check_key TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_findings_run ON findings(run_id);
CREATE INDEX IF NOT EXISTS idx_findings_page ON findings(page_id);
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
