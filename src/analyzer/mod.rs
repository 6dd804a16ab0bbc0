//! Analyzer: runs the check registry over stored pages
//!
//! Each check sees one page at a time. A check that errors is logged and
//! skipped; the remaining checks still run. Emitted findings are persisted
//! immediately.

mod check;
pub mod checks;

pub use check::{Category, Check, CheckError, Effort, FindingDraft, Severity};
pub use checks::default_checks;

use crate::state::load_run;
use crate::storage::{lock, Finding, NewFinding, Page, SharedStorage};
use crate::AuditError;
use serde_json::{json, Map, Value};

/// Runs checks against pages and records their findings
pub struct Analyzer {
    checks: Vec<Box<dyn Check>>,
    storage: SharedStorage,
}

impl Analyzer {
    /// Creates an analyzer with the built-in checks
    pub fn new(storage: SharedStorage) -> Self {
        Self::with_checks(storage, default_checks())
    }

    /// Creates an analyzer with a custom registry, evaluated in order
    pub fn with_checks(storage: SharedStorage, checks: Vec<Box<dyn Check>>) -> Self {
        Self { checks, storage }
    }

    /// Codes of the registered checks, in evaluation order
    pub fn available_checks(&self) -> Vec<&'static str> {
        self.checks.iter().map(|c| c.code()).collect()
    }

    pub fn get_check(&self, code: &str) -> Option<&dyn Check> {
        self.checks
            .iter()
            .find(|c| c.code() == code)
            .map(|c| c.as_ref())
    }

    /// Runs every applicable check on a page and stores the findings
    pub fn analyze(&self, run_id: i64, page: &Page) -> Result<Vec<Finding>, AuditError> {
        let mut drafts = Vec::new();

        for check in &self.checks {
            if !check.is_applicable(page) {
                continue;
            }

            match check.run(page) {
                Ok(Some(draft)) => {
                    tracing::debug!("{} flagged {}", check.code(), page.url);
                    drafts.push(draft);
                }
                Ok(None) => {}
                Err(e) => tracing::warn!("Check {} failed on {}: {}", check.code(), page.url, e),
            }
        }

        let mut storage = lock(&self.storage)?;
        let mut findings = Vec::with_capacity(drafts.len());
        for draft in drafts {
            let finding = storage.insert_finding(&NewFinding {
                run_id,
                page_id: Some(page.id),
                category: draft.category,
                severity: draft.severity,
                title: draft.title,
                description: draft.description,
                recommendation: draft.recommendation,
                evidence: draft.evidence,
                affected_pages_count: 1,
                impact_score: draft.impact_score,
                effort: draft.effort,
                check_key: draft.check_key,
            })?;
            findings.push(finding);
        }

        Ok(findings)
    }

    /// Analyzes every page of a run, replacing its previous findings
    ///
    /// Finding counts are merged into the run's totals under `findings`.
    pub fn analyze_audit_run(&self, run_id: i64) -> Result<Vec<Finding>, AuditError> {
        let pages = {
            let mut storage = lock(&self.storage)?;
            load_run(&*storage, run_id)?;
            let removed = storage.delete_findings_for_run(run_id)?;
            if removed > 0 {
                tracing::info!("Replacing {} earlier findings of run {}", removed, run_id);
            }
            storage.get_pages_for_run(run_id)?
        };

        tracing::info!(
            "Analyzing {} pages of run {} with {} checks",
            pages.len(),
            run_id,
            self.checks.len()
        );

        let mut findings = Vec::new();
        for page in &pages {
            findings.extend(self.analyze(run_id, page)?);
        }

        let mut storage = lock(&self.storage)?;
        let mut run = load_run(&*storage, run_id)?;
        let mut totals = Map::new();
        totals.insert("findings".to_string(), finding_totals(&findings));
        run.merge_totals(totals);
        storage.update_run(&run)?;

        tracing::info!("Run {} produced {} findings", run_id, findings.len());
        Ok(findings)
    }

    /// Runs one check by code against a page without storing anything
    pub fn run_check(&self, code: &str, page: &Page) -> Result<Option<FindingDraft>, AuditError> {
        let check = self
            .get_check(code)
            .ok_or_else(|| AuditError::UnknownCheck(code.to_string()))?;
        if !check.is_applicable(page) {
            return Ok(None);
        }
        Ok(check.run(page)?)
    }
}

fn finding_totals(findings: &[Finding]) -> Value {
    let count = |severity: Severity| findings.iter().filter(|f| f.severity == severity).count();
    json!({
        "total": findings.len(),
        "critical": count(Severity::Critical),
        "high": count(Severity::High),
        "medium": count(Severity::Medium),
        "low": count(Severity::Low),
    })
}
