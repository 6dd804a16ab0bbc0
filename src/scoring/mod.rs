//! Scoring module: turns a run's findings into a weighted scorecard
//!
//! Category weights come from the `[scoring]` config table (40/35/25 by
//! default). Scorecards are computed fresh on every call and never stored.

mod scorecard;

pub use scorecard::{
    build_scorecard, category_score, metrics, overall_score, quick_wins, severity_counts,
    top_issues, CategoryDelta, QuickWin, RunComparison, ScoreMetrics, Scorecard, SeverityCounts,
    TopIssue,
};

use crate::analyzer::Category;
use crate::config::ScoringConfig;
use crate::state::load_run;
use crate::storage::{lock, Finding, Page, SharedStorage};
use crate::AuditError;

/// Computes scorecards from stored pages and findings
pub struct Scorer {
    storage: SharedStorage,
    weights: ScoringConfig,
}

impl Scorer {
    pub fn new(storage: SharedStorage, weights: ScoringConfig) -> Self {
        Self { storage, weights }
    }

    pub fn weights(&self) -> &ScoringConfig {
        &self.weights
    }

    fn load(&self, run_id: i64) -> Result<(Vec<Page>, Vec<Finding>), AuditError> {
        let storage = lock(&self.storage)?;
        load_run(&*storage, run_id)?;
        Ok((
            storage.get_pages_for_run(run_id)?,
            storage.get_findings_for_run(run_id)?,
        ))
    }

    /// Full scorecard for a run
    pub fn score(&self, run_id: i64) -> Result<Scorecard, AuditError> {
        let (pages, findings) = self.load(run_id)?;
        let card = build_scorecard(run_id, &pages, &findings, &self.weights);
        tracing::info!(
            "Run {} scored {} ({} findings)",
            run_id,
            card.overall_score,
            findings.len()
        );
        Ok(card)
    }

    pub fn score_category(&self, run_id: i64, category: Category) -> Result<f64, AuditError> {
        let (_, findings) = self.load(run_id)?;
        Ok(category_score(
            &findings,
            category,
            self.weights.weight(category),
        ))
    }

    pub fn score_overall(&self, run_id: i64) -> Result<f64, AuditError> {
        Ok(self.score(run_id)?.overall_score)
    }

    /// Scores two runs; deltas read as `b - a`
    pub fn compare_runs(&self, run_a: i64, run_b: i64) -> Result<RunComparison, AuditError> {
        Ok(RunComparison::new(self.score(run_a)?, self.score(run_b)?))
    }
}
