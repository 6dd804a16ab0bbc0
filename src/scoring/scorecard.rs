//! Scorecard types and the pure scoring arithmetic

use crate::analyzer::{Category, Effort, Severity};
use crate::config::ScoringConfig;
use crate::storage::{Finding, Page};
use serde::Serialize;
use std::collections::BTreeMap;

const TOP_ISSUES_LIMIT: usize = 10;
const QUICK_WINS_LIMIT: usize = 5;
const QUICK_WIN_MIN_IMPACT: f64 = 5.0;

/// Divisor applied to `severity weight * impact` for each finding
const DEDUCTION_DIVISOR: f64 = 10.0;

/// Scores and summaries for one audit run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scorecard {
    pub run_id: i64,
    pub overall_score: f64,
    pub category_scores: BTreeMap<Category, f64>,
    pub metrics: ScoreMetrics,
    pub severity_counts: SeverityCounts,
    pub top_issues: Vec<TopIssue>,
    pub quick_wins: Vec<QuickWin>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScoreMetrics {
    pub total_pages: u64,
    pub successful_pages: u64,
    pub indexable_pages: u64,
    /// Percentage of pages answering 2xx, one decimal
    pub success_rate: f64,
    /// Percentage of indexable pages, one decimal
    pub indexable_rate: f64,
    /// Seconds, three decimals
    pub avg_response_time: f64,
    pub total_content_length: u64,
    pub total_findings: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeverityCounts {
    pub critical: u64,
    pub high: u64,
    pub medium: u64,
    pub low: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopIssue {
    pub title: String,
    pub severity: Severity,
    pub impact_score: f64,
    pub effort: Effort,
    pub affected_pages_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuickWin {
    pub title: String,
    pub impact_score: f64,
    pub effort: Effort,
    pub recommendation: String,
}

/// Score change of one category from run A to run B
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CategoryDelta {
    pub category: Category,
    pub delta: f64,
}

/// Two scorecards side by side; deltas are B minus A
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunComparison {
    pub run_a: Scorecard,
    pub run_b: Scorecard,
    pub overall_score_delta: f64,
    pub category_deltas: Vec<CategoryDelta>,
    pub findings_count_delta: i64,
}

impl RunComparison {
    pub fn new(run_a: Scorecard, run_b: Scorecard) -> Self {
        let category_deltas = Category::all()
            .into_iter()
            .map(|category| CategoryDelta {
                category,
                delta: score_of(&run_b, category) - score_of(&run_a, category),
            })
            .collect();

        Self {
            overall_score_delta: run_b.overall_score - run_a.overall_score,
            findings_count_delta: run_b.metrics.total_findings as i64
                - run_a.metrics.total_findings as i64,
            category_deltas,
            run_a,
            run_b,
        }
    }
}

fn score_of(card: &Scorecard, category: Category) -> f64 {
    card.category_scores.get(&category).copied().unwrap_or(100.0)
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Score of one category, 0-100
///
/// Each finding of the category deducts `severity weight * impact / 10`,
/// capped at the category weight. No findings means 100.
pub fn category_score(findings: &[Finding], category: Category, weight: f64) -> f64 {
    let mut in_category = findings.iter().filter(|f| f.category == category).peekable();
    if in_category.peek().is_none() || weight <= 0.0 {
        return 100.0;
    }

    let total_deduction = in_category.fold(0.0_f64, |total, finding| {
        let deduction =
            (finding.severity.weight() * finding.impact_score / DEDUCTION_DIVISOR).min(weight);
        (total + deduction).max(0.0)
    });

    round_to((weight - total_deduction).max(0.0) / weight * 100.0, 1)
}

/// Weighted mean of the category scores, 0-100
pub fn overall_score(category_scores: &BTreeMap<Category, f64>, weights: &ScoringConfig) -> f64 {
    let total_weight = weights.total();
    if total_weight <= 0.0 {
        return 0.0;
    }

    let weighted: f64 = Category::all()
        .into_iter()
        .map(|category| {
            let score = category_scores.get(&category).copied().unwrap_or(100.0);
            score / 100.0 * weights.weight(category)
        })
        .sum();

    round_to(weighted / total_weight * 100.0, 1)
}

pub fn metrics(pages: &[Page], findings: &[Finding]) -> ScoreMetrics {
    let total_pages = pages.len() as u64;
    let successful_pages = pages.iter().filter(|p| p.is_successful()).count() as u64;
    let indexable_pages = pages.iter().filter(|p| p.is_indexable).count() as u64;

    let rate = |count: u64| {
        if total_pages == 0 {
            0.0
        } else {
            round_to(count as f64 / total_pages as f64 * 100.0, 1)
        }
    };

    let avg_response_time = if pages.is_empty() {
        0.0
    } else {
        let total: f64 = pages.iter().map(|p| p.response_time).sum();
        round_to(total / pages.len() as f64, 3)
    };

    ScoreMetrics {
        total_pages,
        successful_pages,
        indexable_pages,
        success_rate: rate(successful_pages),
        indexable_rate: rate(indexable_pages),
        avg_response_time,
        total_content_length: pages.iter().map(|p| p.content_length).sum(),
        total_findings: findings.len() as u64,
    }
}

pub fn severity_counts(findings: &[Finding]) -> SeverityCounts {
    findings
        .iter()
        .fold(SeverityCounts::default(), |mut counts, finding| {
            match finding.severity {
                Severity::Critical => counts.critical += 1,
                Severity::High => counts.high += 1,
                Severity::Medium => counts.medium += 1,
                Severity::Low => counts.low += 1,
            }
            counts
        })
}

/// The ten most serious findings: severity first, then impact
pub fn top_issues(findings: &[Finding]) -> Vec<TopIssue> {
    let mut sorted: Vec<&Finding> = findings.iter().collect();
    sorted.sort_by(|a, b| {
        b.severity
            .rank()
            .cmp(&a.severity.rank())
            .then_with(|| b.impact_score.total_cmp(&a.impact_score))
    });

    sorted
        .into_iter()
        .take(TOP_ISSUES_LIMIT)
        .map(|f| TopIssue {
            title: f.title.clone(),
            severity: f.severity,
            impact_score: f.impact_score,
            effort: f.effort,
            affected_pages_count: f.affected_pages_count,
        })
        .collect()
}

/// Up to five small-effort findings with impact of at least 5
pub fn quick_wins(findings: &[Finding]) -> Vec<QuickWin> {
    let mut candidates: Vec<&Finding> = findings
        .iter()
        .filter(|f| f.impact_score >= QUICK_WIN_MIN_IMPACT && f.effort == Effort::Small)
        .collect();
    candidates.sort_by(|a, b| b.impact_score.total_cmp(&a.impact_score));

    candidates
        .into_iter()
        .take(QUICK_WINS_LIMIT)
        .map(|f| QuickWin {
            title: f.title.clone(),
            impact_score: f.impact_score,
            effort: f.effort,
            recommendation: f.recommendation.clone(),
        })
        .collect()
}

/// Builds a scorecard from a run's pages and findings
pub fn build_scorecard(
    run_id: i64,
    pages: &[Page],
    findings: &[Finding],
    weights: &ScoringConfig,
) -> Scorecard {
    let category_scores: BTreeMap<Category, f64> = Category::all()
        .into_iter()
        .map(|category| {
            (
                category,
                category_score(findings, category, weights.weight(category)),
            )
        })
        .collect();

    Scorecard {
        run_id,
        overall_score: overall_score(&category_scores, weights),
        category_scores,
        metrics: metrics(pages, findings),
        severity_counts: severity_counts(findings),
        top_issues: top_issues(findings),
        quick_wins: quick_wins(findings),
    }
}
