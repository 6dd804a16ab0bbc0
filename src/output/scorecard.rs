//! Console rendering of scorecards and run comparisons

use crate::analyzer::Check;
use crate::scoring::{RunComparison, Scorecard};
use std::fmt::Write;

pub fn format_scorecard(card: &Scorecard) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== Scorecard: run {} ===\n", card.run_id);
    let _ = writeln!(out, "Overall score: {:.1}", card.overall_score);
    for (category, score) in &card.category_scores {
        let _ = writeln!(out, "  {:<10} {:>5.1}", category, score);
    }
    let _ = writeln!(out);

    let m = &card.metrics;
    let _ = writeln!(out, "Metrics:");
    let _ = writeln!(
        out,
        "  Pages: {} ({} successful, {:.1}%; {} indexable, {:.1}%)",
        m.total_pages, m.successful_pages, m.success_rate, m.indexable_pages, m.indexable_rate
    );
    let _ = writeln!(out, "  Average response time: {:.3}s", m.avg_response_time);
    let _ = writeln!(out, "  Total content length: {} bytes", m.total_content_length);
    let s = &card.severity_counts;
    let _ = writeln!(
        out,
        "  Findings: {} (critical {}, high {}, medium {}, low {})",
        m.total_findings, s.critical, s.high, s.medium, s.low
    );

    if !card.top_issues.is_empty() {
        let _ = writeln!(out, "\nTop Issues:");
        for (i, issue) in card.top_issues.iter().enumerate() {
            let _ = writeln!(
                out,
                "  {:>2}. [{}] {} (impact {:.1}, effort {})",
                i + 1,
                issue.severity,
                issue.title,
                issue.impact_score,
                issue.effort
            );
        }
    }

    if !card.quick_wins.is_empty() {
        let _ = writeln!(out, "\nQuick Wins:");
        for win in &card.quick_wins {
            let _ = writeln!(out, "  - {} (impact {:.1})", win.title, win.impact_score);
            let _ = writeln!(out, "    {}", win.recommendation);
        }
    }
    out
}

pub fn format_comparison(comparison: &RunComparison) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "=== Run {} -> Run {} ===\n",
        comparison.run_a.run_id, comparison.run_b.run_id
    );
    let _ = writeln!(
        out,
        "Overall: {:.1} -> {:.1} ({:+.1})",
        comparison.run_a.overall_score,
        comparison.run_b.overall_score,
        comparison.overall_score_delta
    );
    for delta in &comparison.category_deltas {
        let _ = writeln!(out, "  {:<10} {:+.1}", delta.category, delta.delta);
    }
    let _ = writeln!(out, "Findings: {:+}", comparison.findings_count_delta);
    out
}

/// One line per registered check
pub fn format_checks(checks: &[&dyn Check]) -> String {
    let mut out = String::new();
    for check in checks {
        let _ = writeln!(
            out,
            "{:<28} {:<9} {:<8} effort={:<6} impact={:.0}  {}",
            check.code(),
            check.category(),
            check.severity(),
            check.effort(),
            check.impact_score(),
            check.title()
        );
    }
    out
}

pub fn print_scorecard(card: &Scorecard) {
    print!("{}", format_scorecard(card));
}

pub fn print_comparison(comparison: &RunComparison) {
    print!("{}", format_comparison(comparison));
}
