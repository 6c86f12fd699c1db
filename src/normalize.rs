// src/normalize.rs
// Score normalization/validation. Pure, idempotent, no I/O.
//
// The normalizer is the sole authority for the overall score: whatever the
// scoring service put in `overall_score` is discarded and recomputed from
// the clamped per-factor scores.

use crate::report::{
    AnalysisReport, FACTOR_SCORE_MAX, FACTOR_SCORE_MIN, OVERALL_SCORE_MAX, OVERALL_SCORE_MIN,
};

/// Clamp factor scores into [1.0, 10.0], recompute the overall score as
/// `round(mean / 2.0, 2)` (mapping the 1–10 factor scale onto 0–5), and
/// clamp the result into [0.0, 5.0]. An empty breakdown yields 0.0.
pub fn normalize_report(mut report: AnalysisReport) -> AnalysisReport {
    for factor in &mut report.analysis_breakdown {
        factor.sentiment_score = factor
            .sentiment_score
            .clamp(FACTOR_SCORE_MIN, FACTOR_SCORE_MAX);
    }

    report.overall_score = if report.analysis_breakdown.is_empty() {
        0.0
    } else {
        let sum: f64 = report
            .analysis_breakdown
            .iter()
            .map(|f| f.sentiment_score)
            .sum();
        let mean = sum / report.analysis_breakdown.len() as f64;
        round2(mean / 2.0).clamp(OVERALL_SCORE_MIN, OVERALL_SCORE_MAX)
    };

    report
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
