// src/report.rs
// Report schema shared by the scoring client, the normalizer, the cache and
// the HTTP layer. Mirrors the JSON contract expected from the LLM.

use serde::{Deserialize, Serialize};

/// The fixed factor taxonomy, in report order. Every valid report carries
/// exactly these five categories, each exactly once.
pub const CATEGORIES: [&str; 5] = [
    "Growth and Development",
    "Stress and Burnout",
    "Ethics and Culture",
    "Security and Stability",
    "Employee Satisfaction and Retention",
];

/// Valid range for per-factor sentiment scores.
pub const FACTOR_SCORE_MIN: f64 = 1.0;
pub const FACTOR_SCORE_MAX: f64 = 10.0;

/// Valid range for the aggregated overall score.
pub const OVERALL_SCORE_MIN: f64 = 0.0;
pub const OVERALL_SCORE_MAX: f64 = 5.0;

/// Sentiment analysis for a single taxonomy category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorAnalysis {
    pub category_name: String,
    /// 1.0–10.0 after normalization.
    pub sentiment_score: f64,
    pub sentiment_summary: String,
    /// Supporting quotes pulled from the corpus; may be empty.
    #[serde(default)]
    pub key_quotes: Vec<String>,
}

/// The structured happiness report for one company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub company_name: String,
    /// 0.0–5.0; always recomputed by the normalizer, never trusted as-is
    /// from the scoring service.
    pub overall_score: f64,
    pub analysis_breakdown: Vec<FactorAnalysis>,
}

impl AnalysisReport {
    /// Schema check applied to raw scorer output: exactly the five taxonomy
    /// categories, each appearing once, in any order.
    pub fn validate_taxonomy(&self) -> Result<(), String> {
        if self.analysis_breakdown.len() != CATEGORIES.len() {
            return Err(format!(
                "expected {} factors, got {}",
                CATEGORIES.len(),
                self.analysis_breakdown.len()
            ));
        }
        for expected in CATEGORIES {
            let n = self
                .analysis_breakdown
                .iter()
                .filter(|f| f.category_name == expected)
                .count();
            if n != 1 {
                return Err(format!("category '{expected}' appears {n} times"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn factor(name: &str) -> FactorAnalysis {
        FactorAnalysis {
            category_name: name.to_string(),
            sentiment_score: 5.0,
            sentiment_summary: String::new(),
            key_quotes: vec![],
        }
    }

    #[test]
    fn taxonomy_accepts_all_five_once() {
        let report = AnalysisReport {
            company_name: "acme".into(),
            overall_score: 0.0,
            analysis_breakdown: CATEGORIES.iter().map(|c| factor(c)).collect(),
        };
        assert!(report.validate_taxonomy().is_ok());
    }

    #[test]
    fn taxonomy_rejects_duplicates_and_missing() {
        let mut breakdown: Vec<FactorAnalysis> = CATEGORIES.iter().map(|c| factor(c)).collect();
        breakdown[1] = factor(CATEGORIES[0]); // duplicate, one missing
        let report = AnalysisReport {
            company_name: "acme".into(),
            overall_score: 0.0,
            analysis_breakdown: breakdown,
        };
        assert!(report.validate_taxonomy().is_err());
    }

    #[test]
    fn taxonomy_rejects_wrong_count() {
        let report = AnalysisReport {
            company_name: "acme".into(),
            overall_score: 0.0,
            analysis_breakdown: vec![factor(CATEGORIES[0])],
        };
        assert!(report.validate_taxonomy().is_err());
    }

    #[test]
    fn key_quotes_default_to_empty_on_deserialize() {
        let json = r#"{
            "category_name": "Ethics and Culture",
            "sentiment_score": 7.5,
            "sentiment_summary": "mostly positive"
        }"#;
        let f: FactorAnalysis = serde_json::from_str(json).unwrap();
        assert!(f.key_quotes.is_empty());
    }
}
