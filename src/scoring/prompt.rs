// src/scoring/prompt.rs
// Scoring prompt construction, kept pure and separate from the transport
// call so it can be tested on its own.

use std::collections::BTreeMap;

use crate::identifier::CompanyIdentifier;
use crate::report::CATEGORIES;

/// Build the natural-language scoring instruction sent to the model.
///
/// When the corpus is empty the model is asked to *estimate* each category
/// from general domain knowledge and to say so in every summary — an empty
/// corpus is a degraded-but-valid input, not an error.
pub fn build_scoring_prompt(
    company: &CompanyIdentifier,
    corpus: &[String],
    numeric_ratings: &BTreeMap<String, f64>,
) -> String {
    let reviews_block = if corpus.is_empty() {
        "--- Raw Employee Reviews ---\n\
         No specific reviews were provided for analysis. Estimate each \
         category from your general knowledge of this company and its \
         industry, and state in every sentiment_summary that the score is \
         an estimate."
            .to_string()
    } else {
        format!(
            "--- Raw Employee Reviews ---\n{}",
            serde_json::to_string(corpus).unwrap_or_else(|_| "[]".to_string())
        )
    };

    let ratings_block = if numeric_ratings.is_empty() {
        String::new()
    } else {
        format!(
            "\n--- Aggregate Numeric Ratings (1-5 scale, advisory) ---\n{}\n",
            serde_json::to_string(numeric_ratings).unwrap_or_else(|_| "{}".to_string())
        )
    };

    let schema_factors = CATEGORIES
        .iter()
        .map(|c| {
            format!(
                r#"    {{
      "category_name": "{c}",
      "sentiment_score": 0.0,
      "sentiment_summary": "...",
      "key_quotes": []
    }}"#
            )
        })
        .collect::<Vec<_>>()
        .join(",\n");

    format!(
        r#"You are an expert HR Analyst. Analyze the company named '{company}'.
{reviews_block}
{ratings_block}
Generate a structured JSON report.

**STRICT RULES:**
1. Your response MUST be ONLY the raw JSON object. Do not wrap it in markdown fences like ```json.
2. The keys in the JSON object MUST EXACTLY match the required field names: `company_name`, `overall_score`, `analysis_breakdown`.
3. Each object inside the `analysis_breakdown` list MUST have these exact keys: `category_name`, `sentiment_score`, `sentiment_summary`, `key_quotes`.
4. `sentiment_score` is on a 1.0 to 10.0 scale.
5. If no reviews are provided, state this in each `sentiment_summary`.

**JSON SCHEMA TO FOLLOW:**
{{
  "company_name": "{company}",
  "overall_score": 0.0,
  "analysis_breakdown": [
{schema_factors}
  ]
}}"#
    )
}
