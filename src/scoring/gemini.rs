// src/scoring/gemini.rs
// Gemini generateContent client. Builds the prompt, makes one HTTP call,
// strips markdown fencing from the reply, and schema-validates the JSON.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::ScoringConfig;
use crate::identifier::CompanyIdentifier;
use crate::report::AnalysisReport;
use crate::scoring::prompt::build_scoring_prompt;
use crate::scoring::{Scorer, ScoringError};

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1/models";

pub struct GeminiScorer {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

// --- Wire format ---

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

impl GeminiScorer {
    pub fn from_config(config: &ScoringConfig) -> anyhow::Result<Self> {
        let api_key = config.resolve_api_key()?;
        let http = reqwest::Client::builder()
            .user_agent("happiness-index/0.1")
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            api_key,
            model: config.model.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{API_BASE}/{}:generateContent", self.model)
    }
}

/// Strip markdown code fences and any prose surrounding the JSON object.
/// Models occasionally wrap the payload despite the raw-JSON instruction.
pub fn strip_to_json(raw: &str) -> &str {
    let trimmed = raw.trim();
    let start = trimmed.find('{');
    let end = trimmed.rfind('}');
    match (start, end) {
        (Some(s), Some(e)) if s < e => &trimmed[s..=e],
        _ => trimmed,
    }
}

fn parse_report(raw: &str) -> Result<AnalysisReport, ScoringError> {
    let json = strip_to_json(raw);
    let report: AnalysisReport =
        serde_json::from_str(json).map_err(|e| ScoringError::Schema(e.to_string()))?;
    report.validate_taxonomy().map_err(ScoringError::Schema)?;
    Ok(report)
}

#[async_trait::async_trait]
impl Scorer for GeminiScorer {
    async fn score(
        &self,
        company: &CompanyIdentifier,
        corpus: &[String],
        numeric_ratings: &BTreeMap<String, f64>,
    ) -> Result<AnalysisReport, ScoringError> {
        let prompt = build_scoring_prompt(company, corpus, numeric_ratings);
        let req = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: &prompt }],
            }],
        };

        let resp = self
            .http
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&req)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), company = %company, "gemini error response");
            return Err(ScoringError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: GenerateResponse = resp.json().await?;
        let text = body
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.as_str())
            .unwrap_or("");
        if text.is_empty() {
            return Err(ScoringError::EmptyResponse);
        }

        parse_report(text)
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}
