// src/pipeline.rs
// Request orchestration: validate -> cache check -> acquire -> score ->
// normalize -> cache write. One instance is built at startup with injected
// services and shared across requests.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use once_cell::sync::OnceCell;
use thiserror::Error;

use crate::cache::ReportCache;
use crate::identifier::CompanyIdentifier;
use crate::normalize::normalize_report;
use crate::report::AnalysisReport;
use crate::scoring::{DynScorer, ScoringError};
use crate::sources::Aggregator;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// Malformed or disallowed identifier. Surfaced to the caller; nothing
    /// downstream runs.
    #[error("invalid company identifier: {0}")]
    InvalidIdentifier(String),

    /// The scoring call failed. Fatal to the request.
    #[error("scoring unavailable: {0}")]
    ScoringUnavailable(#[from] ScoringError),

    /// The acquisition + scoring budget was exhausted.
    #[error("request deadline of {0:?} exceeded")]
    DeadlineExceeded(Duration),
}

/// Whether the report came straight from the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
}

impl CacheStatus {
    pub fn as_header_value(&self) -> &'static str {
        match self {
            CacheStatus::Hit => "HIT",
            CacheStatus::Miss => "MISS",
        }
    }
}

fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("report_cache_hits_total", "Reports served from cache.");
        describe_counter!("report_cache_misses_total", "Requests that ran the full pipeline.");
        describe_counter!("identifier_rejects_total", "Requests rejected by identifier validation.");
        describe_counter!("scoring_failures_total", "Failed scoring calls.");
        describe_counter!("reports_served_total", "Successfully produced reports.");
        describe_histogram!("scoring_latency_ms", "Scoring call latency in milliseconds.");
    });
}

pub struct Pipeline {
    cache: Arc<dyn ReportCache>,
    scorer: DynScorer,
    aggregator: Aggregator,
    request_timeout: Duration,
}

impl Pipeline {
    pub fn new(
        cache: Arc<dyn ReportCache>,
        scorer: DynScorer,
        aggregator: Aggregator,
        request_timeout: Duration,
    ) -> Self {
        ensure_metrics_described();
        Self {
            cache,
            scorer,
            aggregator,
            request_timeout,
        }
    }

    /// Produce a normalized happiness report for a raw identifier.
    ///
    /// A cache hit returns the stored report unchanged without touching any
    /// source adapter or the scorer. On a miss, acquisition and scoring run
    /// under the configured wall-clock budget; an empty corpus is passed
    /// through to estimation-based scoring rather than treated as not-found.
    pub async fn analyze(
        &self,
        raw_identifier: &str,
    ) -> Result<(AnalysisReport, CacheStatus), PipelineError> {
        let company = CompanyIdentifier::parse(raw_identifier).map_err(|reason| {
            counter!("identifier_rejects_total").increment(1);
            PipelineError::InvalidIdentifier(reason)
        })?;

        if let Some(report) = self.cache.get(company.as_str()).await {
            tracing::debug!(company = %company, "cache hit; skipping acquisition and scoring");
            counter!("report_cache_hits_total").increment(1);
            return Ok((report, CacheStatus::Hit));
        }
        counter!("report_cache_misses_total").increment(1);

        let raw = tokio::time::timeout(self.request_timeout, self.acquire_and_score(&company))
            .await
            .map_err(|_| PipelineError::DeadlineExceeded(self.request_timeout))??;

        let report = normalize_report(raw);

        // Best-effort write-back; a down cache never fails the request.
        self.cache.set(company.as_str(), &report).await;

        counter!("reports_served_total").increment(1);
        Ok((report, CacheStatus::Miss))
    }

    async fn acquire_and_score(
        &self,
        company: &CompanyIdentifier,
    ) -> Result<AnalysisReport, PipelineError> {
        let corpus = self.aggregator.gather(company).await;
        if corpus.is_empty() {
            tracing::info!(company = %company, "empty corpus; scoring by estimation");
        }

        // No numeric-ratings source is wired in yet; the scoring contract
        // accepts the map so one can be added without a schema change.
        let ratings: BTreeMap<String, f64> = BTreeMap::new();

        let t0 = std::time::Instant::now();
        let result = self.scorer.score(company, &corpus, &ratings).await;
        histogram!("scoring_latency_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);

        match result {
            Ok(report) => Ok(report),
            Err(e) => {
                tracing::warn!(company = %company, scorer = self.scorer.name(), error = %e, "scoring failed");
                counter!("scoring_failures_total").increment(1);
                Err(PipelineError::ScoringUnavailable(e))
            }
        }
    }
}
