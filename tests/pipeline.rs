// tests/pipeline.rs
//
// Orchestrator state-machine tests with counting stub services:
// - cache hit short-circuits acquisition and scoring
// - miss -> score -> normalize -> write-back -> hit
// - empty corpus proceeds to estimation-based scoring
// - scoring failure is fatal and nothing is cached
// - identifier validation precedes all other work
// - the acquisition+scoring deadline is enforced

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

use happiness_index::cache::{FileCache, ReportCache};
use happiness_index::identifier::CompanyIdentifier;
use happiness_index::normalize::normalize_report;
use happiness_index::pipeline::{CacheStatus, Pipeline, PipelineError};
use happiness_index::report::AnalysisReport;
use happiness_index::scoring::{MockScorer, Scorer, ScoringError};
use happiness_index::sources::{Aggregator, SourceAdapter};

// --- Stub services -------------------------------------------------------

struct CountingAdapter {
    snippets: Vec<String>,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl SourceAdapter for CountingAdapter {
    async fn fetch(&self, _company: &CompanyIdentifier) -> Result<Vec<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.snippets.clone())
    }
    fn name(&self) -> &'static str {
        "Stub"
    }
}

struct CountingScorer {
    inner: MockScorer,
    calls: Arc<AtomicUsize>,
    last_corpus_len: Arc<AtomicUsize>,
}

#[async_trait]
impl Scorer for CountingScorer {
    async fn score(
        &self,
        company: &CompanyIdentifier,
        corpus: &[String],
        ratings: &BTreeMap<String, f64>,
    ) -> Result<AnalysisReport, ScoringError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.last_corpus_len.store(corpus.len(), Ordering::SeqCst);
        self.inner.score(company, corpus, ratings).await
    }
    fn name(&self) -> &'static str {
        "counting"
    }
}

struct FailingScorer {
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl Scorer for FailingScorer {
    async fn score(
        &self,
        _company: &CompanyIdentifier,
        _corpus: &[String],
        _ratings: &BTreeMap<String, f64>,
    ) -> Result<AnalysisReport, ScoringError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(ScoringError::EmptyResponse)
    }
    fn name(&self) -> &'static str {
        "failing"
    }
}

struct SlowScorer;

#[async_trait]
impl Scorer for SlowScorer {
    async fn score(
        &self,
        company: &CompanyIdentifier,
        corpus: &[String],
        ratings: &BTreeMap<String, f64>,
    ) -> Result<AnalysisReport, ScoringError> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        MockScorer::default().score(company, corpus, ratings).await
    }
    fn name(&self) -> &'static str {
        "slow"
    }
}

// --- Harness -------------------------------------------------------------

struct Harness {
    pipeline: Pipeline,
    cache: Arc<FileCache>,
    adapter_calls: Arc<AtomicUsize>,
    scorer_calls: Arc<AtomicUsize>,
    last_corpus_len: Arc<AtomicUsize>,
    _dir: tempfile::TempDir,
}

fn harness(snippets: &[&str]) -> Harness {
    harness_with(snippets, None, Duration::from_secs(30))
}

fn harness_with(
    snippets: &[&str],
    scorer_override: Option<Arc<dyn Scorer>>,
    timeout: Duration,
) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let cache = Arc::new(FileCache::new(dir.path(), 86_400));

    let adapter_calls = Arc::new(AtomicUsize::new(0));
    let adapter = CountingAdapter {
        snippets: snippets.iter().map(|s| s.to_string()).collect(),
        calls: Arc::clone(&adapter_calls),
    };

    let scorer_calls = Arc::new(AtomicUsize::new(0));
    let last_corpus_len = Arc::new(AtomicUsize::new(usize::MAX));
    let scorer: Arc<dyn Scorer> = scorer_override.unwrap_or_else(|| {
        Arc::new(CountingScorer {
            inner: MockScorer::default(),
            calls: Arc::clone(&scorer_calls),
            last_corpus_len: Arc::clone(&last_corpus_len),
        })
    });

    let pipeline = Pipeline::new(
        Arc::clone(&cache) as Arc<dyn ReportCache>,
        scorer,
        Aggregator::new(vec![Arc::new(adapter)], 50),
        timeout,
    );

    Harness {
        pipeline,
        cache,
        adapter_calls,
        scorer_calls,
        last_corpus_len,
        _dir: dir,
    }
}

// --- Tests ---------------------------------------------------------------

#[tokio::test]
async fn miss_then_hit_without_rescoring() {
    let h = harness(&["Great culture", "Too much overtime"]);

    let (report, status) = h.pipeline.analyze("Acme").await.unwrap();
    assert_eq!(status, CacheStatus::Miss);
    // Mock factor scores 8,4,7,6,9 -> mean 6.8 -> overall 3.4
    assert_eq!(report.overall_score, 3.4);
    assert_eq!(h.adapter_calls.load(Ordering::SeqCst), 1);
    assert_eq!(h.scorer_calls.load(Ordering::SeqCst), 1);

    let (cached, status) = h.pipeline.analyze("Acme").await.unwrap();
    assert_eq!(status, CacheStatus::Hit);
    assert_eq!(cached, report);
    // Neither the adapter nor the scorer ran again.
    assert_eq!(h.adapter_calls.load(Ordering::SeqCst), 1);
    assert_eq!(h.scorer_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn prepopulated_cache_short_circuits_everything() {
    let h = harness(&["irrelevant"]);

    let company = CompanyIdentifier::parse("Acme").unwrap();
    let seeded = normalize_report(
        MockScorer::default()
            .score(&company, &[], &BTreeMap::new())
            .await
            .unwrap(),
    );
    h.cache.set(company.as_str(), &seeded).await;

    let (report, status) = h.pipeline.analyze("  ACME ").await.unwrap();
    assert_eq!(status, CacheStatus::Hit);
    assert_eq!(report, seeded);
    assert_eq!(h.adapter_calls.load(Ordering::SeqCst), 0);
    assert_eq!(h.scorer_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn empty_corpus_still_reaches_the_scorer() {
    let h = harness(&[]);

    let (report, status) = h.pipeline.analyze("Acme").await.unwrap();
    assert_eq!(status, CacheStatus::Miss);
    assert_eq!(h.scorer_calls.load(Ordering::SeqCst), 1);
    assert_eq!(h.last_corpus_len.load(Ordering::SeqCst), 0);
    assert!(report.analysis_breakdown[0]
        .sentiment_summary
        .contains("Estimated"));
}

#[tokio::test]
async fn cached_report_is_the_normalized_one() {
    let h = harness(&["fine place"]);
    let (report, _) = h.pipeline.analyze("Acme").await.unwrap();

    let stored = h.cache.get("acme").await.unwrap();
    assert_eq!(stored, report);
    assert!((0.0..=5.0).contains(&stored.overall_score));
    for f in &stored.analysis_breakdown {
        assert!((1.0..=10.0).contains(&f.sentiment_score));
    }
}

#[tokio::test]
async fn scoring_failure_is_fatal_and_not_cached() {
    let calls = Arc::new(AtomicUsize::new(0));
    let failing: Arc<dyn Scorer> = Arc::new(FailingScorer {
        calls: Arc::clone(&calls),
    });
    let h = harness_with(&["something"], Some(failing), Duration::from_secs(30));

    let err = h.pipeline.analyze("Acme").await.unwrap_err();
    assert!(matches!(err, PipelineError::ScoringUnavailable(_)));
    assert!(h.cache.get("acme").await.is_none());

    // No cache entry was written, so a retry scores again.
    let _ = h.pipeline.analyze("Acme").await.unwrap_err();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn invalid_identifiers_do_no_work() {
    let h = harness(&["snippet"]);

    for bad in ["12,345", "500 followers", "   ", "---"] {
        let err = h.pipeline.analyze(bad).await.unwrap_err();
        assert!(
            matches!(err, PipelineError::InvalidIdentifier(_)),
            "expected rejection for {bad:?}"
        );
    }
    assert_eq!(h.adapter_calls.load(Ordering::SeqCst), 0);
    assert_eq!(h.scorer_calls.load(Ordering::SeqCst), 0);

    assert!(h.pipeline.analyze("Acme Corp").await.is_ok());
}

#[tokio::test]
async fn deadline_bounds_acquisition_and_scoring() {
    let h = harness_with(
        &["snippet"],
        Some(Arc::new(SlowScorer)),
        Duration::from_millis(50),
    );

    let err = h.pipeline.analyze("Acme").await.unwrap_err();
    assert!(matches!(err, PipelineError::DeadlineExceeded(_)));
    assert!(h.cache.get("acme").await.is_none());
}
