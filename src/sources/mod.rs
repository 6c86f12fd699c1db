// src/sources/mod.rs
pub mod ambitionbox;
pub mod glassdoor;
pub mod reddit;

use std::sync::Arc;

use futures::future::join_all;
use metrics::{counter, describe_counter, describe_histogram, histogram};
use once_cell::sync::OnceCell;

use crate::identifier::CompanyIdentifier;

/// One external review source. Adapters are mutually independent; an `Err`
/// from one never affects the others — the aggregator absorbs it into an
/// empty contribution.
#[async_trait::async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Fetch raw review snippets for a company. The query each adapter
    /// derives from the identifier must be deterministic.
    async fn fetch(&self, company: &CompanyIdentifier) -> anyhow::Result<Vec<String>>;
    fn name(&self) -> &'static str;
}

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "source_snippets_total",
            "Review snippets fetched, per source."
        );
        describe_counter!(
            "source_fetch_errors_total",
            "Adapter fetch failures absorbed by the aggregator."
        );
        describe_histogram!(
            "source_fetch_ms",
            "Per-source fetch time in milliseconds."
        );
    });
}

/// Normalize a scraped snippet: decode HTML entities, strip tags, fold fancy
/// quotes to ASCII, collapse whitespace, cap length.
pub fn normalize_snippet(s: &str) -> String {
    let mut out = html_escape::decode_html_entities(s).to_string();

    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, "").to_string();

    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").trim().to_string();

    // Length cap: 1500 chars per snippet
    if out.chars().count() > 1500 {
        out = out.chars().take(1500).collect();
    }

    out
}

/// Fans out all adapters concurrently and merges the results into one
/// capped corpus. Never fails.
pub struct Aggregator {
    adapters: Vec<Arc<dyn SourceAdapter>>,
    corpus_cap: usize,
}

impl Aggregator {
    pub fn new(adapters: Vec<Arc<dyn SourceAdapter>>, corpus_cap: usize) -> Self {
        ensure_metrics_described();
        Self {
            adapters,
            corpus_cap,
        }
    }

    /// Invoke every adapter concurrently, wait for all of them, then
    /// concatenate in declared adapter order and truncate to the cap.
    /// Adapter failures degrade to empty contributions; an empty merged
    /// corpus is returned as-is and handled by the caller.
    pub async fn gather(&self, company: &CompanyIdentifier) -> Vec<String> {
        let futures = self.adapters.iter().map(|adapter| {
            let adapter = Arc::clone(adapter);
            let company = company.clone();
            async move {
                let t0 = std::time::Instant::now();
                let snippets = match adapter.fetch(&company).await {
                    Ok(v) => v,
                    Err(e) => {
                        tracing::warn!(
                            source = adapter.name(),
                            company = %company,
                            error = ?e,
                            "source fetch failed; contributing empty"
                        );
                        counter!("source_fetch_errors_total", "source" => adapter.name())
                            .increment(1);
                        Vec::new()
                    }
                };
                let ms = t0.elapsed().as_secs_f64() * 1_000.0;
                histogram!("source_fetch_ms", "source" => adapter.name()).record(ms);
                counter!("source_snippets_total", "source" => adapter.name())
                    .increment(snippets.len() as u64);
                snippets
            }
        });

        let mut corpus: Vec<String> = join_all(futures).await.into_iter().flatten().collect();
        if corpus.len() > self.corpus_cap {
            corpus.truncate(self.corpus_cap);
        }
        corpus
    }

    pub fn adapter_count(&self) -> usize {
        self.adapters.len()
    }
}
