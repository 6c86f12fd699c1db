// src/sources/ambitionbox.rs
// AmbitionBox employee reviews, scraped from the public reviews page.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use once_cell::sync::OnceCell;
use regex::Regex;

use crate::identifier::CompanyIdentifier;
use crate::sources::{normalize_snippet, SourceAdapter};

const BASE_URL: &str = "https://www.ambitionbox.com/reviews";

// Review bodies are rendered as <p class="text-gray-90 ...">...</p> blocks.
const REVIEW_PATTERN: &str = r#"(?is)<p[^>]*class="[^"]*text-gray-90[^"]*"[^>]*>(.*?)</p>"#;

pub struct AmbitionBoxAdapter {
    http: reqwest::Client,
}

impl AmbitionBoxAdapter {
    pub fn new() -> Self {
        let http = reqwest::Client::builder()
            // A browser User-Agent; the site serves a bot page otherwise.
            .user_agent(
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                 (KHTML, like Gecko) Chrome/108.0.0.0 Safari/537.36",
            )
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(20))
            .build()
            .expect("reqwest client");
        Self { http }
    }

    fn review_url(company: &CompanyIdentifier) -> String {
        format!("{BASE_URL}/{}-reviews", company.slug())
    }

    fn extract_reviews(html: &str) -> Vec<String> {
        static RE: OnceCell<Regex> = OnceCell::new();
        let re = RE.get_or_init(|| Regex::new(REVIEW_PATTERN).unwrap());
        re.captures_iter(html)
            .map(|c| normalize_snippet(&c[1]))
            .filter(|s| !s.is_empty())
            .collect()
    }
}

impl Default for AmbitionBoxAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SourceAdapter for AmbitionBoxAdapter {
    async fn fetch(&self, company: &CompanyIdentifier) -> Result<Vec<String>> {
        let url = Self::review_url(company);
        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .context("ambitionbox http get")?;
        if !resp.status().is_success() {
            anyhow::bail!("ambitionbox returned {} for {url}", resp.status());
        }
        let html = resp.text().await.context("ambitionbox body")?;
        let reviews = Self::extract_reviews(&html);
        tracing::debug!(company = %company, count = reviews.len(), "ambitionbox reviews");
        Ok(reviews)
    }

    fn name(&self) -> &'static str {
        "AmbitionBox"
    }
}
