// src/sources/reddit.rs
// Reddit adapter. Not implemented yet; contributes an empty result.

use anyhow::Result;
use async_trait::async_trait;

use crate::identifier::CompanyIdentifier;
use crate::sources::SourceAdapter;

pub struct RedditAdapter;

#[async_trait]
impl SourceAdapter for RedditAdapter {
    async fn fetch(&self, company: &CompanyIdentifier) -> Result<Vec<String>> {
        tracing::debug!(company = %company, "reddit source not implemented; skipping");
        Ok(Vec::new())
    }

    fn name(&self) -> &'static str {
        "Reddit"
    }
}
