// src/sources/glassdoor.rs
// Glassdoor adapter. Scraping is not implemented yet (the site requires a
// logged-in session); the adapter stays in the declared set and contributes
// an empty result so the corpus shape is stable when it lands.

use anyhow::Result;
use async_trait::async_trait;

use crate::identifier::CompanyIdentifier;
use crate::sources::SourceAdapter;

pub struct GlassdoorAdapter;

#[async_trait]
impl SourceAdapter for GlassdoorAdapter {
    async fn fetch(&self, company: &CompanyIdentifier) -> Result<Vec<String>> {
        tracing::debug!(company = %company, "glassdoor source not implemented; skipping");
        Ok(Vec::new())
    }

    fn name(&self) -> &'static str {
        "Glassdoor"
    }
}
