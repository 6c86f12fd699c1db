// src/config.rs
use std::path::Path;
use std::{env, fs};

use serde::{Deserialize, Serialize};

const ENV_CONFIG_PATH: &str = "SERVICE_CONFIG_PATH";
const DEFAULT_CONFIG_PATH: &str = "config/service.toml";

fn default_provider() -> String {
    "gemini".to_string()
}
fn default_api_key() -> String {
    "ENV".to_string()
}
fn default_model() -> String {
    "gemini-2.0-flash".to_string()
}
fn default_scoring_timeout() -> u64 {
    90
}
fn default_true() -> bool {
    true
}
fn default_cache_dir() -> String {
    "cache/reports".to_string()
}
fn default_ttl_secs() -> u64 {
    crate::cache::DEFAULT_TTL_SECS
}
fn default_corpus_cap() -> usize {
    50
}
fn default_request_timeout() -> u64 {
    60
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// "gemini" | "mock"
    #[serde(default = "default_provider")]
    pub provider: String,
    /// "ENV" means: read from GEMINI_API_KEY.
    #[serde(default = "default_api_key")]
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_scoring_timeout")]
    pub timeout_secs: u64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            api_key: default_api_key(),
            model: default_model(),
            timeout_secs: default_scoring_timeout(),
        }
    }
}

impl ScoringConfig {
    /// Resolve the API key, honoring the "ENV" indirection.
    pub fn resolve_api_key(&self) -> anyhow::Result<String> {
        if self.api_key.trim().eq_ignore_ascii_case("env") {
            return env::var("GEMINI_API_KEY")
                .map_err(|_| anyhow::anyhow!("Missing GEMINI_API_KEY env var"));
        }
        Ok(self.api_key.clone())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_cache_dir")]
    pub dir: String,
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: default_cache_dir(),
            ttl_secs: default_ttl_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Maximum snippets in one corpus.
    #[serde(default = "default_corpus_cap")]
    pub corpus_cap: usize,
    /// Wall-clock budget for acquisition + scoring, per request.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            corpus_cap: default_corpus_cap(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

impl ServiceConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let data = fs::read_to_string(path.as_ref())?;
        let mut cfg: ServiceConfig = toml::from_str(&data)?;
        cfg.sanitize();
        Ok(cfg)
    }

    /// Load from $SERVICE_CONFIG_PATH, then config/service.toml, then
    /// built-in defaults when neither exists.
    pub fn load_default() -> anyhow::Result<Self> {
        if let Ok(p) = env::var(ENV_CONFIG_PATH) {
            return Self::load_from_file(p);
        }
        if Path::new(DEFAULT_CONFIG_PATH).exists() {
            return Self::load_from_file(DEFAULT_CONFIG_PATH);
        }
        Ok(Self::default())
    }

    fn sanitize(&mut self) {
        self.scoring.provider = self.scoring.provider.to_lowercase();
        if self.pipeline.corpus_cap == 0 {
            self.pipeline.corpus_cap = default_corpus_cap();
        }
        if self.pipeline.request_timeout_secs == 0 {
            self.pipeline.request_timeout_secs = default_request_timeout();
        }
        if self.scoring.timeout_secs == 0 {
            self.scoring.timeout_secs = default_scoring_timeout();
        }
    }
}
