// src/cache.rs
// Report cache: read-through before acquisition, write-back after
// normalization. The trait is infallible on purpose — a broken cache
// degrades to "always miss, never persist" and must never fail a request.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::report::AnalysisReport;

/// Default entry lifetime: 24 hours.
pub const DEFAULT_TTL_SECS: u64 = 86_400;

#[async_trait::async_trait]
pub trait ReportCache: Send + Sync {
    /// Look up a report by canonical identifier. `None` on miss, expiry, or
    /// any cache-side failure.
    async fn get(&self, key: &str) -> Option<AnalysisReport>;

    /// Persist a normalized report. Best-effort; failures are logged.
    async fn set(&self, key: &str, report: &AnalysisReport);
}

/// Serialized cache entry; `cached_at` drives TTL expiry on read.
#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry {
    cached_at: u64,
    report: AnalysisReport,
}

/// One JSON file per key under a cache directory. Writes go through a tmp
/// file + rename so readers never see a partial entry.
pub struct FileCache {
    dir: PathBuf,
    ttl_secs: u64,
}

impl FileCache {
    pub fn new(dir: impl Into<PathBuf>, ttl_secs: u64) -> Self {
        let dir = dir.into();
        let _ = fs::create_dir_all(&dir); // best-effort
        Self { dir, ttl_secs }
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        // Stable across processes; canonical keys may contain spaces.
        let digest = Sha256::digest(key.as_bytes());
        self.dir.join(format!("{digest:x}.json"))
    }

    fn read_entry(path: &Path) -> Option<CacheEntry> {
        let s = fs::read_to_string(path).ok()?;
        serde_json::from_str(&s).ok()
    }

    fn write_entry(path: &Path, entry: &CacheEntry) -> std::io::Result<()> {
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_string(entry)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        let mut f = fs::File::create(&tmp)?;
        f.write_all(json.as_bytes())?;
        fs::rename(tmp, path)?;
        Ok(())
    }

    fn now_unix() -> u64 {
        chrono::Utc::now().timestamp().max(0) as u64
    }
}

#[async_trait::async_trait]
impl ReportCache for FileCache {
    async fn get(&self, key: &str) -> Option<AnalysisReport> {
        let path = self.entry_path(key);
        let entry = Self::read_entry(&path)?;
        let age = Self::now_unix().saturating_sub(entry.cached_at);
        if age > self.ttl_secs {
            tracing::debug!(key, age_secs = age, "cache entry expired");
            return None;
        }
        Some(entry.report)
    }

    async fn set(&self, key: &str, report: &AnalysisReport) {
        let entry = CacheEntry {
            cached_at: Self::now_unix(),
            report: report.clone(),
        };
        let path = self.entry_path(key);
        if let Err(e) = Self::write_entry(&path, &entry) {
            tracing::warn!(key, error = ?e, "cache write failed; continuing without");
        }
    }
}

/// Always misses, never persists. Used when caching is disabled.
pub struct NoopCache;

#[async_trait::async_trait]
impl ReportCache for NoopCache {
    async fn get(&self, _key: &str) -> Option<AnalysisReport> {
        None
    }

    async fn set(&self, _key: &str, _report: &AnalysisReport) {}
}
