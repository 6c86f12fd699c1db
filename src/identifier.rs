// src/identifier.rs
// Company identifier canonicalization + validation.
//
// Identifiers arrive from an upstream extraction step that is unreliable and
// occasionally hands over garbage tokens scraped off a profile page
// ("12,345", "500 followers"). Validation runs before any cache or network
// work so junk never becomes a cache key.

use once_cell::sync::OnceCell;
use regex::Regex;

/// Substrings that mark an identifier as a mis-extracted profile fragment
/// rather than a company name.
const REJECT_SUBSTRINGS: [&str; 4] = ["followers", "connections", "mutual", "· 3rd"];

/// A validated, canonical company identifier. Used verbatim as the cache key
/// and as the input every source adapter derives its query from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CompanyIdentifier(String);

impl CompanyIdentifier {
    /// Validate and canonicalize a raw identifier. Returns `Err` with a
    /// human-readable reason for rejected input.
    pub fn parse(raw: &str) -> Result<Self, String> {
        let canon = canonicalize(raw);
        if canon.is_empty() {
            return Err("identifier is empty".to_string());
        }
        if !canon.chars().any(|c| c.is_alphabetic()) {
            return Err(format!("identifier '{canon}' contains no letters"));
        }
        for frag in REJECT_SUBSTRINGS {
            if canon.contains(frag) {
                return Err(format!("identifier '{canon}' looks like a page fragment"));
            }
        }
        Ok(Self(canon))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// URL path slug used by scraping adapters ("acme corp" -> "acme-corp").
    pub fn slug(&self) -> String {
        self.0.replace(' ', "-")
    }
}

impl std::fmt::Display for CompanyIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Trim, collapse internal whitespace, lowercase. Idempotent.
pub fn canonicalize(raw: &str) -> String {
    static RE_WS: OnceCell<Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| Regex::new(r"\s+").unwrap());
    re_ws
        .replace_all(raw.trim(), " ")
        .to_lowercase()
        .trim()
        .to_string()
}
