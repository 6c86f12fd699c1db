// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod api;
pub mod cache;
pub mod config;
pub mod identifier;
pub mod normalize;
pub mod pipeline;
pub mod report;
pub mod scoring;
pub mod sources;

// ---- Re-exports for stable public API ----
pub use crate::api::{build_app, router, AppState};
pub use crate::identifier::CompanyIdentifier;
pub use crate::pipeline::{CacheStatus, Pipeline, PipelineError};
pub use crate::report::{AnalysisReport, FactorAnalysis, CATEGORIES};
