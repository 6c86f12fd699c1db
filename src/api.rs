use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::{HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tower_http::cors::CorsLayer;

use crate::cache::{FileCache, NoopCache, ReportCache};
use crate::config::ServiceConfig;
use crate::pipeline::{Pipeline, PipelineError};
use crate::scoring::build_scorer;
use crate::sources::{
    ambitionbox::AmbitionBoxAdapter, glassdoor::GlassdoorAdapter, reddit::RedditAdapter,
    Aggregator, SourceAdapter,
};

static CACHE_HEADER: HeaderName = HeaderName::from_static("x-report-cache");

#[derive(Clone)]
pub struct AppState {
    pipeline: Arc<Pipeline>,
}

impl AppState {
    pub fn new(pipeline: Arc<Pipeline>) -> Self {
        Self { pipeline }
    }
}

/// Wire the full service from configuration: adapters in declared order,
/// scorer, cache, pipeline, router.
pub fn build_app(config: &ServiceConfig) -> anyhow::Result<Router> {
    let adapters: Vec<Arc<dyn SourceAdapter>> = vec![
        Arc::new(AmbitionBoxAdapter::new()),
        Arc::new(GlassdoorAdapter),
        Arc::new(RedditAdapter),
    ];
    let aggregator = Aggregator::new(adapters, config.pipeline.corpus_cap);

    let cache: Arc<dyn ReportCache> = if config.cache.enabled {
        Arc::new(FileCache::new(&config.cache.dir, config.cache.ttl_secs))
    } else {
        Arc::new(NoopCache)
    };

    let scorer = build_scorer(&config.scoring)?;

    let pipeline = Pipeline::new(
        cache,
        scorer,
        aggregator,
        Duration::from_secs(config.pipeline.request_timeout_secs),
    );

    Ok(router(AppState::new(Arc::new(pipeline))))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/score/{company}", get(score))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// Install the Prometheus recorder and seed the static TTL gauge. Call once
/// at process start, before the first request.
pub fn init_metrics(cache_ttl_secs: u64) -> PrometheusHandle {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("prometheus: install recorder");
    metrics::gauge!("report_cache_ttl_secs").set(cache_ttl_secs as f64);
    handle
}

/// Router exposing `/metrics` with the Prometheus exposition format; merged
/// into the main router by the binary.
pub fn metrics_router(handle: PrometheusHandle) -> Router {
    Router::new().route(
        "/metrics",
        get(move || {
            let h = handle.clone();
            async move { h.render() }
        }),
    )
}

#[derive(serde::Serialize)]
struct ErrorBody {
    error: String,
}

struct ApiError(PipelineError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            PipelineError::InvalidIdentifier(_) => StatusCode::UNPROCESSABLE_ENTITY,
            PipelineError::ScoringUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            PipelineError::DeadlineExceeded(_) => StatusCode::GATEWAY_TIMEOUT,
        };
        let body = ErrorBody {
            error: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

async fn score(
    State(state): State<AppState>,
    Path(company): Path<String>,
) -> Result<Response, ApiError> {
    let (report, cache_status) = state.pipeline.analyze(&company).await.map_err(ApiError)?;

    let mut response = Json(report).into_response();
    response.headers_mut().insert(
        CACHE_HEADER.clone(),
        HeaderValue::from_static(cache_status.as_header_value()),
    );
    Ok(response)
}
