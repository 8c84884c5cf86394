// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod api;
pub mod cache;
pub mod clock;
pub mod config;
pub mod enrich;
pub mod error;
pub mod extract;
pub mod metrics;
pub mod model;
pub mod service;
pub mod upstream;

use std::sync::Arc;

use axum::Router;

pub use crate::api::router;
pub use crate::extract::{extract_from_html, ArticleExtractor};
pub use crate::model::{EnrichedEvent, ExtractedArticle, RawEvent};

use crate::cache::EnrichmentCache;
use crate::clock::SystemClock;
use crate::config::AppConfig;
use crate::enrich::EventEnricher;
use crate::extract::fetch::HttpFetcher;
use crate::service::EventService;
use crate::upstream::bigquery::BigQueryEventSource;
use crate::upstream::wikipedia::WikipediaImageLookup;

/// Wire the production collaborators from config.
pub fn build_service(cfg: &AppConfig) -> EventService {
    let clock = Arc::new(SystemClock);
    let fetcher = HttpFetcher::with_user_agent(&cfg.user_agent)
        .with_timeout(cfg.fetch_timeout())
        .with_attempts(cfg.fetch_attempts)
        .with_retry_delay(cfg.fetch_retry_delay());
    let images = WikipediaImageLookup::new()
        .with_endpoint(cfg.wikipedia_endpoint.clone())
        .with_thumb_size(cfg.thumbnail_size);
    let source = BigQueryEventSource::new(cfg.credentials_path())
        .with_project(cfg.bigquery_project.clone())
        .with_location(cfg.bigquery_location.clone())
        .with_limit(cfg.result_limit);

    EventService::new(
        Arc::new(source),
        EventEnricher::new(ArticleExtractor::new(Arc::new(fetcher)), Arc::new(images)),
        EnrichmentCache::new(cfg.cache_ttl(), clock.clone()),
        clock,
    )
}

/// Full application router, `/metrics` included when enabled.
pub fn app(cfg: &AppConfig) -> anyhow::Result<Router> {
    let state = api::AppState {
        service: Arc::new(build_service(cfg)),
    };
    let mut router = api::router(state);
    if cfg.metrics_enabled {
        let m = crate::metrics::Metrics::init(cfg.cache_ttl_secs)?;
        router = router.merge(m.router());
    }
    Ok(router)
}
