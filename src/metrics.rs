// src/metrics.rs
//! Prometheus exporter for the pipeline's counters and timings.

use axum::{routing::get, Router};
use metrics::{describe_counter, describe_gauge, describe_histogram, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

static HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the Prometheus recorder (once per process) and publish the
    /// cache TTL as a static gauge.
    pub fn init(cache_ttl_secs: u64) -> anyhow::Result<Self> {
        let handle = HANDLE
            .get_or_try_init(|| {
                let handle = PrometheusBuilder::new().install_recorder()?;
                describe_all();
                Ok::<_, anyhow::Error>(handle)
            })?
            .clone();

        gauge!("enrich_cache_ttl_secs").set(cache_ttl_secs as f64);

        Ok(Self { handle })
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}

fn describe_all() {
    describe_counter!("article_fetch_attempts_total", "Article page fetch attempts.");
    describe_counter!(
        "article_fetch_failures_total",
        "Article fetches that exhausted their retries."
    );
    describe_counter!("article_extractions_total", "Documents run through extraction.");
    describe_counter!(
        "article_missing_fields_total",
        "Extractions missing title or text."
    );
    describe_counter!("enrich_cache_hits_total", "Batch cache hits.");
    describe_counter!("enrich_cache_misses_total", "Batch cache misses.");
    describe_counter!("enrich_events_total", "Events sent through enrichment.");
    describe_counter!("upstream_query_errors_total", "Failed upstream event queries.");
    describe_histogram!("enrich_batch_ms", "Upstream fetch + enrichment time in milliseconds.");
    describe_gauge!("enrich_cache_ttl_secs", "Configured batch cache TTL.");
}
