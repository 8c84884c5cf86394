// src/service.rs
//! Request core: cache lookup, upstream fetch, enrichment, cache fill.

use std::sync::Arc;
use std::time::Instant;

use metrics::{counter, histogram};

use crate::cache::EnrichmentCache;
use crate::clock::SharedClock;
use crate::enrich::EventEnricher;
use crate::error::UpstreamError;
use crate::model::EventsResponse;
use crate::upstream::{EventQuery, EventSource};

pub struct EventService {
    source: Arc<dyn EventSource>,
    enricher: EventEnricher,
    cache: EnrichmentCache,
    clock: SharedClock,
}

impl EventService {
    pub fn new(
        source: Arc<dyn EventSource>,
        enricher: EventEnricher,
        cache: EnrichmentCache,
        clock: SharedClock,
    ) -> Self {
        Self {
            source,
            enricher,
            cache,
            clock,
        }
    }

    pub fn cache(&self) -> &EnrichmentCache {
        &self.cache
    }

    /// Serve from cache when fresh; otherwise run the full pipeline. Concurrent
    /// misses for one key each run the pipeline and the last write wins.
    pub async fn events(&self, query: &EventQuery) -> Result<EventsResponse, UpstreamError> {
        let key = query.cache_key();
        if let Some(entry) = self.cache.get_entry(&key) {
            counter!("enrich_cache_hits_total").increment(1);
            tracing::info!(target: "cache", %key, events = entry.data.len(), "returning cached data");
            return Ok(EventsResponse {
                events: entry.data,
                last_updated: timestamp_to_utc(entry.timestamp),
            });
        }
        counter!("enrich_cache_misses_total").increment(1);

        let started = Instant::now();
        let raw = self.source.fetch_events(query).await?;
        let events = self.enricher.enrich_batch(raw).await;
        histogram!("enrich_batch_ms").record(started.elapsed().as_secs_f64() * 1_000.0);
        tracing::info!(
            target: "enrich",
            %key,
            source = self.source.name(),
            events = events.len(),
            "batch enriched"
        );

        self.cache.set(key, events.clone());
        Ok(EventsResponse {
            events,
            last_updated: self.clock.now(),
        })
    }
}

fn timestamp_to_utc(millis: i64) -> chrono::DateTime<chrono::Utc> {
    chrono::DateTime::from_timestamp_millis(millis).unwrap_or_default()
}
