// src/enrich/mod.rs
//! Per-event enrichment: source article + place image, then marker fan-out.

pub mod collision;

use std::sync::Arc;

use futures::future::join_all;
use metrics::counter;

use crate::extract::ArticleExtractor;
use crate::model::{EnrichedEvent, RawEvent};
use crate::upstream::ImageLookup;

#[derive(Clone)]
pub struct EventEnricher {
    extractor: ArticleExtractor,
    images: Arc<dyn ImageLookup>,
}

impl EventEnricher {
    pub fn new(extractor: ArticleExtractor, images: Arc<dyn ImageLookup>) -> Self {
        Self { extractor, images }
    }

    /// Image lookup and article extraction run side by side; neither can fail
    /// the event.
    pub async fn enrich_event(&self, event: RawEvent) -> EnrichedEvent {
        let image = async {
            match event.location.as_deref() {
                Some(place) if !place.trim().is_empty() => self.images.image_for(place).await,
                _ => None,
            }
        };
        let article = async {
            match event.source_url.as_deref() {
                Some(url) if !url.trim().is_empty() => Some(self.extractor.try_extract(url).await),
                _ => None,
            }
        };
        let (image, article) = tokio::join!(image, article);

        let mut enriched = EnrichedEvent::bare(event);
        enriched.image = image;
        match article {
            Some(Ok(a)) => enriched.article = Some(a),
            Some(Err(e)) => {
                tracing::warn!(
                    target: "enrich",
                    event_id = enriched.event.id,
                    error = %e,
                    "article extraction failed; keeping raw event"
                );
                enriched.article_error = Some(e.to_string());
            }
            None => {}
        }
        enriched
    }

    /// Enrich every event concurrently, preserving input order, then spread
    /// overlapping markers once over the whole batch.
    pub async fn enrich_batch(&self, events: Vec<RawEvent>) -> Vec<EnrichedEvent> {
        counter!("enrich_events_total").increment(events.len() as u64);
        let mut enriched = join_all(events.into_iter().map(|e| self.enrich_event(e))).await;
        collision::resolve_collisions(&mut enriched);
        enriched
    }
}
