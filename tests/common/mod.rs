// tests/common/mod.rs
// In-process stand-ins for the external collaborators.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use news_globe::error::{FetchError, UpstreamError};
use news_globe::extract::fetch::PageFetcher;
use news_globe::model::RawEvent;
use news_globe::upstream::{EventQuery, EventSource, ImageLookup};

/// Serves canned HTML per URL; unknown URLs fail like an exhausted fetch.
#[derive(Default)]
pub struct StubFetcher {
    pages: HashMap<String, String>,
    pub calls: AtomicUsize,
}

impl StubFetcher {
    pub fn with_page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }
}

#[async_trait]
impl PageFetcher for StubFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.pages.get(url).cloned().ok_or_else(|| FetchError {
            url: url.to_string(),
            attempts: 3,
            message: "connection refused".to_string(),
        })
    }
}

#[derive(Default)]
pub struct StubImages {
    pub images: HashMap<String, String>,
}

impl StubImages {
    pub fn with(mut self, place: &str, url: &str) -> Self {
        self.images.insert(place.to_string(), url.to_string());
        self
    }
}

#[async_trait]
impl ImageLookup for StubImages {
    async fn image_for(&self, place: &str) -> Option<String> {
        self.images.get(place).cloned()
    }
}

/// Returns a fixed batch (or an error) and records every query it saw.
pub struct StubSource {
    events: Vec<RawEvent>,
    fail: bool,
    pub queries: Mutex<Vec<EventQuery>>,
}

impl StubSource {
    pub fn returning(events: Vec<RawEvent>) -> Self {
        Self {
            events,
            fail: false,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            events: Vec::new(),
            fail: true,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }
}

#[async_trait]
impl EventSource for StubSource {
    async fn fetch_events(&self, query: &EventQuery) -> Result<Vec<RawEvent>, UpstreamError> {
        self.queries.lock().unwrap().push(query.clone());
        if self.fail {
            return Err(UpstreamError::Credentials(
                "config/credentials.json: No such file or directory".to_string(),
            ));
        }
        Ok(self.events.clone())
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

pub fn raw_event(id: i64, lat: Option<f64>, lon: Option<f64>, url: Option<&str>) -> RawEvent {
    RawEvent {
        id,
        goldstein_scale: -2.0,
        sentiment_score: -1.5,
        event_type: "042".to_string(),
        tone: -1.5,
        lat,
        lon,
        location: Some(format!("Place {id}")),
        timestamp: Some(Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap()),
        source_url: url.map(str::to_string),
    }
}

pub fn article_html(title: &str) -> String {
    format!(
        r#"<html><head>
        <meta property="og:title" content="{title}">
        <meta name="author" content="Jo Reporter">
        <meta property="article:published_time" content="2024-01-15T09:30:00Z">
        </head><body><article>
        <p>The regional government announced new flood defences on Monday, saying that work will begin in spring.</p>
        <p>Engineers expect the barriers, which will stretch along the river for several kilometres, to take two years.</p>
        <p>Local businesses welcomed the plan, although some residents questioned the cost and the long timetable.</p>
        </article></body></html>"#
    )
}
