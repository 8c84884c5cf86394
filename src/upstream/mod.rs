// src/upstream/mod.rs
//! External collaborators: the event warehouse and the place-image service.

pub mod bigquery;
pub mod wikipedia;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::UpstreamError;
use crate::model::RawEvent;

/// Parameters of one inbound events request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventQuery {
    /// Case-insensitive substring matched against the source URL; empty = no filter.
    pub keyword: String,
    pub date: NaiveDate,
}

impl EventQuery {
    pub fn new(keyword: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            keyword: keyword.into().trim().to_string(),
            date,
        }
    }

    /// `YYYYMMDD`
    pub fn date_compact(&self) -> String {
        self.date.format("%Y%m%d").to_string()
    }

    pub fn date_number(&self) -> i64 {
        self.date_compact().parse().unwrap_or_default()
    }

    pub fn cache_key(&self) -> String {
        crate::cache::batch_key(&self.keyword, &self.date_compact())
    }
}

/// Parse an 8-digit `YYYYMMDD` string into a calendar date.
pub fn parse_compact_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDate::parse_from_str(s, "%Y%m%d").ok()
}

#[async_trait]
pub trait EventSource: Send + Sync {
    async fn fetch_events(&self, query: &EventQuery) -> Result<Vec<RawEvent>, UpstreamError>;
    fn name(&self) -> &'static str;
}

/// Best-effort thumbnail for a place name.
#[async_trait]
pub trait ImageLookup: Send + Sync {
    async fn image_for(&self, place: &str) -> Option<String>;
}

/// Lookup that never finds anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoImages;

#[async_trait]
impl ImageLookup for NoImages {
    async fn image_for(&self, _place: &str) -> Option<String> {
        None
    }
}
