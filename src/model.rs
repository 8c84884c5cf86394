// src/model.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// RFC 3339 with millisecond precision and a `Z` suffix
/// (`2024-01-15T00:00:00.000Z`), the shape the front-end parses.
mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&dt.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        DateTime::<Utc>::deserialize(d)
    }

    pub mod option {
        use super::*;

        pub fn serialize<S: Serializer>(
            dt: &Option<DateTime<Utc>>,
            s: S,
        ) -> Result<S::Ok, S::Error> {
            match dt {
                Some(dt) => super::serialize(dt, s),
                None => s.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            d: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            Option::<DateTime<Utc>>::deserialize(d)
        }
    }
}

/// One row of the upstream event query. Field names on the wire follow the
/// response shape the globe front-end consumes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawEvent {
    pub id: i64,
    /// Goldstein conflict/cooperation score.
    pub goldstein_scale: f64,
    /// Mirrors `tone`; kept for front-end compatibility.
    pub sentiment_score: f64,
    pub event_type: String,
    pub tone: f64,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub location: Option<String>,
    #[serde(default, with = "iso_millis::option")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(rename = "sourceURL")]
    pub source_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExtractedArticle {
    pub title: Option<String>,
    pub author: Option<String>,
    pub publish_date: Option<String>,
    pub description: Option<String>,
    pub text: Option<String>,
    pub top_image: Option<String>,
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExtractedArticle {
    /// All content fields null, only the error set.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedEvent {
    #[serde(flatten)]
    pub event: RawEvent,
    pub article: Option<ExtractedArticle>,
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub article_error: Option<String>,
}

impl EnrichedEvent {
    pub fn bare(event: RawEvent) -> Self {
        Self {
            event,
            article: None,
            image: None,
            article_error: None,
        }
    }
}

/// Anything carrying an optional map position the collision resolver may move.
pub trait Positioned {
    fn position(&self) -> Option<(f64, f64)>;
    fn set_position(&mut self, lat: f64, lon: f64);
}

impl Positioned for RawEvent {
    fn position(&self) -> Option<(f64, f64)> {
        Some((self.lat?, self.lon?))
    }

    fn set_position(&mut self, lat: f64, lon: f64) {
        self.lat = Some(lat);
        self.lon = Some(lon);
    }
}

impl Positioned for EnrichedEvent {
    fn position(&self) -> Option<(f64, f64)> {
        self.event.position()
    }

    fn set_position(&mut self, lat: f64, lon: f64) {
        self.event.set_position(lat, lon);
    }
}

/// Body of a successful `/api/sentiment` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventsResponse {
    pub events: Vec<EnrichedEvent>,
    #[serde(with = "iso_millis")]
    pub last_updated: DateTime<Utc>,
}
