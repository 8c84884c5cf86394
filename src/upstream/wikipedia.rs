// src/upstream/wikipedia.rs
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use super::ImageLookup;

pub const DEFAULT_ENDPOINT: &str = "https://en.wikipedia.org/w/api.php";

/// Page-image thumbnails from the MediaWiki API.
#[derive(Clone)]
pub struct WikipediaImageLookup {
    client: Client,
    endpoint: String,
    thumb_size: u32,
}

impl WikipediaImageLookup {
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            thumb_size: 300,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_thumb_size(mut self, px: u32) -> Self {
        self.thumb_size = px;
        self
    }

    async fn lookup(&self, place: &str) -> Result<Option<String>, reqwest::Error> {
        let size = self.thumb_size.to_string();
        let body: Value = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("action", "query"),
                ("titles", place),
                ("prop", "pageimages"),
                ("format", "json"),
                ("pithumbsize", size.as_str()),
                ("origin", "*"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(thumbnail_from_response(&body))
    }
}

impl Default for WikipediaImageLookup {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageLookup for WikipediaImageLookup {
    async fn image_for(&self, place: &str) -> Option<String> {
        match self.lookup(place).await {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(target: "upstream", place, error = %e, "wikipedia image lookup failed");
                None
            }
        }
    }
}

/// `query.pages.<first page>.thumbnail.source`, if present.
pub fn thumbnail_from_response(body: &Value) -> Option<String> {
    body.get("query")?
        .get("pages")?
        .as_object()?
        .values()
        .next()?
        .get("thumbnail")?
        .get("source")?
        .as_str()
        .map(str::to_string)
}
