// src/extract/mod.rs
//! Article metadata extraction from a URL or a raw HTML string.

pub mod clean;
pub mod dates;
pub mod fetch;
pub mod fields;
pub mod jsonld;
pub mod language;
pub mod readability;

use std::sync::Arc;

use metrics::counter;
use scraper::Html;

use crate::error::ExtractError;
use crate::model::ExtractedArticle;
use fetch::{HttpFetcher, PageFetcher};
use fields::PageContext;

/// What the caller handed us.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArticleInput<'a> {
    Url(&'a str),
    Html(&'a str),
}

impl<'a> ArticleInput<'a> {
    /// Inputs starting with `http://` or `https://` (after trimming) are URLs;
    /// everything else is treated as literal HTML.
    pub fn classify(input: &'a str) -> Self {
        let trimmed = input.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            ArticleInput::Url(trimmed)
        } else {
            ArticleInput::Html(input)
        }
    }
}

#[derive(Clone)]
pub struct ArticleExtractor {
    fetcher: Arc<dyn PageFetcher>,
}

impl ArticleExtractor {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self { fetcher }
    }

    pub fn http() -> Self {
        Self::new(Arc::new(HttpFetcher::new()))
    }

    /// Never fails: a fetch failure comes back as an all-null article carrying
    /// the error message.
    pub async fn extract(&self, input: &str) -> ExtractedArticle {
        match self.try_extract(input).await {
            Ok(article) => article,
            Err(e) => {
                tracing::error!(target: "extract", error = %e, "article extraction failed");
                ExtractedArticle::failed(e.to_string())
            }
        }
    }

    /// Like [`extract`](Self::extract) but surfaces the fetch failure.
    pub async fn try_extract(&self, input: &str) -> Result<ExtractedArticle, ExtractError> {
        match ArticleInput::classify(input) {
            ArticleInput::Url(url) => {
                let html = self.fetcher.fetch(url).await?;
                Ok(extract_from_html(&html, Some(url)))
            }
            ArticleInput::Html(html) => Ok(extract_from_html(html, None)),
        }
    }
}

/// Synchronous core: parse once, run every field chain, flag missing
/// crucial fields. `url` is the page's own address when it was fetched.
pub fn extract_from_html(html: &str, url: Option<&str>) -> ExtractedArticle {
    counter!("article_extractions_total").increment(1);

    let doc = Html::parse_document(html);
    let readable = readability::readable_view(html);
    let ctx = PageContext {
        doc: &doc,
        readable: &readable,
        url,
    };

    let text = fields::extract_main_text(&ctx);
    let language = text.as_deref().and_then(language::detect_language);

    let mut article = ExtractedArticle {
        title: fields::extract_title(&ctx),
        author: Some(fields::extract_author(&ctx)),
        publish_date: fields::extract_publish_date(&ctx),
        description: fields::extract_description(&ctx),
        text,
        top_image: fields::extract_top_image(&ctx),
        language,
        error: None,
    };

    let missing: Vec<&str> = [("title", &article.title), ("text", &article.text)]
        .into_iter()
        .filter(|(_, v)| v.as_deref().map_or(true, |s| s.trim().is_empty()))
        .map(|(name, _)| name)
        .collect();
    if !missing.is_empty() {
        let msg = format!("Missing crucial fields: {}", missing.join(", "));
        tracing::warn!(target: "extract", url = url.unwrap_or("<inline html>"), "{msg}");
        counter!("article_missing_fields_total").increment(1);
        article.error = Some(msg);
    }

    article
}
