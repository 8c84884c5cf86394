// src/extract/fields.rs
//! Per-field extraction strategies.
//!
//! Each field is an ordered list of named strategies; the first one yielding a
//! non-blank value wins. A strategy error is logged and the chain moves on.

use anyhow::{anyhow, Result};
use scraper::{Html, Selector};
use serde_json::Value;
use url::Url;

use super::clean::clean_text;
use super::dates::{date_from_url, normalize_date};
use super::jsonld::{find_in_json_ld, value_as_text};
use super::readability::ReadableView;

pub const UNKNOWN_AUTHOR: &str = "Unknown Author";
const MIN_LEAD_PARAGRAPH_CHARS: usize = 50;

/// Everything a strategy may look at.
pub struct PageContext<'a> {
    pub doc: &'a Html,
    pub readable: &'a ReadableView,
    /// Set when the page was fetched; used for URL dates and image resolution.
    pub url: Option<&'a str>,
}

pub type Strategy<C> = (&'static str, fn(&C) -> Result<Option<String>>);

/// Run `strategies` in order and return the first non-blank result.
pub fn first_non_empty<C>(field: &str, ctx: &C, strategies: &[Strategy<C>]) -> Option<String> {
    for (name, strategy) in strategies {
        match strategy(ctx) {
            Ok(Some(v)) if !v.trim().is_empty() => {
                tracing::debug!(target: "extract", field, strategy = *name, "field resolved");
                return Some(v);
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(target: "extract", field, strategy = *name, error = %e, "strategy failed");
            }
        }
    }
    None
}

// ---- DOM helpers ----

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow!("invalid selector {css:?}: {e:?}"))
}

fn meta_content(doc: &Html, attr: &str, value: &str) -> Result<Option<String>> {
    let sel = selector(&format!(r#"meta[{attr}="{value}"]"#))?;
    Ok(doc
        .select(&sel)
        .next()
        .and_then(|m| m.value().attr("content"))
        .map(|c| c.trim().to_string()))
}

fn first_text(doc: &Html, css: &str) -> Result<Option<String>> {
    let sel = selector(css)?;
    Ok(doc
        .select(&sel)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string()))
}

/// Inner markup of every match, concatenated; the cleaner turns it into text.
fn all_inner_html(doc: &Html, css: &str) -> Result<Option<String>> {
    let sel = selector(css)?;
    let html: Vec<String> = doc.select(&sel).map(|el| el.inner_html()).collect();
    Ok((!html.is_empty()).then(|| html.join("\n\n")))
}

fn first_attr(doc: &Html, css: &str, attr: &str) -> Result<Option<String>> {
    let sel = selector(css)?;
    Ok(doc
        .select(&sel)
        .next()
        .and_then(|el| el.value().attr(attr))
        .map(|v| v.trim().to_string()))
}

fn cleaned(raw: Option<String>) -> Option<String> {
    raw.map(|r| clean_text(&r)).filter(|t| !t.is_empty())
}

// ---- title ----

pub fn extract_title(ctx: &PageContext) -> Option<String> {
    first_non_empty(
        "title",
        ctx,
        &[
            ("og:title", |c| meta_content(c.doc, "property", "og:title")),
            ("<title>", |c| first_text(c.doc, "title")),
            ("readability", |c| Ok(c.readable.title.clone())),
        ],
    )
}

// ---- author ----

/// Never `None`: falls back to [`UNKNOWN_AUTHOR`].
pub fn extract_author(ctx: &PageContext) -> String {
    first_non_empty(
        "author",
        ctx,
        &[
            ("meta author", |c| meta_content(c.doc, "name", "author")),
            ("article:author", |c| meta_content(c.doc, "property", "article:author")),
            ("byline", |c| {
                first_text(c.doc, "p.byline, span.byline, p.author, span.author")
            }),
            ("json-ld author", |c| {
                Ok(find_in_json_ld(c.doc, "author").and_then(|v| author_from_json(&v)))
            }),
        ],
    )
    .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string())
}

fn author_from_json(v: &Value) -> Option<String> {
    match v {
        Value::Array(items) => {
            let names: Vec<String> = items
                .iter()
                .map(|item| match item {
                    Value::Object(map) => match map.get("name").and_then(Value::as_str) {
                        Some(name) => name.trim().to_string(),
                        None => item.to_string(),
                    },
                    Value::String(s) => s.trim().to_string(),
                    other => other.to_string(),
                })
                .filter(|n| !n.is_empty())
                .collect();
            (!names.is_empty()).then(|| names.join(", "))
        }
        Value::Object(map) => Some(
            map.get("name")
                .and_then(Value::as_str)
                .map(|n| n.trim().to_string())
                .unwrap_or_else(|| v.to_string()),
        ),
        Value::String(s) => Some(s.trim().to_string()),
        other => Some(other.to_string()),
    }
}

// ---- publish date ----

/// Every candidate is normalized; the first that normalizes wins.
pub fn extract_publish_date(ctx: &PageContext) -> Option<String> {
    first_non_empty(
        "publish_date",
        ctx,
        &[
            ("article:published_time", |c| {
                Ok(normalize_date(
                    meta_content(c.doc, "property", "article:published_time")?.as_deref(),
                ))
            }),
            ("og:pubdate", |c| {
                Ok(normalize_date(meta_content(c.doc, "property", "og:pubdate")?.as_deref()))
            }),
            ("<time datetime>", |c| {
                Ok(normalize_date(first_attr(c.doc, "time[datetime]", "datetime")?.as_deref()))
            }),
            ("url path", |c| {
                Ok(normalize_date(c.url.and_then(date_from_url).as_deref()))
            }),
            ("json-ld datePublished", |c| {
                let raw = find_in_json_ld(c.doc, "datePublished");
                Ok(normalize_date(raw.as_ref().and_then(Value::as_str)))
            }),
        ],
    )
}

// ---- description ----

pub fn extract_description(ctx: &PageContext) -> Option<String> {
    first_non_empty(
        "description",
        ctx,
        &[
            ("meta description", |c| meta_content(c.doc, "name", "description")),
            ("og:description", |c| meta_content(c.doc, "property", "og:description")),
            ("twitter:description", |c| {
                meta_content(c.doc, "name", "twitter:description")
            }),
            ("json-ld description", |c| {
                Ok(find_in_json_ld(c.doc, "description")
                    .and_then(|v| v.as_str().map(|s| s.trim().to_string())))
            }),
            ("standfirst", |c| {
                first_text(c.doc, "p.article-description, p.standfirst")
            }),
            ("lead paragraph", |c| {
                Ok(first_text(c.doc, "article p")?
                    .filter(|p| p.chars().count() > MIN_LEAD_PARAGRAPH_CHARS))
            }),
        ],
    )
}

// ---- main text ----

/// Cleaned body text; a source that cleans down to nothing falls through.
pub fn extract_main_text(ctx: &PageContext) -> Option<String> {
    first_non_empty(
        "text",
        ctx,
        &[
            ("readability", |c| Ok(cleaned(c.readable.content.clone()))),
            ("<article>", |c| Ok(cleaned(all_inner_html(c.doc, "article")?))),
            ("content class", |c| {
                Ok(cleaned(all_inner_html(c.doc, "div.content, div.article-body")?))
            }),
            ("paragraph join", |c| {
                let sel = selector("p")?;
                let joined = c
                    .doc
                    .select(&sel)
                    .map(|p| p.text().collect::<String>())
                    .collect::<Vec<_>>()
                    .join(" ");
                Ok(cleaned(Some(joined)))
            }),
        ],
    )
}

// ---- lead image ----

/// Lead image, resolved against the page URL when one is known.
pub fn extract_top_image(ctx: &PageContext) -> Option<String> {
    let found = first_non_empty(
        "top_image",
        ctx,
        &[
            ("og:image", |c| meta_content(c.doc, "property", "og:image")),
            ("hero img", |c| first_attr(c.doc, "img.article, img.main, img.hero", "src")),
            ("json-ld image", |c| {
                Ok(find_in_json_ld(c.doc, "image").and_then(|v| value_as_text(&v)))
            }),
        ],
    )?;
    match ctx.url {
        Some(base) => Some(resolve_url(base, &found)),
        None => Some(found),
    }
}

/// Join `href` onto `base`; on any parse failure the raw value is kept.
pub fn resolve_url(base: &str, href: &str) -> String {
    Url::parse(base)
        .and_then(|b| b.join(href))
        .map(String::from)
        .unwrap_or_else(|e| {
            tracing::debug!(target: "extract", base, href, error = %e, "image url left unresolved");
            href.to_string()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::readability::readable_view;

    fn with_page<T>(html: &str, url: Option<&str>, f: impl FnOnce(&PageContext) -> T) -> T {
        let doc = Html::parse_document(html);
        let readable = readable_view(html);
        let ctx = PageContext {
            doc: &doc,
            readable: &readable,
            url,
        };
        f(&ctx)
    }

    #[test]
    fn first_non_empty_skips_blank_and_errors() {
        let strategies: [Strategy<()>; 4] = [
            ("blank", |_| Ok(Some("   ".into()))),
            ("error", |_| Err(anyhow!("boom"))),
            ("none", |_| Ok(None)),
            ("hit", |_| Ok(Some("value".into()))),
        ];
        assert_eq!(first_non_empty("f", &(), &strategies).as_deref(), Some("value"));
    }

    #[test]
    fn og_title_beats_title_tag() {
        let html = r#"<head><meta property="og:title" content="OG Headline"><title>Tag Title</title></head>"#;
        assert_eq!(
            with_page(html, None, extract_title).as_deref(),
            Some("OG Headline")
        );
    }

    #[test]
    fn author_from_json_ld_array_joins_names() {
        let html = r#"<script type="application/ld+json">
            {"@type":"NewsArticle","author":[{"@type":"Person","name":"Ada"},{"@type":"Person","name":"Grace"}]}
        </script>"#;
        assert_eq!(with_page(html, None, extract_author), "Ada, Grace");
    }

    #[test]
    fn author_object_without_name_is_json_text() {
        let v = serde_json::json!({"@type": "Organization"});
        assert_eq!(author_from_json(&v).as_deref(), Some(r#"{"@type":"Organization"}"#));
    }

    #[test]
    fn byline_is_trimmed() {
        let html = r#"<body><span class="byline">
            By Kim Lee   </span></body>"#;
        assert_eq!(with_page(html, None, extract_author), "By Kim Lee");
    }

    #[test]
    fn unparseable_meta_date_falls_through_to_url() {
        let html = r#"<head><meta property="article:published_time" content="soon"></head>"#;
        let url = Some("https://news.example/2024/03/09/quake.html");
        assert_eq!(
            with_page(html, url, extract_publish_date).as_deref(),
            Some("2024-03-09 00:00:00")
        );
    }

    #[test]
    fn time_element_date() {
        let html = r#"<body><time datetime="2023-11-02T14:05:00+01:00">Nov 2</time></body>"#;
        assert_eq!(
            with_page(html, None, extract_publish_date).as_deref(),
            Some("2023-11-02 14:05:00")
        );
    }

    #[test]
    fn json_ld_description_must_be_string() {
        let html = r#"<script type="application/ld+json">{"description":{"text":"nested"}}</script>
            <p class="standfirst">Standfirst wins here</p>"#;
        assert_eq!(
            with_page(html, None, extract_description).as_deref(),
            Some("Standfirst wins here")
        );
    }

    #[test]
    fn short_lead_paragraph_is_not_a_description() {
        let html = "<article><p>Too short.</p></article>";
        assert_eq!(with_page(html, None, extract_description), None);
    }

    #[test]
    fn relative_image_resolved_against_page_url() {
        let html = r#"<body><img class="hero" src="/img/lead.jpg"></body>"#;
        let url = Some("https://news.example/world/story.html");
        assert_eq!(
            with_page(html, url, extract_top_image).as_deref(),
            Some("https://news.example/img/lead.jpg")
        );
        assert_eq!(
            with_page(html, None, extract_top_image).as_deref(),
            Some("/img/lead.jpg")
        );
    }

    #[test]
    fn content_class_text_is_cleaned() {
        let html = r#"<body><div class="article-body"><h2>Heading</h2><p>Body &amp; more</p></div></body>"#;
        let doc = Html::parse_document(html);
        let ctx = PageContext {
            doc: &doc,
            readable: &ReadableView::default(),
            url: None,
        };
        assert_eq!(extract_main_text(&ctx).as_deref(), Some("Heading\n\nBody & more"));
    }

    #[test]
    fn reader_view_content_is_cleaned_first() {
        let doc = Html::parse_document("<article><p>Fallback body</p></article>");
        let readable = ReadableView {
            title: Some("Reader title".into()),
            content: Some("<div><p>Reader &amp; body</p><p>Second</p></div>".into()),
            excerpt: Some("Reader & body".into()),
        };
        let ctx = PageContext {
            doc: &doc,
            readable: &readable,
            url: None,
        };
        assert_eq!(extract_main_text(&ctx).as_deref(), Some("Reader & body\n\nSecond"));
        assert_eq!(extract_title(&ctx).as_deref(), Some("Reader title"));
    }
}
