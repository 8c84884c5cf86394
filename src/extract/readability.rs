// src/extract/readability.rs
//! Reader-mode view of a page, produced by Mozilla Readability running in an
//! embedded JS engine.
//!
//! The engine is created lazily, once per thread, and reused for every page
//! parsed on that thread. When it cannot be started or gives up on a page the
//! view is simply empty and the field chains fall through.

use readability_js::Readability;

use super::clean::clean_text;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadableView {
    pub title: Option<String>,
    /// HTML of the selected content, still carrying markup.
    pub content: Option<String>,
    /// First paragraph of the content as plain text.
    pub excerpt: Option<String>,
}

thread_local! {
    static ENGINE: Option<Readability> = match Readability::new() {
        Ok(engine) => Some(engine),
        Err(e) => {
            tracing::warn!(target: "extract", error = %e, "readability engine unavailable");
            None
        }
    };
}

/// Build the reader view. Never fails; fields are `None` when nothing fits.
pub fn readable_view(html: &str) -> ReadableView {
    ENGINE.with(|engine| {
        let Some(engine) = engine else {
            return ReadableView::default();
        };
        match engine.parse(html) {
            Ok(article) => {
                let content = non_blank(article.content);
                let excerpt = content.as_deref().and_then(first_paragraph);
                ReadableView {
                    title: non_blank(article.title),
                    content,
                    excerpt,
                }
            }
            Err(e) => {
                tracing::debug!(target: "extract", error = %e, "readability found no article");
                ReadableView::default()
            }
        }
    })
}

fn non_blank(s: String) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn first_paragraph(content_html: &str) -> Option<String> {
    clean_text(content_html)
        .split("\n\n")
        .next()
        .filter(|p| !p.is_empty())
        .map(str::to_string)
}
