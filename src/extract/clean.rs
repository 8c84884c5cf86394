// src/extract/clean.rs
//! Plain-text normalization for extracted article bodies.
//!
//! Output is paragraphs separated by one blank line, with whitespace inside a
//! paragraph collapsed to single spaces. Single newlines in the input are
//! treated as ordinary whitespace; blank lines and block-level tags mark
//! paragraph boundaries.

use once_cell::sync::Lazy;
use regex::Regex;

/// Phrases removed wherever they occur (image credit boilerplate).
const DENYLIST: &[&str] = &[r"\bGetty\s+Images\b"];

static RE_SCRIPT_STYLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>|<style\b[^>]*>.*?</style\s*>")
        .expect("script/style regex")
});

static RE_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)</?(?:p|div|h[1-6]|li|ul|ol|br|blockquote|section|article|header|footer|nav|figure|figcaption|aside|details|summary|address|table|tr|pre)\b[^>]*>",
    )
    .expect("block tag regex")
});

static RE_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("tag regex"));

static RE_DENY: Lazy<Regex> = Lazy::new(|| Regex::new(&DENYLIST.join("|")).expect("denylist regex"));

static RE_PARAGRAPH_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n[^\S\n]*\n").expect("paragraph break regex"));

static RE_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex"));

/// Strip markup and normalize whitespace. Idempotent.
///
/// Passes repeat until the output stops changing, since entity-encoded markup
/// can need several rounds to settle. Every pass that changes the text makes
/// it strictly shorter, so the loop ends.
pub fn clean_text(raw: &str) -> String {
    let mut current = clean_pass(raw);
    loop {
        let next = clean_pass(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn clean_pass(raw: &str) -> String {
    // 1) HTML entity decode
    let decoded = html_escape::decode_html_entities(raw);

    // 2) Drop script/style including content
    let out = RE_SCRIPT_STYLE.replace_all(&decoded, "");

    // 3) Block boundaries become paragraph breaks
    let out = RE_BLOCK.replace_all(&out, "\n\n");

    // 4) Remaining tags
    let out = RE_TAG.replace_all(&out, "");

    // 5) Credit boilerplate
    let out = RE_DENY.replace_all(&out, "");

    // 6) Per-paragraph whitespace collapse, rejoin
    RE_PARAGRAPH_BREAK
        .split(&out)
        .map(|para| RE_WS.replace_all(para, " ").trim().to_string())
        .filter(|para| !para.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}
