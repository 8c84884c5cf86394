// src/extract/dates.rs
//! Date normalization to `YYYY-MM-DD HH:MM:SS`.
//!
//! Offsets are dropped, not converted: the canonical form keeps the wall-clock
//! time the publisher wrote, so the calendar date never shifts across zones.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;

pub const CANONICAL_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y%m%dT%H%M%S%z",
    "%Y-%m-%dT%H:%M%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M%z",
];

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y%m%dT%H%M%S",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y%m%d",
    "%Y/%m/%d",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
];

static YEAR_ONLY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}$").expect("year regex"));
static YEAR_MONTH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}$").expect("year-month regex"));
static HOUR_ONLY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{4}-\d{2}-\d{2}[T ]\d{2})([Zz]|[+-]\d{2}(?::?\d{2})?)?$").expect("hour regex")
});
static HOUR_OFFSET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(.+[T ]\d{2}(?::?\d{2}){0,2}(?:\.\d+)?[+-]\d{2})$").expect("hour offset regex")
});

static URL_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/(\d{4})/(\d{2})/(\d{2})/").expect("url date regex"));

/// Parse an arbitrary date string into the canonical form, or `None`.
pub fn normalize_date(raw: Option<&str>) -> Option<String> {
    parse_loose(raw?).map(|dt| dt.format(CANONICAL_FORMAT).to_string())
}

fn parse_loose(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    let expanded = expand_reduced_precision(s);
    let s = expanded.as_str();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }

    // `Z` suffix on shapes RFC 3339 rejects (e.g. no seconds).
    let zulu;
    let s = match s.strip_suffix(['Z', 'z']) {
        Some(head) => {
            zulu = format!("{head}+0000");
            zulu.as_str()
        }
        None => s,
    };

    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.naive_local());
        }
    }
    for fmt in NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw.trim()) {
        return Some(dt.naive_local());
    }

    tracing::debug!(target: "extract", raw, "unparseable date");
    None
}

/// Rewrite reduced-precision ISO 8601 shapes into ones the format tables
/// cover: missing month/day become `01`, a bare hour gets `:00` minutes and a
/// `±HH` offset gets `00` minutes.
fn expand_reduced_precision(s: &str) -> String {
    if YEAR_ONLY.is_match(s) {
        return format!("{s}-01-01");
    }
    if YEAR_MONTH.is_match(s) {
        return format!("{s}-01");
    }
    if let Some(caps) = HOUR_ONLY.captures(s) {
        let zone = caps.get(2).map_or("", |m| m.as_str());
        return expand_reduced_precision(&format!("{}:00{zone}", &caps[1]));
    }
    if HOUR_OFFSET.is_match(s) {
        return format!("{s}00");
    }
    s.to_string()
}

/// `YYYY-MM-DD` from a `/YYYY/MM/DD/` path segment, if the URL has one.
pub fn date_from_url(url: &str) -> Option<String> {
    let caps = URL_DATE.captures(url)?;
    Some(format!("{}-{}-{}", &caps[1], &caps[2], &caps[3]))
}
