// src/extract/jsonld.rs
//! Linked-data (`application/ld+json`) lookup.

use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use serde_json::Value;

/// Nesting guard; real-world blocks are rarely deeper than a handful of levels.
const MAX_DEPTH: usize = 32;

static LD_JSON: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"script[type="application/ld+json"]"#).expect("ld+json selector")
});

/// First truthy value stored under `key` in any linked-data block, in document
/// order. Blocks that fail to parse are skipped.
pub fn find_in_json_ld(doc: &Html, key: &str) -> Option<Value> {
    for script in doc.select(&LD_JSON) {
        let raw: String = script.text().collect();
        let raw = raw.trim();
        if raw.is_empty() {
            continue;
        }
        match serde_json::from_str::<Value>(raw) {
            Ok(data) => {
                if let Some(found) = find_key(&data, key, 0) {
                    return Some(found.clone());
                }
            }
            Err(e) => {
                tracing::debug!(target: "extract", error = %e, "skipping malformed JSON-LD block");
            }
        }
    }
    None
}

/// Depth-first search for `key`.
pub fn find_key<'a>(value: &'a Value, key: &str, depth: usize) -> Option<&'a Value> {
    if depth > MAX_DEPTH {
        return None;
    }
    match value {
        Value::Object(map) => {
            if let Some(v) = map.get(key).filter(|v| is_truthy(v)) {
                return Some(v);
            }
            map.values()
                .filter(|v| v.is_object() || v.is_array())
                .find_map(|v| find_key(v, key, depth + 1))
        }
        Value::Array(items) => items
            .iter()
            .filter(|v| v.is_object() || v.is_array())
            .find_map(|v| find_key(v, key, depth + 1)),
        _ => None,
    }
}

fn is_truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Plain string view of a linked-data value: strings as-is, objects by their
/// `name`/`url`/`@id`, arrays by their first member that yields one.
pub fn value_as_text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Object(map) => ["name", "url", "@id"]
            .iter()
            .find_map(|k| map.get(*k).and_then(Value::as_str))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()),
        Value::Array(items) => items.iter().find_map(value_as_text),
        _ => None,
    }
}
