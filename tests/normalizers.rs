// tests/normalizers.rs
//
// Properties of the pure helpers over a spread of inputs.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Datelike, NaiveDate, NaiveDateTime};

use news_globe::cache::TtlCache;
use news_globe::clock::ManualClock;
use news_globe::enrich::collision::{resolve_collisions, OFFSET_RADIUS_DEG};
use news_globe::extract::clean::clean_text;
use news_globe::extract::dates::{normalize_date, CANONICAL_FORMAT};
use news_globe::model::Positioned;

#[test]
fn cleaning_twice_changes_nothing() {
    let inputs = [
        "",
        "plain",
        "  lots   of\t\tspace \n here ",
        "<p>One</p><p>Two</p>",
        "<div>a<br>b</div><script>var x = '<p>';</script><style>p{}</style>",
        "Tom &amp; Jerry &lt;b&gt;bold&lt;/b&gt; &amp;amp;",
        "Caption (Photo by A. Person/Getty Images) follows",
        "<h2>Head</h2>\n\n\n<li>item</li><li>item</li>",
        "&lt;p&gt;escaped paragraph&lt;/p&gt;&lt;p&gt;second&lt;/p&gt;",
        "para one\n\n\n\n   \n\npara two",
    ];
    let mut nested = "&lt;b&gt;x".to_string();
    for _ in 0..10 {
        nested = nested.replace('&', "&amp;");
    }
    let owned = inputs.iter().map(|s| s.to_string()).chain([nested]);
    for input in owned {
        let input = input.as_str();
        let once = clean_text(input);
        assert_eq!(clean_text(&once), once, "input: {input:?}");
        assert!(!once.contains("\n\n\n"), "{once:?}");
        for para in once.split("\n\n") {
            assert_eq!(para.trim(), para);
            assert!(!para.contains("  "), "{para:?}");
        }
    }
}

#[test]
fn deeply_encoded_markup_settles_in_one_call() {
    let mut nested = "&lt;b&gt;x".to_string();
    for _ in 0..10 {
        nested = nested.replace('&', "&amp;");
    }
    assert_eq!(clean_text(&nested), "x");
}

#[test]
fn iso_dates_keep_their_calendar_day() {
    let cases = [
        ("2024-03-01", (2024, 3, 1)),
        ("2024-03-01T23:30:00Z", (2024, 3, 1)),
        ("2024-03-01T23:30:00-08:00", (2024, 3, 1)),
        ("2024-03-01T00:15:00+09:00", (2024, 3, 1)),
        ("2020-02-29T12:00:00.123Z", (2020, 2, 29)),
        ("1999-12-31 08:00", (1999, 12, 31)),
        ("2024", (2024, 1, 1)),
        ("2024-07", (2024, 7, 1)),
        ("2024-01-15T10", (2024, 1, 15)),
        ("20240115T103000Z", (2024, 1, 15)),
        ("20240115T103000", (2024, 1, 15)),
        ("2024-01-15T10:30:00+02", (2024, 1, 15)),
        ("2024-01-15T23:30-05", (2024, 1, 15)),
    ];
    for (raw, (y, m, d)) in cases {
        let out = normalize_date(Some(raw)).unwrap_or_else(|| panic!("{raw} rejected"));
        let parsed = NaiveDateTime::parse_from_str(&out, CANONICAL_FORMAT).unwrap();
        assert_eq!(parsed.date(), NaiveDate::from_ymd_opt(y, m, d).unwrap(), "{raw}");
        assert_eq!(parsed.year(), y);
        // Canonical output is a fixed point.
        assert_eq!(normalize_date(Some(&out)).as_deref(), Some(out.as_str()));
    }
}

#[test]
fn reduced_precision_fills_with_start_of_period() {
    let cases = [
        ("2024", "2024-01-01 00:00:00"),
        ("2024-01", "2024-01-01 00:00:00"),
        ("2024-01-15T10", "2024-01-15 10:00:00"),
        ("20240115T103000Z", "2024-01-15 10:30:00"),
        ("2024-01-15T10:30:00+02", "2024-01-15 10:30:00"),
    ];
    for (raw, want) in cases {
        assert_eq!(normalize_date(Some(raw)).as_deref(), Some(want), "{raw}");
    }
}

#[test]
fn garbage_dates_are_none() {
    for raw in ["", "   ", "yesterday", "2024-13-45", "not a date at all", "32/32/32"] {
        assert_eq!(normalize_date(Some(raw)), None, "{raw:?}");
    }
    assert_eq!(normalize_date(None), None);
}

#[derive(Debug, Clone, PartialEq)]
struct Marker(Option<(f64, f64)>);

impl Positioned for Marker {
    fn position(&self) -> Option<(f64, f64)> {
        self.0
    }
    fn set_position(&mut self, lat: f64, lon: f64) {
        self.0 = Some((lat, lon));
    }
}

#[test]
fn two_markers_at_one_spot_end_up_opposite() {
    let mut markers = vec![
        Marker(Some((40.000011, -74.000011))),
        Marker(None),
        Marker(Some((40.000012, -74.000012))),
    ];
    assert_eq!(resolve_collisions(&mut markers), 2);
    assert_eq!(markers[1], Marker(None));

    let (lat0, lon0) = markers[0].0.unwrap();
    let (lat2, lon2) = markers[2].0.unwrap();
    assert!((lat0 - 40.001011).abs() < 1e-9);
    assert!((lon0 - -74.000011).abs() < 1e-9);
    assert!((lat2 - 39.999011).abs() < 1e-9);
    assert!((lon2 - -74.000011).abs() < 1e-9);
}

#[test]
fn spread_group_lands_on_ground_circle() {
    let base = (60.0, 25.0);
    let mut markers = vec![Marker(Some(base)); 5];
    resolve_collisions(&mut markers);

    let cos_lat = base.0.to_radians().cos();
    let mut seen = Vec::new();
    for m in &markers {
        let (lat, lon) = m.0.unwrap();
        let d = ((lat - base.0).powi(2) + ((lon - base.1) * cos_lat).powi(2)).sqrt();
        assert!((d - OFFSET_RADIUS_DEG).abs() < 1e-9, "distance {d}");
        let key = ((lat * 1e5).round() as i64, (lon * 1e5).round() as i64);
        assert!(!seen.contains(&key), "still overlapping: {key:?}");
        seen.push(key);
    }
}

#[test]
fn cache_entry_expires_exactly_at_ttl() {
    let clock = Arc::new(ManualClock::at(1_000));
    let cache: TtlCache<Vec<u32>> = TtlCache::new(Duration::from_secs(10), clock.clone());

    assert_eq!(cache.get("k"), None);
    assert_eq!(cache.set("k", vec![1, 2]), 1_000);
    assert_eq!(cache.get("k"), Some(vec![1, 2]));

    clock.advance_millis(9_999);
    assert_eq!(cache.get("k"), Some(vec![1, 2]));
    clock.advance_millis(1);
    assert_eq!(cache.get("k"), None);
    assert_eq!(cache.len(), 1);

    cache.set("k", vec![3]);
    assert_eq!(cache.get_entry("k").unwrap().timestamp, 11_000);
}
