// src/enrich/collision.rs
//! Fan-out of markers that share a position.
//!
//! Events whose coordinates agree to 5 decimal places form a group; groups
//! larger than one are spread evenly on a circle around the first member's
//! original position. The longitude offset is divided by cos(latitude) so the
//! circle is round on the ground rather than in degrees.

use std::collections::HashMap;
use std::f64::consts::PI;

use crate::model::Positioned;

/// Circle radius in degrees of latitude.
pub const OFFSET_RADIUS_DEG: f64 = 0.001;
const GROUP_PRECISION: f64 = 1e5;

type GroupKey = (i64, i64);

fn group_key(lat: f64, lon: f64) -> GroupKey {
    (
        (lat * GROUP_PRECISION).round() as i64,
        (lon * GROUP_PRECISION).round() as i64,
    )
}

/// Spread same-position items in place. Order and identity are preserved;
/// items without a position are left alone. Returns how many items moved.
pub fn resolve_collisions<T: Positioned>(items: &mut [T]) -> usize {
    let mut groups: HashMap<GroupKey, Vec<usize>> = HashMap::new();
    for (idx, item) in items.iter().enumerate() {
        if let Some((lat, lon)) = item.position() {
            if lat.is_finite() && lon.is_finite() {
                groups.entry(group_key(lat, lon)).or_default().push(idx);
            }
        }
    }

    let mut moved = 0;
    for members in groups.values().filter(|m| m.len() > 1) {
        let Some((base_lat, base_lon)) = items[members[0]].position() else {
            continue;
        };
        let lon_scale = base_lat.to_radians().cos();
        let n = members.len() as f64;
        for (i, &idx) in members.iter().enumerate() {
            let angle = 2.0 * PI * i as f64 / n;
            let lat = base_lat + OFFSET_RADIUS_DEG * angle.cos();
            let lon = base_lon + OFFSET_RADIUS_DEG * angle.sin() / lon_scale;
            items[idx].set_position(lat, lon);
            moved += 1;
        }
    }
    if moved > 0 {
        tracing::debug!(target: "enrich", moved, "overlapping coordinates spread");
    }
    moved
}
