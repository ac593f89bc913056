//! Candidate point lattice for one computation run.
//!
//! Generates an evenly spaced `size × size` grid across the padded bounds of
//! the mappable locations, then drops every point farther than the relevance
//! radius from all of them. With clustered locations this cuts the routing
//! workload sharply; remote corners of the bounding box are never queried
//! and never rendered.

use servmap_core::geo::haversine_km;
use servmap_core::types::{Bounds, LatLng};

/// Quantization factor for coordinate keys: 4 decimal places, ~11 m. Coarse
/// enough to absorb float noise between runs, fine enough that distinct grid
/// cells never collide.
const KEY_SCALE: f64 = 10_000.0;

#[derive(Debug, Clone, Copy)]
pub struct GridSpec {
    /// Points per axis.
    pub size: usize,
    /// Relevance radius in kilometers.
    pub max_distance_km: f64,
}

/// The candidate points of one run together with the bounds they were laid
/// out on. The bounds travel with the snapshot from here on; border math
/// must use these, never freshly recomputed ones.
#[derive(Debug, Clone)]
pub struct TargetGrid {
    pub points: Vec<LatLng>,
    pub bounds: Bounds,
}

/// Rounded-coordinate key used for resume deduplication and the border
/// lookup. Float equality on raw coordinates would miss re-parsed cache
/// values; quantizing to ~11 m makes the key stable.
#[must_use]
pub fn quantize(p: LatLng) -> (i64, i64) {
    #[allow(clippy::cast_possible_truncation)]
    let key = (
        (p.lat * KEY_SCALE).round() as i64,
        (p.lng * KEY_SCALE).round() as i64,
    );
    key
}

/// Generate the candidate lattice for the given mappable location
/// coordinates.
///
/// Bounds come from the locations padded by the relevance radius; with no
/// locations the default service region is used and no points are emitted
/// (the computation is skipped upstream anyway for fewer than 2 locations).
/// Points are inclusive of the bounds edges, step `(max-min)/(size-1)` per
/// axis, and filtered to those within `max_distance_km` of at least one
/// location.
#[must_use]
pub fn generate_grid(locations: &[LatLng], spec: &GridSpec) -> TargetGrid {
    if locations.is_empty() {
        return TargetGrid {
            points: Vec::new(),
            bounds: Bounds::default_region(),
        };
    }

    let bounds = Bounds::around(locations, spec.max_distance_km);

    let steps = (spec.size - 1) as f64;
    let lat_span = bounds.max_lat - bounds.min_lat;
    let lng_span = bounds.max_lng - bounds.min_lng;

    let mut points = Vec::new();
    for i in 0..spec.size {
        let lat = bounds.min_lat + (i as f64 / steps) * lat_span;
        for j in 0..spec.size {
            let lng = bounds.min_lng + (j as f64 / steps) * lng_span;
            let point = LatLng { lat, lng };
            if is_relevant(point, locations, spec.max_distance_km) {
                points.push(point);
            }
        }
    }

    TargetGrid { points, bounds }
}

/// A point is relevant when some location lies within the relevance radius.
fn is_relevant(point: LatLng, locations: &[LatLng], max_distance_km: f64) -> bool {
    locations
        .iter()
        .any(|loc| haversine_km(point, *loc) <= max_distance_km)
}
