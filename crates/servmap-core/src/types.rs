//! Domain types shared across the territory engine.
//!
//! Wire names follow the cache service's camelCase JSON contract
//! (`minLat`, `isPartial`, ...), Rust fields stay snake_case.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A plain coordinate pair in WGS84 degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

/// A service location as provided by the location registry.
///
/// Fallback operators take overflow calls but never own territory, so they
/// are excluded from the partition and from the fingerprint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub fallback: bool,
}

impl Location {
    /// Coordinates if both are present.
    #[must_use]
    pub fn coords(&self) -> Option<LatLng> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => Some(LatLng { lat, lng }),
            _ => None,
        }
    }

    /// A location participates in the partition only with both coordinates
    /// and only as a primary (non-fallback) operator.
    #[must_use]
    pub fn is_mappable(&self) -> bool {
        !self.fallback && self.coords().is_some()
    }
}

/// Geographic bounding box of one computation run.
///
/// Bounds stored in a snapshot are immutable for that snapshot's lifetime:
/// cell positions and border steps are defined relative to them, so they are
/// never recomputed when rendering a cached result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

/// One grid point with its fastest-to-reach location.
///
/// `territory_index` is the offset into the mappable-location list captured
/// in [`TerritorySnapshot::location_ids`] at computation time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridCell {
    pub lat: f64,
    pub lng: f64,
    pub territory_index: usize,
}

/// One persisted computation result, partial or complete.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TerritorySnapshot {
    pub grid: Vec<GridCell>,
    pub locations_fingerprint: String,
    /// Stable location IDs in the destination order used for this run.
    /// Resolves `territory_index` even if the registry later reorders.
    pub location_ids: Vec<String>,
    pub computed_at: Option<DateTime<Utc>>,
    pub is_partial: bool,
    pub total_points: usize,
    pub grid_size: usize,
    pub bounds: Bounds,
}

impl TerritorySnapshot {
    /// An in-progress checkpoint: partial, no completion timestamp.
    #[must_use]
    pub fn checkpoint(
        grid: Vec<GridCell>,
        locations_fingerprint: String,
        location_ids: Vec<String>,
        total_points: usize,
        grid_size: usize,
        bounds: Bounds,
    ) -> Self {
        Self {
            grid,
            locations_fingerprint,
            location_ids,
            computed_at: None,
            is_partial: true,
            total_points,
            grid_size,
            bounds,
        }
    }

    /// A finished run: complete, stamped now.
    #[must_use]
    pub fn finished(
        grid: Vec<GridCell>,
        locations_fingerprint: String,
        location_ids: Vec<String>,
        total_points: usize,
        grid_size: usize,
        bounds: Bounds,
    ) -> Self {
        Self {
            grid,
            locations_fingerprint,
            location_ids,
            computed_at: Some(Utc::now()),
            is_partial: false,
            total_points,
            grid_size,
            bounds,
        }
    }

    /// A snapshot is usable as a final result only when it is not partial
    /// and carries a completion timestamp.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.is_partial && self.computed_at.is_some()
    }
}

/// A renderable boundary line between two adjacent cells of different
/// territories.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BorderSegment {
    pub from: LatLng,
    pub to: LatLng,
}
