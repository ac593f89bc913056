//! Boundary extraction from a finished cell grid.
//!
//! Walks every cell and compares it with its right and top neighbors only;
//! checking left/bottom as well would emit the same shared edge twice, once
//! from each side. Steps are derived from the snapshot's own bounds and
//! resolution, never from current configuration: the snapshot may have been
//! computed with different settings than the ones running now.

use std::collections::HashMap;

use servmap_core::types::{BorderSegment, LatLng, TerritorySnapshot};

use crate::grid::quantize;

/// Derive the renderable territory boundary segments of a snapshot.
///
/// Each internal edge between two differently-assigned adjacent cells
/// appears exactly once, in no particular order. Degenerate snapshots
/// (resolution below 2) have no edges.
#[must_use]
pub fn extract_borders(snapshot: &TerritorySnapshot) -> Vec<BorderSegment> {
    if snapshot.grid_size < 2 {
        return Vec::new();
    }

    let steps = (snapshot.grid_size - 1) as f64;
    let lat_step = (snapshot.bounds.max_lat - snapshot.bounds.min_lat) / steps;
    let lng_step = (snapshot.bounds.max_lng - snapshot.bounds.min_lng) / steps;

    let lookup: HashMap<(i64, i64), usize> = snapshot
        .grid
        .iter()
        .map(|cell| {
            (
                quantize(LatLng {
                    lat: cell.lat,
                    lng: cell.lng,
                }),
                cell.territory_index,
            )
        })
        .collect();

    let mut segments = Vec::new();
    for cell in &snapshot.grid {
        let right = quantize(LatLng {
            lat: cell.lat,
            lng: cell.lng + lng_step,
        });
        if let Some(&neighbor) = lookup.get(&right) {
            if neighbor != cell.territory_index {
                // Shared edge runs north-south, halfway to the neighbor.
                let edge_lng = cell.lng + lng_step / 2.0;
                segments.push(BorderSegment {
                    from: LatLng {
                        lat: cell.lat - lat_step / 2.0,
                        lng: edge_lng,
                    },
                    to: LatLng {
                        lat: cell.lat + lat_step / 2.0,
                        lng: edge_lng,
                    },
                });
            }
        }

        let top = quantize(LatLng {
            lat: cell.lat + lat_step,
            lng: cell.lng,
        });
        if let Some(&neighbor) = lookup.get(&top) {
            if neighbor != cell.territory_index {
                let edge_lat = cell.lat + lat_step / 2.0;
                segments.push(BorderSegment {
                    from: LatLng {
                        lat: edge_lat,
                        lng: cell.lng - lng_step / 2.0,
                    },
                    to: LatLng {
                        lat: edge_lat,
                        lng: cell.lng + lng_step / 2.0,
                    },
                });
            }
        }
    }

    segments
}
