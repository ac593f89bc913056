//! Routing seam between the computer and the distance-matrix backend.

use async_trait::async_trait;
use thiserror::Error;

use servmap_core::types::{GridCell, LatLng};
use servmap_osrm::{OsrmClient, OsrmError};

#[derive(Debug, Error)]
pub enum RoutingError {
    #[error("routing provider failure: {0}")]
    Provider(String),
}

impl From<OsrmError> for RoutingError {
    fn from(err: OsrmError) -> Self {
        RoutingError::Provider(err.to_string())
    }
}

/// One-to-many driving-time source. Mocked in tests; backed by OSRM in
/// production.
#[async_trait]
pub trait RoutingProvider: Send + Sync {
    /// `durations[source][destination]` in seconds, `None` = unreachable.
    async fn duration_table(
        &self,
        sources: &[LatLng],
        destinations: &[LatLng],
    ) -> Result<Vec<Vec<Option<f64>>>, RoutingError>;
}

#[async_trait]
impl RoutingProvider for OsrmClient {
    async fn duration_table(
        &self,
        sources: &[LatLng],
        destinations: &[LatLng],
    ) -> Result<Vec<Vec<Option<f64>>>, RoutingError> {
        Ok(OsrmClient::duration_table(self, sources, destinations).await?)
    }
}

/// Assign each batch point to the destination with the minimum duration.
///
/// Ties break to the lowest destination index, matching the provider's
/// destination ordering. A row with no reachable destination still gets
/// index 0 so no point is ever left unassigned.
///
/// The caller guarantees `table` has one row per point; rows are zipped, so
/// a short table (which the OSRM client already rejects) would silently
/// truncate rather than panic.
#[must_use]
pub fn assign_batch(points: &[LatLng], table: &[Vec<Option<f64>>]) -> Vec<GridCell> {
    points
        .iter()
        .zip(table.iter())
        .map(|(point, durations)| {
            let mut min_index = 0;
            let mut min_duration = f64::INFINITY;
            for (i, duration) in durations.iter().enumerate() {
                if let Some(d) = duration {
                    if *d < min_duration {
                        min_duration = *d;
                        min_index = i;
                    }
                }
            }
            GridCell {
                lat: point.lat,
                lng: point.lng,
                territory_index: min_index,
            }
        })
        .collect()
}
