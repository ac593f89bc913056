//! Wire types for the OSRM `table` service.

use serde::Deserialize;

/// Response body of `GET /table/v1/{profile}/{coords}`.
///
/// `durations[source][destination]` is the driving time in seconds; `null`
/// entries mean the destination is unreachable from that source.
#[derive(Debug, Deserialize)]
pub struct TableResponse {
    pub code: String,
    #[serde(default)]
    pub durations: Option<Vec<Vec<Option<f64>>>>,
}
