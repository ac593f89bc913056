//! HTTP client for OSRM's one-to-many `table` service.
//!
//! One request resolves the driving time from a batch of grid points to
//! every service location. The client makes no retries: a failed batch is
//! skipped by the caller and the missing points are picked up by the next
//! computation pass, so retry loops here would only burn the provider's
//! rate budget.

use std::time::Duration;

use reqwest::Client;

use servmap_core::types::LatLng;

use crate::error::OsrmError;
use crate::types::TableResponse;

/// Hard cap on sources per table request. The public OSRM instance rejects
/// tables beyond ~100 coordinates; callers batch well below this.
pub const MAX_SOURCES_PER_REQUEST: usize = 80;

/// Client for OSRM's `table` endpoint.
#[derive(Debug, Clone)]
pub struct OsrmClient {
    client: Client,
    base_url: String,
    profile: String,
}

impl OsrmClient {
    /// Creates an `OsrmClient` with request and connect timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`OsrmError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(base_url: &str, profile: &str, timeout_secs: u64) -> Result<Self, OsrmError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            profile: profile.to_string(),
        })
    }

    /// Fetches the duration matrix from every source to every destination.
    ///
    /// Returns `durations[source][destination]` in seconds; `None` entries
    /// mean the route is unreachable. An empty source slice short-circuits
    /// to an empty matrix without a network call.
    ///
    /// # Errors
    ///
    /// - [`OsrmError::TooManySources`] — caller exceeded the per-request cap.
    /// - [`OsrmError::Http`] — network, TLS, or timeout failure.
    /// - [`OsrmError::UnexpectedStatus`] — non-2xx HTTP status.
    /// - [`OsrmError::Deserialize`] — body is not valid table JSON.
    /// - [`OsrmError::Api`] — OSRM answered with `code != "Ok"`.
    /// - [`OsrmError::MalformedMatrix`] — matrix missing or wrong shape.
    pub async fn duration_table(
        &self,
        sources: &[LatLng],
        destinations: &[LatLng],
    ) -> Result<Vec<Vec<Option<f64>>>, OsrmError> {
        if sources.is_empty() {
            return Ok(Vec::new());
        }
        if sources.len() > MAX_SOURCES_PER_REQUEST {
            return Err(OsrmError::TooManySources {
                got: sources.len(),
                max: MAX_SOURCES_PER_REQUEST,
            });
        }

        let url = self.table_url(sources, destinations);

        tracing::debug!(
            sources = sources.len(),
            destinations = destinations.len(),
            "requesting OSRM duration table"
        );

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(OsrmError::UnexpectedStatus {
                status: status.as_u16(),
                url,
            });
        }

        let body = response.text().await?;
        let parsed =
            serde_json::from_str::<TableResponse>(&body).map_err(|e| OsrmError::Deserialize {
                context: format!("table response from {url}"),
                source: e,
            })?;

        if parsed.code != "Ok" {
            return Err(OsrmError::Api { code: parsed.code });
        }

        let durations = parsed.durations.ok_or_else(|| OsrmError::MalformedMatrix {
            reason: "response has code Ok but no durations".to_string(),
        })?;

        if durations.len() != sources.len() {
            return Err(OsrmError::MalformedMatrix {
                reason: format!(
                    "expected {} rows, got {}",
                    sources.len(),
                    durations.len()
                ),
            });
        }
        for (i, row) in durations.iter().enumerate() {
            if row.len() != destinations.len() {
                return Err(OsrmError::MalformedMatrix {
                    reason: format!(
                        "row {i} has {} columns, expected {}",
                        row.len(),
                        destinations.len()
                    ),
                });
            }
        }

        Ok(durations)
    }

    /// Builds the table URL: sources first, then destinations, with index
    /// lists partitioning the combined coordinate string. OSRM wants
    /// `lng,lat` order.
    fn table_url(&self, sources: &[LatLng], destinations: &[LatLng]) -> String {
        let coords = sources
            .iter()
            .chain(destinations.iter())
            .map(|p| format!("{:.6},{:.6}", p.lng, p.lat))
            .collect::<Vec<_>>()
            .join(";");

        let source_indices = (0..sources.len())
            .map(|i| i.to_string())
            .collect::<Vec<_>>()
            .join(";");
        let destination_indices = (sources.len()..sources.len() + destinations.len())
            .map(|i| i.to_string())
            .collect::<Vec<_>>()
            .join(";");

        format!(
            "{}/table/v1/{}/{}?sources={}&destinations={}&annotations=duration",
            self.base_url, self.profile, coords, source_indices, destination_indices
        )
    }
}
