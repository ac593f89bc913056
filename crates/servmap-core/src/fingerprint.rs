//! Order-independent digest of a location set for cache validity.
//!
//! Two location sets with the same mappable coordinates (in any order) hash
//! identically; moving a location by ≥ 1e-6 degrees, or adding/removing one,
//! changes the digest and invalidates cached snapshots.

use sha2::{Digest, Sha256};

use crate::types::Location;

/// Hex length of the fingerprint. Short enough for log lines, long enough
/// that accidental collisions are not a practical concern.
const FINGERPRINT_LEN: usize = 12;

/// Stable digest over the sorted, rounded coordinates of all mappable
/// locations.
#[must_use]
pub fn locations_fingerprint(locations: &[Location]) -> String {
    let mut coords: Vec<String> = locations
        .iter()
        .filter(|l| l.is_mappable())
        .filter_map(Location::coords)
        .map(|c| format!("{:.6},{:.6}", c.lat, c.lng))
        .collect();
    coords.sort();

    let digest = Sha256::digest(coords.join("|").as_bytes());
    let mut hex = String::with_capacity(FINGERPRINT_LEN);
    for byte in digest.iter().take(FINGERPRINT_LEN / 2) {
        hex.push_str(&format!("{byte:02x}"));
    }
    hex
}
