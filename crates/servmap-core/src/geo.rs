//! Great-circle distance and bounding-box math.

use crate::types::{Bounds, LatLng};

/// Earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Kilometers per degree of latitude (and of longitude at the equator).
const KM_PER_DEGREE: f64 = 111.0;

/// Haversine distance between two points in kilometers.
#[must_use]
pub fn haversine_km(a: LatLng, b: LatLng) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);

    EARTH_RADIUS_KM * 2.0 * h.sqrt().atan2((1.0 - h).sqrt())
}

impl Bounds {
    /// Min/max box around `points`, padded by `padding_km` on every side.
    ///
    /// Longitude padding widens by the cosine of the mean latitude so the
    /// physical margin stays roughly equal. Returns the default region when
    /// `points` is empty.
    #[must_use]
    pub fn around(points: &[LatLng], padding_km: f64) -> Self {
        let mut lats = points.iter().map(|p| p.lat);
        let Some(first_lat) = lats.next() else {
            return Self::default_region();
        };
        let (min_lat, max_lat) = lats.fold((first_lat, first_lat), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });

        let mut lngs = points.iter().map(|p| p.lng);
        // points is non-empty here
        let first_lng = lngs.next().unwrap_or(0.0);
        let (min_lng, max_lng) = lngs.fold((first_lng, first_lng), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });

        let lat_padding = padding_km / KM_PER_DEGREE;
        let mean_lat = (min_lat + max_lat) / 2.0;
        let lng_padding = padding_km / (KM_PER_DEGREE * mean_lat.to_radians().cos().abs());

        Self {
            min_lat: min_lat - lat_padding,
            max_lat: max_lat + lat_padding,
            min_lng: min_lng - lng_padding,
            max_lng: max_lng + lng_padding,
        }
    }

    /// Fixed fallback box covering the whole service region (Germany), used
    /// when no location has coordinates.
    #[must_use]
    pub fn default_region() -> Self {
        Self {
            min_lat: 47.2,
            max_lat: 55.0,
            min_lng: 5.8,
            max_lng: 15.0,
        }
    }
}
