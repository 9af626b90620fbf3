// SPDX-FileCopyrightText: 2026 Rockola Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Great-circle geofence check.

use rockola_core::{GeoPoint, GeofenceCheck};

/// Earth radius in kilometers (WGS84 equatorial).
const EARTH_RADIUS_KM: f64 = 6378.137;

/// Haversine-based circular geofence.
pub struct HaversineGeofence;

impl HaversineGeofence {
    /// Great-circle distance between two points, in kilometers.
    pub fn distance_km(a: GeoPoint, b: GeoPoint) -> f64 {
        let d_lat = (b.lat - a.lat).to_radians();
        let d_lon = (b.lon - a.lon).to_radians();

        let h = (d_lat / 2.0).sin().powi(2)
            + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lon / 2.0).sin().powi(2);

        let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
        EARTH_RADIUS_KM * c
    }
}

impl GeofenceCheck for HaversineGeofence {
    fn is_within(&self, center: GeoPoint, radius_km: f64, point: GeoPoint) -> bool {
        Self::distance_km(center, point) <= radius_km
    }
}
