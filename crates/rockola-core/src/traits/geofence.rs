// SPDX-FileCopyrightText: 2026 Rockola Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Geofence check trait.

use crate::types::GeoPoint;

/// Circular admission boundary check.
///
/// Implementations decide whether a candidate point falls within
/// `radius_km` of `center` (great-circle distance). This is a synchronous,
/// pure computation, so unlike the I/O adapters it does not extend
/// [`PluginAdapter`](crate::traits::adapter::PluginAdapter).
pub trait GeofenceCheck: Send + Sync {
    /// Returns whether `point` lies within `radius_km` of `center`.
    fn is_within(&self, center: GeoPoint, radius_km: f64, point: GeoPoint) -> bool;
}
