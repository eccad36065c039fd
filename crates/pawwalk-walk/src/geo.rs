use serde::{Deserialize, Serialize};

/// Mean Earth radius for the spherical model, in km
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A latitude/longitude pair in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// True when both coordinates are finite and inside their ranges
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        haversine_km(*self, *other)
    }
}

/// Great-circle distance between two points in km
pub fn haversine_km(p1: GeoPoint, p2: GeoPoint) -> f64 {
    let d_lat = (p2.latitude - p1.latitude).to_radians();
    let d_lon = (p2.longitude - p1.longitude).to_radians();
    let lat1 = p1.latitude.to_radians();
    let lat2 = p2.latitude.to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    // Rounding can push `a` just past 1 for near-antipodal points
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Point `km` kilometers due north of `from`. Used to lay out test routes.
#[cfg(test)]
pub(crate) fn offset_north(from: GeoPoint, km: f64) -> GeoPoint {
    let d_lat = (km / EARTH_RADIUS_KM).to_degrees();
    GeoPoint::new(from.latitude + d_lat, from.longitude)
}
