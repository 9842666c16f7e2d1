pub mod geocoder;

use serde::{Deserialize, Serialize};

pub use geocoder::{GeocodeError, GeocodeMatch, Geocoder, MapQuestGeocoder, StaticGeocoder};

/// Mean Earth radius in miles. Radius search distances are miles end to end.
pub const EARTH_RADIUS_MILES: f64 = 3963.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Great-circle angle to `other` in radians (haversine)
    pub fn central_angle(&self, other: &GeoPoint) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let dlat = (other.latitude - self.latitude).to_radians();
        let dlon = (other.longitude - self.longitude).to_radians();

        let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        2.0 * h.sqrt().min(1.0).asin()
    }

    /// True when `other` lies inside the spherical cap of `radius` radians
    pub fn within_cap(&self, other: &GeoPoint, radius: f64) -> bool {
        self.central_angle(other) <= radius
    }
}

/// Convert a linear distance in miles into an angular radius in radians
pub fn angular_radius(distance_miles: f64) -> f64 {
    distance_miles / EARTH_RADIUS_MILES
}
