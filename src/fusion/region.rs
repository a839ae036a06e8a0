use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::decay::{DecayEstimate, RegionProximity};

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Geographic area the dashboard watches, as a lat/lon box plus a centre.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct Region {
    pub name: String,
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_min: f64,
    pub lon_max: f64,
    pub center_lat: f64,
    pub center_lon: f64,
}

impl Default for Region {
    fn default() -> Self {
        Self {
            name: "Germany".to_string(),
            lat_min: 47.3,
            lat_max: 55.1,
            lon_min: 5.9,
            lon_max: 15.0,
            center_lat: 51.2,
            center_lon: 10.4,
        }
    }
}

impl Region {
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        (self.lat_min..=self.lat_max).contains(&lat) && (self.lon_min..=self.lon_max).contains(&lon)
    }

    /// Great-circle distance from the region centre, km.
    pub fn distance_km(&self, lat: f64, lon: f64) -> f64 {
        haversine_km(self.center_lat, self.center_lon, lat, lon)
    }

    pub fn proximity(&self, estimate: &DecayEstimate) -> RegionProximity {
        let (lat, lon) = (estimate.estimated_latitude, estimate.estimated_longitude);
        RegionProximity {
            region: self.name.clone(),
            distance_km: self.distance_km(lat, lon),
            inside: self.contains(lat, lon),
        }
    }
}

pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();
    let a = (dlat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().min(1.0).asin()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_same_point() {
        assert!(haversine_km(51.2, 10.4, 51.2, 10.4) < 1e-9);
    }

    #[test]
    fn test_haversine_known_distance() {
        // Berlin to Munich: ~504 km
        let d = haversine_km(52.52, 13.405, 48.137, 11.575);
        assert!(d > 490.0 && d < 520.0, "got {d}");
    }

    #[test]
    fn test_haversine_antipodal() {
        let d = haversine_km(0.0, 0.0, 0.0, 180.0);
        assert!((d - std::f64::consts::PI * EARTH_RADIUS_KM).abs() < 1e-6);
    }

    #[test]
    fn test_default_region_contains() {
        let region = Region::default();
        assert!(region.contains(51.2, 10.4));
        assert!(region.contains(47.3, 5.9));
        assert!(!region.contains(46.0, 10.0));
        assert!(!region.contains(51.0, 20.0));
    }
}
