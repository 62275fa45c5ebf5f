//! Great-circle distance between user and candidate coordinates.

use suggest_core::types::Coordinate;

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance in kilometers.
pub fn haversine_km(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = (b.lat - a.lat).to_radians();
    let dlon = (b.lon - a.lon).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * h.sqrt().asin() * EARTH_RADIUS_KM
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_distance_at_same_point() {
        let p = Coordinate { lat: 40.7128, lon: -74.0060 };
        assert_eq!(haversine_km(p, p), 0.0);
    }

    #[test]
    fn known_city_pair_distance() {
        // New York -> Philadelphia, roughly 130 km
        let nyc = Coordinate { lat: 40.7128, lon: -74.0060 };
        let philly = Coordinate { lat: 39.9526, lon: -75.1652 };
        let d = haversine_km(nyc, philly);
        assert!((120.0..140.0).contains(&d), "got {d}");
    }
}
