//! Haversine distance and display helpers

use super::Coordinate;

/// Mean Earth radius in kilometers
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two points in kilometers
#[inline]
pub fn distance_km(a: Coordinate, b: Coordinate) -> f64 {
    let lat1_rad = a.latitude.to_radians();
    let lat2_rad = b.latitude.to_radians();
    let delta_lat = (b.latitude - a.latitude).to_radians();
    let delta_lon = (b.longitude - a.longitude).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

/// Great-circle distance between two points in meters
#[inline]
pub fn distance_meters(a: Coordinate, b: Coordinate) -> f64 {
    distance_km(a, b) * 1000.0
}

/// Render a distance for display.
///
/// Below one kilometer the value is shown in whole meters (`"500 m"`),
/// otherwise in kilometers with two decimals (`"2.50 km"`). Ties on the
/// shortest decimal form round half up, so `1.125` reads `"1.13 km"`.
pub fn format_distance(km: f64) -> String {
    if km < 1.0 {
        format!("{} m", (km * 1000.0).round() as i64)
    } else {
        // Shift the decimal point textually: 2.675 * 100.0 is 267.49999...
        let hundredths: f64 = format!("{}e2", km).parse().unwrap_or(km * 100.0);
        format!("{:.2} km", hundredths.round() / 100.0)
    }
}

/// Whether `point` lies within `radius_km` of `center`, boundary included
pub fn is_within_radius(center: Coordinate, point: Coordinate, radius_km: f64) -> bool {
    distance_km(center, point) <= radius_km
}

/// Spherical midpoint of the great-circle segment between `a` and `b`
pub fn midpoint(a: Coordinate, b: Coordinate) -> Coordinate {
    let lat1 = a.latitude.to_radians();
    let lon1 = a.longitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let delta_lon = (b.longitude - a.longitude).to_radians();

    let bx = lat2.cos() * delta_lon.cos();
    let by = lat2.cos() * delta_lon.sin();

    let lat3 = (lat1.sin() + lat2.sin()).atan2(((lat1.cos() + bx).powi(2) + by.powi(2)).sqrt());
    let lon3 = lon1 + by.atan2(lat1.cos() + bx);

    Coordinate::new(lat3.to_degrees(), lon3.to_degrees())
}
