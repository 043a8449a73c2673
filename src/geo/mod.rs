//! Geographic primitives: coordinates, great-circle distance and proximity ranking

pub mod distance;
pub mod ranking;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub use distance::{distance_km, distance_meters, format_distance, is_within_radius, midpoint};
pub use ranking::{rank_by_proximity, Located, Ranked};

/// A point in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Build a coordinate only when both components are present.
    pub fn from_parts(latitude: Option<f64>, longitude: Option<f64>) -> Option<Self> {
        match (latitude, longitude) {
            (Some(latitude), Some(longitude)) => Some(Self::new(latitude, longitude)),
            _ => None,
        }
    }

    /// Latitude in [-90, 90] and longitude in [-180, 180]. NaN is never valid.
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Google answers (0, 0) for some unresolvable addresses
    pub fn is_null_island(&self) -> bool {
        self.latitude == 0.0 && self.longitude == 0.0
    }
}

/// Axis-aligned latitude/longitude box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    #[inline]
    pub fn contains(&self, point: &Coordinate) -> bool {
        point.latitude >= self.min_lat
            && point.latitude <= self.max_lat
            && point.longitude >= self.min_lon
            && point.longitude <= self.max_lon
    }
}

/// Approximate limits of the city of São Paulo, the only served area
pub const SAO_PAULO_BOUNDS: BoundingBox = BoundingBox {
    min_lat: -24.0,
    max_lat: -23.0,
    min_lon: -47.0,
    max_lon: -46.0,
};

/// Praça da Sé
pub const SAO_PAULO_CENTER: Coordinate = Coordinate::new(-23.5505, -46.6333);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_validity() {
        assert!(Coordinate::new(90.0, 180.0).is_valid());
        assert!(Coordinate::new(-90.0, -180.0).is_valid());
        assert!(!Coordinate::new(90.0001, 0.0).is_valid());
        assert!(!Coordinate::new(0.0, -180.5).is_valid());
        assert!(!Coordinate::new(f64::NAN, 0.0).is_valid());
    }

    #[test]
    fn test_from_parts_requires_both() {
        assert_eq!(Coordinate::from_parts(Some(1.0), Some(2.0)), Some(Coordinate::new(1.0, 2.0)));
        assert_eq!(Coordinate::from_parts(Some(1.0), None), None);
        assert_eq!(Coordinate::from_parts(None, Some(2.0)), None);
    }

    #[test]
    fn test_sao_paulo_bounds() {
        assert!(SAO_PAULO_BOUNDS.contains(&SAO_PAULO_CENTER));
        assert!(SAO_PAULO_BOUNDS.contains(&Coordinate::new(-24.0, -46.0)));
        // Rio de Janeiro
        assert!(!SAO_PAULO_BOUNDS.contains(&Coordinate::new(-22.9068, -43.1729)));
        assert!(!SAO_PAULO_BOUNDS.contains(&Coordinate::new(0.0, 0.0)));
    }
}
