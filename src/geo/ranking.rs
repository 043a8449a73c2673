//! Proximity ranking of located entities

use super::{distance_km, format_distance, Coordinate};

/// Anything that may carry a position
pub trait Located {
    fn coordinate(&self) -> Option<Coordinate>;
}

impl Located for Coordinate {
    fn coordinate(&self) -> Option<Coordinate> {
        Some(*self)
    }
}

/// An entity annotated with its distance to the reference point.
///
/// `distance_km` is `None` when no valid reference was given or when the
/// entity itself has no usable coordinate.
#[derive(Debug, Clone, PartialEq)]
pub struct Ranked<T> {
    pub entity: T,
    pub distance_km: Option<f64>,
    pub formatted_distance: Option<String>,
}

impl<T> Ranked<T> {
    fn unranked(entity: T) -> Self {
        Self {
            entity,
            distance_km: None,
            formatted_distance: None,
        }
    }

    fn sort_key(&self) -> f64 {
        self.distance_km.unwrap_or(f64::INFINITY)
    }
}

/// Order `entities` from nearest to farthest from `reference`.
///
/// Without a valid reference the input order is kept as is. Entities lacking
/// a valid coordinate sort as if infinitely far, after every located entity
/// and in their original relative order. The output always has the same
/// length as the input.
pub fn rank_by_proximity<T: Located>(reference: Option<Coordinate>, entities: Vec<T>) -> Vec<Ranked<T>> {
    let Some(reference) = reference.filter(Coordinate::is_valid) else {
        return entities.into_iter().map(Ranked::unranked).collect();
    };

    let mut ranked: Vec<Ranked<T>> = entities
        .into_iter()
        .map(|entity| {
            let distance = entity
                .coordinate()
                .filter(Coordinate::is_valid)
                .map(|position| distance_km(reference, position));

            Ranked {
                entity,
                distance_km: distance,
                formatted_distance: distance.map(format_distance),
            }
        })
        .collect();

    // sort_by is stable: equal distances keep input order
    ranked.sort_by(|a, b| a.sort_key().total_cmp(&b.sort_key()));
    ranked
}
