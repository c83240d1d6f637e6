//! R-tree indexed snapshot points and contact candidate envelopes.

use std::f64::consts::FRAC_PI_2;

use rstar::{RTree, RTreeObject, AABB};

use crate::geo_utils::EARTH_RADIUS_METERS;
use crate::{DistanceType, TracePoint};

/// Relative padding applied to candidate envelopes so boundary points survive
/// floating point rounding; the exact distance check happens afterwards.
const ENVELOPE_PADDING: f64 = 1.01;

/// A snapshot point with its index for R-tree queries
#[derive(Debug, Clone, Copy)]
pub struct IndexedPoint {
    pub idx: usize,
    pub x: f64,
    pub y: f64,
}

impl RTreeObject for IndexedPoint {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.x, self.y])
    }
}

/// Longitude folded into `[-180, 180)`.
pub fn wrap_longitude(lng: f64) -> f64 {
    (lng + 180.0).rem_euclid(360.0) - 180.0
}

/// Position stored in and queried against the tree. Haversine longitudes are
/// wrapped so the same meridian always maps to the same coordinate.
fn index_position(p: &TracePoint, dist_type: DistanceType) -> (f64, f64) {
    match dist_type {
        DistanceType::Euclidean => (p.x, p.y),
        DistanceType::Haversine => (wrap_longitude(p.x), p.y),
    }
}

/// Whether envelope queries can find every contact among `points`.
/// Haversine latitudes outside `[-90, 90]` have no canonical position.
pub fn is_indexable(points: &[TracePoint], dist_type: DistanceType) -> bool {
    match dist_type {
        DistanceType::Euclidean => true,
        DistanceType::Haversine => points
            .iter()
            .filter(|p| p.x.is_finite() && p.y.is_finite())
            .all(|p| p.y.abs() <= 90.0),
    }
}

/// Build R-tree from snapshot points. Points with non-finite coordinates are
/// left out since they can never be within any radius.
pub fn build_rtree(points: &[TracePoint], dist_type: DistanceType) -> RTree<IndexedPoint> {
    let indexed: Vec<IndexedPoint> = points
        .iter()
        .enumerate()
        .filter(|(_, p)| p.x.is_finite() && p.y.is_finite())
        .map(|(i, p)| {
            let (x, y) = index_position(p, dist_type);
            IndexedPoint { idx: i, x, y }
        })
        .collect();
    RTree::bulk_load(indexed)
}

/// Bounding box guaranteed to contain every position within `radius` of `p`.
pub fn candidate_envelope(p: &TracePoint, radius: f64, dist_type: DistanceType) -> AABB<[f64; 2]> {
    match dist_type {
        DistanceType::Euclidean => {
            let r = radius * ENVELOPE_PADDING + f64::EPSILON;
            AABB::from_corners([p.x - r, p.y - r], [p.x + r, p.y + r])
        }
        DistanceType::Haversine => {
            let (lng, lat) = index_position(p, dist_type);
            haversine_envelope(lng, lat, radius)
        }
    }
}

/// Envelope in (longitude, latitude) degrees. Falls back to the full
/// longitude range when the circle reaches a pole or crosses the
/// antimeridian.
fn haversine_envelope(lng: f64, lat: f64, radius: f64) -> AABB<[f64; 2]> {
    let angular = radius / EARTH_RADIUS_METERS;
    let dlat = angular.to_degrees() * ENVELOPE_PADDING + f64::EPSILON;
    let full_lng = AABB::from_corners([f64::MIN, lat - dlat], [f64::MAX, lat + dlat]);

    let phi = lat.to_radians().abs();
    if !(phi < FRAC_PI_2) || angular >= FRAC_PI_2 - phi {
        return full_lng;
    }

    let dlng = (angular.sin() / phi.cos()).asin().to_degrees() * ENVELOPE_PADDING + f64::EPSILON;
    if lng - dlng < -180.0 || lng + dlng > 180.0 {
        return full_lng;
    }

    AABB::from_corners([lng - dlng, lat - dlat], [lng + dlng, lat + dlat])
}
