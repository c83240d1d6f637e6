//! Tests for geo_utils module

use mobmetrics::geo_utils::*;
use mobmetrics::DistanceType;

fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() < epsilon
}

#[test]
fn test_euclidean_known_value() {
    assert_eq!(euclidean((0.0, 0.0), (3.0, 4.0)), 5.0);
    assert_eq!(euclidean((1.5, -2.0), (1.5, -2.0)), 0.0);
}

#[test]
fn test_haversine_same_point() {
    assert_eq!(haversine(51.5074, -0.1278, 51.5074, -0.1278), 0.0);
}

#[test]
fn test_haversine_known_value() {
    // London to Paris is approximately 344 km
    let dist = haversine(51.5074, -0.1278, 48.8566, 2.3522);
    assert!(approx_eq(dist, 343_560.0, 5000.0)); // Within 5km
}

#[test]
fn test_haversine_is_symmetric() {
    let a = haversine(47.37, 8.55, 46.95, 7.45);
    let b = haversine(46.95, 7.45, 47.37, 8.55);
    assert!(approx_eq(a, b, 1e-6));
}

#[test]
fn test_haversine_one_degree_latitude() {
    // 2πR / 360 with R = 6371 km
    let dist = haversine(0.0, 0.0, 1.0, 0.0);
    assert!(approx_eq(dist, 111_194.9, 1.0));
}

#[test]
fn test_haversine_antipodal_points() {
    let dist = haversine(0.0, 0.0, 0.0, 180.0);
    assert!(approx_eq(dist, std::f64::consts::PI * EARTH_RADIUS_METERS, 1.0));
}

#[test]
fn test_non_finite_inputs_give_nan() {
    assert!(haversine(f64::NAN, 0.0, 0.0, 0.0).is_nan());
    assert!(haversine(0.0, f64::INFINITY, 0.0, 0.0).is_nan());
    assert!(euclidean((f64::NAN, 0.0), (0.0, 0.0)).is_nan());
}

#[test]
fn test_distance_type_swaps_axes_for_haversine() {
    // x = longitude, y = latitude
    let d = DistanceType::Haversine.between(-0.1278, 51.5074, 2.3522, 48.8566);
    assert!(approx_eq(d, haversine(51.5074, -0.1278, 48.8566, 2.3522), 1e-9));
}

#[test]
fn test_meters_to_degrees() {
    assert!(approx_eq(meters_to_deg_lat(METERS_PER_DEG_LAT), 1.0, 1e-12));

    let at_equator = meters_to_deg_lng(METERS_PER_DEG_LAT, 0.0);
    assert!(approx_eq(at_equator.unwrap_or_default(), 1.0, 1e-9));

    let at_60 = meters_to_deg_lng(METERS_PER_DEG_LAT, 60.0);
    assert!(approx_eq(at_60.unwrap_or_default(), 2.0, 1e-6));

    assert_eq!(meters_to_deg_lng(100.0, 90.0), None);
}
