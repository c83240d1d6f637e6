//! Geographic utilities: distance primitives and degree conversions.

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Meters per degree of latitude (approximately constant).
pub const METERS_PER_DEG_LAT: f64 = 111_320.0;

/// Planar distance between two `(x, y)` positions.
pub fn euclidean(p1: (f64, f64), p2: (f64, f64)) -> f64 {
    let dx = p2.0 - p1.0;
    let dy = p2.1 - p1.1;
    (dx * dx + dy * dy).sqrt()
}

/// Great-circle distance in meters between two positions in degrees.
///
/// # Example
/// ```
/// use mobmetrics::geo_utils::haversine;
/// // London to Paris is roughly 343 km
/// let d = haversine(51.5074, -0.1278, 48.8566, 2.3522);
/// assert!((d - 343_500.0).abs() < 5_000.0);
/// ```
pub fn haversine(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1 = lat1.to_radians();
    let lat2 = lat2.to_radians();
    let dlat = lat2 - lat1;
    let dlon = (lon2 - lon1).to_radians();

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    // a can exceed 1 by rounding on antipodal points; NaN must pass through
    let a = if a > 1.0 { 1.0 } else { a };
    let c = 2.0 * a.sqrt().asin();

    EARTH_RADIUS_METERS * c
}

/// Convert a distance in meters to degrees of latitude.
pub fn meters_to_deg_lat(meters: f64) -> f64 {
    meters / METERS_PER_DEG_LAT
}

/// Convert a distance in meters to degrees of longitude at a given latitude.
///
/// Returns `None` near the poles where a longitude span is unbounded.
pub fn meters_to_deg_lng(meters: f64, latitude: f64) -> Option<f64> {
    let meters_per_deg_lng = METERS_PER_DEG_LAT * latitude.to_radians().cos();
    if meters_per_deg_lng.abs() < 1e-6 {
        return None;
    }
    Some(meters / meters_per_deg_lng)
}
