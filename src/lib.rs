//! # Mobility Metrics
//!
//! Mobility trace analysis for human and vehicle movement data.
//!
//! This library provides:
//! - Stay-location and geo-location discovery per node
//! - Stay-location centers (centroid + bounding box)
//! - Home-location detection by cumulative dwell time
//! - Pairwise contact detection per timestamp snapshot
//! - Spatial, temporal and social metrics (travel distance, radius of
//!   gyration, visit order, visit time, travel time, intercontact time,
//!   contact duration)
//! - Parallel processing for batch operations
//!
//! ## Features
//!
//! - **`parallel`** - Enable parallel processing with rayon (default)
//! - **`synthetic`** - Seeded synthetic trace generator for tests and benches
//! - **`cli`** - Build the `mobmetrics-cli` binary
//!
//! ## Quick Start
//!
//! ```rust
//! use mobmetrics::{find_locations, find_homes, DistanceType, LocationConfig, Trace, TracePoint};
//!
//! let trace = Trace::new(vec![
//!     TracePoint::new(1, 0.0, 0.0, 0.0),
//!     TracePoint::new(1, 900.0, 0.1, 0.1),
//!     TracePoint::new(1, 1800.0, 5.0, 5.0),
//! ]);
//!
//! let config = LocationConfig {
//!     max_distance: 1.0,
//!     pause_threshold: 10.0,
//!     dist_type: DistanceType::Euclidean,
//! };
//!
//! let locations = find_locations(&trace, &config).unwrap();
//! assert_eq!(locations.trace_loc[0].sl, 0);
//! assert_eq!(locations.trace_loc[2].sl, 1);
//!
//! let homes = find_homes(&locations.trace_loc);
//! assert_eq!(homes[0].home_location, 0);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// Unified error handling
pub mod error;
pub use error::{MobilityError, OptionExt, Result};

// Distance primitives (euclidean, haversine)
pub mod geo_utils;
pub use geo_utils::{euclidean, haversine};

// Stay-location / geo-location discovery and centers
pub mod locations;
pub use locations::{
    find_locations, find_locations_multi, geo_locations, stay_location_centers, stay_locations,
};

// Home-location detection
pub mod homes;
pub use homes::{find_homes, find_homes_multi};

// Pairwise contact detection
pub mod contacts;
pub use contacts::detect_contacts;

// Metric extractors and factory
pub mod metrics;
pub use metrics::{build_metric, extract_multi, Metric, MetricInputs, MetricKind, MetricTable};

// Histogram binning helpers for metric consumers
pub mod stats;

// Trace table input and metric table output
pub mod io;

// Synthetic mobility traces for tests and benchmarks
#[cfg(feature = "synthetic")]
pub mod synthetic;

// ============================================================================
// Core Types
// ============================================================================

/// A single trace record: node, time, position.
///
/// For haversine analysis `x` is the longitude and `y` the latitude, both in
/// degrees.
///
/// # Example
/// ```
/// use mobmetrics::TracePoint;
/// let point = TracePoint::new(7, 120.0, -0.1278, 51.5074);
/// assert!(point.is_valid());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TracePoint {
    pub id: i64,
    /// Seconds since trace start
    pub timestamp: f64,
    pub x: f64,
    pub y: f64,
}

impl TracePoint {
    pub fn new(id: i64, timestamp: f64, x: f64, y: f64) -> Self {
        Self { id, timestamp, x, y }
    }

    /// Check that time and coordinates are finite.
    pub fn is_valid(&self) -> bool {
        self.timestamp.is_finite() && self.x.is_finite() && self.y.is_finite()
    }
}

/// A full trace: points of every node, grouped by node id.
///
/// Sequential extractors expect the points sorted by `(id, timestamp)`;
/// [`Trace::sort`] establishes that order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    pub points: Vec<TracePoint>,
}

impl Trace {
    pub fn new(points: Vec<TracePoint>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Distinct node ids in ascending order.
    pub fn node_ids(&self) -> Vec<i64> {
        let mut ids: Vec<i64> = self.points.iter().map(|p| p.id).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    /// All points of one node, in trace order.
    pub fn node_points(&self, id: i64) -> Vec<TracePoint> {
        self.points.iter().filter(|p| p.id == id).copied().collect()
    }

    /// Split the trace into per-node point sequences, ordered by node id.
    ///
    /// Each sequence is time-ordered. The sort is stable, so points sharing a
    /// timestamp keep their trace order.
    pub fn group_by_node(&self) -> Vec<(i64, Vec<TracePoint>)> {
        let mut groups: Vec<(i64, Vec<TracePoint>)> = Vec::new();
        let mut index: std::collections::HashMap<i64, usize> = std::collections::HashMap::new();

        for point in &self.points {
            match index.get(&point.id) {
                Some(&i) => groups[i].1.push(*point),
                None => {
                    index.insert(point.id, groups.len());
                    groups.push((point.id, vec![*point]));
                }
            }
        }

        for (_, points) in &mut groups {
            points.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));
        }

        groups.sort_by_key(|(id, _)| *id);
        groups
    }

    /// Stable sort by `(id, timestamp)`.
    pub fn sort(&mut self) {
        self.points
            .sort_by(|a, b| a.id.cmp(&b.id).then(a.timestamp.total_cmp(&b.timestamp)));
    }

    /// Whether the points are already ordered by `(id, timestamp)`.
    pub fn is_ordered(&self) -> bool {
        self.points.windows(2).all(|w| {
            w[0].id < w[1].id || (w[0].id == w[1].id && w[0].timestamp <= w[1].timestamp)
        })
    }

    /// Shift all timestamps so the earliest one becomes zero.
    pub fn normalize_timestamps(&mut self) {
        let first = self
            .points
            .iter()
            .map(|p| p.timestamp)
            .fold(f64::INFINITY, f64::min);
        if !first.is_finite() {
            return;
        }
        for point in &mut self.points {
            point.timestamp -= first;
        }
    }
}

impl From<Vec<TracePoint>> for Trace {
    fn from(points: Vec<TracePoint>) -> Self {
        Self::new(points)
    }
}

/// Distance formula used for clustering, contacts and travel distances.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceType {
    /// Planar distance in trace units
    Euclidean,
    /// Great-circle distance in meters over (x = longitude, y = latitude) degrees
    #[default]
    Haversine,
}

impl DistanceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DistanceType::Euclidean => "euclidean",
            DistanceType::Haversine => "haversine",
        }
    }

    /// Distance between two positions given as `(x, y)`.
    pub fn between(&self, x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
        match self {
            DistanceType::Euclidean => euclidean((x1, y1), (x2, y2)),
            DistanceType::Haversine => haversine(y1, x1, y2, x2),
        }
    }

    /// Distance between two trace points.
    pub fn distance(&self, a: &TracePoint, b: &TracePoint) -> f64 {
        self.between(a.x, a.y, b.x, b.y)
    }
}

impl fmt::Display for DistanceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DistanceType {
    type Err = MobilityError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "euclidean" => Ok(DistanceType::Euclidean),
            "haversine" => Ok(DistanceType::Haversine),
            _ => Err(MobilityError::UnsupportedDistanceType(s.to_string())),
        }
    }
}

/// A trace point labelled with its stay-location and geo-location flag.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocatedPoint {
    pub id: i64,
    pub timestamp: f64,
    pub x: f64,
    pub y: f64,
    /// Stay-location label, local to the node, starting at 0
    pub sl: u32,
    /// Whether the stay-location lasted longer than the pause threshold
    pub gl: bool,
}

impl LocatedPoint {
    pub fn point(&self) -> TracePoint {
        TracePoint::new(self.id, self.timestamp, self.x, self.y)
    }
}

/// Centroid and bounding box of one geo-location.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StayLocationCenter {
    pub id: i64,
    pub sl: u32,
    pub x: f64,
    pub y: f64,
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

/// Output of location discovery over a whole trace.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationResult {
    /// Every trace point with `sl` and `gl` columns
    pub trace_loc: Vec<LocatedPoint>,
    /// One center per (id, sl) geo-location
    pub sl_centers: Vec<StayLocationCenter>,
}

impl LocationResult {
    /// Only the rows that belong to geo-locations.
    pub fn geo_rows(&self) -> Vec<LocatedPoint> {
        self.trace_loc.iter().filter(|p| p.gl).copied().collect()
    }
}

/// The location where a node spent its longest stay.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HomeLocation {
    pub id: i64,
    /// Stay-location label of the home
    pub home_location: u32,
    pub x: f64,
    pub y: f64,
    /// Dwell time of the winning run in seconds
    pub dwell_time: f64,
}

/// Two distinct nodes within the contact radius at the same timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub id1: i64,
    pub id2: i64,
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub timestamp: f64,
}

impl Contact {
    /// Unordered pair key `(min id, max id)`.
    pub fn pair(&self) -> (i64, i64) {
        if self.id1 <= self.id2 {
            (self.id1, self.id2)
        } else {
            (self.id2, self.id1)
        }
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// Configuration for stay-location and geo-location discovery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    /// Maximum distance from the cluster anchor for a point to join the
    /// current stay-location. Units follow `dist_type` (meters for haversine).
    /// Default: 50.0
    pub max_distance: f64,

    /// Minimum stay duration, in minutes, for a stay-location to count as a
    /// geo-location. Default: 10.0
    pub pause_threshold: f64,

    /// Distance formula. Default: haversine
    pub dist_type: DistanceType,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            max_distance: 50.0,
            pause_threshold: 10.0,
            dist_type: DistanceType::Haversine,
        }
    }
}

impl LocationConfig {
    pub fn validate(&self) -> Result<()> {
        check_parameter("max_distance", self.max_distance)?;
        check_parameter("pause_threshold", self.pause_threshold)
    }

    /// Pause threshold converted to seconds.
    pub fn pause_threshold_secs(&self) -> f64 {
        60.0 * self.pause_threshold
    }
}

/// Configuration for contact detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactConfig {
    /// Contact radius. Distances equal to the radius count as contacts.
    /// Default: 10.0
    pub radius: f64,

    /// Distance formula. Default: haversine
    pub dist_type: DistanceType,

    /// Snapshots with at least this many points use the R-tree candidate
    /// search instead of the exhaustive pair scan. Default: 32
    pub index_min_points: usize,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            radius: 10.0,
            dist_type: DistanceType::Haversine,
            index_min_points: 32,
        }
    }
}

impl ContactConfig {
    pub fn validate(&self) -> Result<()> {
        check_parameter("radius", self.radius)
    }
}

/// Combined configuration, loadable from a JSON file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub locations: LocationConfig,
    pub contacts: ContactConfig,
}

impl AnalysisConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: AnalysisConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.locations.validate()?;
        self.contacts.validate()
    }
}

fn check_parameter(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(MobilityError::InvalidParameter {
            name: name.to_string(),
            value,
        })
    }
}
