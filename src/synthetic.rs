//! Synthetic mobility trace generator for tests and benchmarking.
//!
//! Every node visits a sequence of stops. At each stop it is sampled at a
//! fixed interval with small position jitter, then jumps to the next stop
//! `travel_distance` meters away. All nodes share the same sampling clock,
//! so nodes near each other produce contacts.
//!
//! Coordinates are degrees (x = longitude, y = latitude), meant for
//! haversine analysis.
//!
//! Feature-gated behind `synthetic`, not included in production builds.
//!
//! # Example
//!
//! ```rust
//! use mobmetrics::synthetic::SyntheticScenario;
//! use mobmetrics::find_locations;
//!
//! let scenario = SyntheticScenario {
//!     node_count: 3,
//!     stops_per_node: 4,
//!     ..SyntheticScenario::default()
//! };
//!
//! let dataset = scenario.generate();
//! let result = find_locations(&dataset.trace, &scenario.location_config()).unwrap();
//! let stays = result.trace_loc.iter().filter(|p| p.id == 0).map(|p| p.sl).max();
//! assert_eq!(stays, Some(3));
//! ```

use std::f64::consts::PI;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::geo_utils::{meters_to_deg_lat, meters_to_deg_lng};
use crate::{DistanceType, LocationConfig, Trace, TracePoint};

// ============================================================================
// Types
// ============================================================================

/// Scenario configuration for generating synthetic traces.
#[derive(Debug, Clone)]
pub struct SyntheticScenario {
    /// Number of nodes, with ids `0..node_count`.
    pub node_count: usize,
    /// Stops visited by every node.
    pub stops_per_node: usize,
    /// Time spent at each stop in seconds.
    pub stop_duration_secs: f64,
    /// Sampling interval in seconds.
    pub sample_interval_secs: f64,
    /// Maximum distance of a sample from its stop center in meters.
    pub stop_spread: f64,
    /// Distance between consecutive stops of a node in meters.
    pub travel_distance: f64,
    /// Scenario origin as (longitude, latitude).
    pub origin: (f64, f64),
    /// RNG seed for deterministic reproduction.
    pub seed: u64,
}

impl Default for SyntheticScenario {
    fn default() -> Self {
        Self {
            node_count: 10,
            stops_per_node: 4,
            stop_duration_secs: 1800.0,
            sample_interval_secs: 60.0,
            stop_spread: 5.0,
            travel_distance: 500.0,
            origin: (8.55, 47.37),
            seed: 42,
        }
    }
}

/// Ground truth for one generated stop.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpectedStop {
    pub id: i64,
    /// Stay-location label location discovery should assign
    pub sl: u32,
    /// Stop center as (longitude, latitude)
    pub center: (f64, f64),
    pub arrival: f64,
    pub departure: f64,
}

impl ExpectedStop {
    pub fn duration(&self) -> f64 {
        self.departure - self.arrival
    }
}

/// A generated trace with its ground truth.
pub struct SyntheticDataset {
    /// Points sorted by `(id, timestamp)`.
    pub trace: Trace,
    /// Every stop of every node, in visiting order.
    pub expected_stops: Vec<ExpectedStop>,
}

impl SyntheticDataset {
    /// Number of stops generated for one node.
    pub fn stop_count(&self, id: i64) -> usize {
        self.expected_stops.iter().filter(|s| s.id == id).count()
    }
}

// ============================================================================
// Generation
// ============================================================================

fn offset(origin: (f64, f64), meters: f64, heading: f64) -> (f64, f64) {
    let (lng, lat) = origin;
    let new_lat = lat + meters_to_deg_lat(meters * heading.sin());
    let dlng = meters_to_deg_lng(meters * heading.cos(), lat).unwrap_or(0.0);
    (lng + dlng, new_lat)
}

impl SyntheticScenario {
    /// Samples taken at each stop.
    pub fn samples_per_stop(&self) -> usize {
        if self.sample_interval_secs <= 0.0 {
            return 1;
        }
        (self.stop_duration_secs / self.sample_interval_secs).round() as usize + 1
    }

    /// Location settings that recover exactly one stay-location per stop,
    /// each of them a geo-location.
    pub fn location_config(&self) -> LocationConfig {
        LocationConfig {
            max_distance: self.travel_distance / 2.0,
            pause_threshold: self.stop_duration_secs / 60.0 / 2.0,
            dist_type: DistanceType::Haversine,
        }
    }

    pub fn generate(&self) -> SyntheticDataset {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let samples = self.samples_per_stop();

        let mut points = Vec::with_capacity(self.node_count * self.stops_per_node * samples);
        let mut expected_stops = Vec::with_capacity(self.node_count * self.stops_per_node);

        for node in 0..self.node_count {
            let id = node as i64;
            let mut t = 0.0;

            // First stop lands within travel_distance of the origin
            let start_radius = rng.gen_range(0.0..=self.travel_distance);
            let mut center = offset(self.origin, start_radius, rng.gen_range(0.0..2.0 * PI));

            for stop in 0..self.stops_per_node {
                if stop > 0 {
                    center = offset(center, self.travel_distance, rng.gen_range(0.0..2.0 * PI));
                }

                let arrival = t;
                for _ in 0..samples {
                    let jitter = rng.gen_range(0.0..=self.stop_spread);
                    let (x, y) = offset(center, jitter, rng.gen_range(0.0..2.0 * PI));
                    points.push(TracePoint::new(id, t, x, y));
                    t += self.sample_interval_secs;
                }

                expected_stops.push(ExpectedStop {
                    id,
                    sl: stop as u32,
                    center,
                    arrival,
                    departure: t - self.sample_interval_secs,
                });
            }
        }

        SyntheticDataset {
            trace: Trace::new(points),
            expected_stops,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::haversine;

    fn small() -> SyntheticScenario {
        SyntheticScenario {
            node_count: 4,
            stops_per_node: 3,
            stop_duration_secs: 600.0,
            sample_interval_secs: 60.0,
            ..SyntheticScenario::default()
        }
    }

    #[test]
    fn test_generate_is_deterministic() {
        let a = small().generate();
        let b = small().generate();
        assert_eq!(a.trace, b.trace);
        assert_eq!(a.expected_stops, b.expected_stops);
    }

    #[test]
    fn test_point_counts() {
        let scenario = small();
        let dataset = scenario.generate();
        assert_eq!(scenario.samples_per_stop(), 11);
        assert_eq!(dataset.trace.len(), 4 * 3 * 11);
        assert_eq!(dataset.stop_count(0), 3);
        assert!(dataset.trace.is_ordered());
    }

    #[test]
    fn test_samples_stay_near_center() {
        let scenario = small();
        let dataset = scenario.generate();

        for stop in &dataset.expected_stops {
            for p in dataset.trace.points.iter().filter(|p| {
                p.id == stop.id && p.timestamp >= stop.arrival && p.timestamp <= stop.departure
            }) {
                let d = haversine(p.y, p.x, stop.center.1, stop.center.0);
                assert!(d <= scenario.stop_spread * 1.05, "sample {}m from center", d);
            }
        }
    }

    #[test]
    fn test_stop_duration() {
        let dataset = small().generate();
        for stop in &dataset.expected_stops {
            assert_eq!(stop.duration(), 600.0);
        }
    }
}
