//! Spatial metrics: travel distance, radius of gyration, visit order.

use std::borrow::Cow;
use std::collections::{HashMap, HashSet};

use log::debug;
use serde::{Deserialize, Serialize};

use super::{geo_rows, Metric, MetricKind, MetricTable};
use crate::io::TableRecord;
use crate::{DistanceType, HomeLocation, LocatedPoint, Trace};

// ============================================================================
// Travel Distance (TRVD)
// ============================================================================

/// Distance covered between two consecutive geo-locations of a node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TravelDistanceRecord {
    pub id: i64,
    pub travel_distance: f64,
    pub init_sl: u32,
    pub final_sl: u32,
    /// Last position in the initial geo-location
    pub ix: f64,
    pub iy: f64,
    /// First position in the final geo-location
    pub fx: f64,
    pub fy: f64,
}

impl TableRecord for TravelDistanceRecord {
    const COLUMNS: &'static [&'static str] =
        &["id", "travel_distance", "init_sl", "final_sl", "ix", "iy", "fx", "fy"];

    fn row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.travel_distance.to_string(),
            self.init_sl.to_string(),
            self.final_sl.to_string(),
            self.ix.to_string(),
            self.iy.to_string(),
            self.fx.to_string(),
            self.fy.to_string(),
        ]
    }
}

/// Emit one record for every geo-location change within a node.
pub fn travel_distance(
    trace_loc: &[LocatedPoint],
    dist_type: DistanceType,
) -> Vec<TravelDistanceRecord> {
    geo_rows(trace_loc)
        .windows(2)
        .filter(|w| w[0].id == w[1].id && w[0].sl != w[1].sl)
        .map(|w| {
            let (prev, curr) = (&w[0], &w[1]);
            TravelDistanceRecord {
                id: curr.id,
                travel_distance: dist_type.between(prev.x, prev.y, curr.x, curr.y),
                init_sl: prev.sl,
                final_sl: curr.sl,
                ix: prev.x,
                iy: prev.y,
                fx: curr.x,
                fy: curr.y,
            }
        })
        .collect()
}

pub struct TravelDistance<'a> {
    trace_loc: &'a [LocatedPoint],
    dist_type: DistanceType,
}

impl<'a> TravelDistance<'a> {
    pub fn new(trace_loc: &'a [LocatedPoint], dist_type: DistanceType) -> Self {
        Self {
            trace_loc,
            dist_type,
        }
    }
}

impl Metric for TravelDistance<'_> {
    fn kind(&self) -> MetricKind {
        MetricKind::TravelDistance
    }

    fn extract(&self) -> MetricTable {
        MetricTable::TravelDistance(travel_distance(self.trace_loc, self.dist_type))
    }
}

// ============================================================================
// Radius of Gyration (RADG)
// ============================================================================

/// Root-mean-square distance of a node's points to its home location.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RadiusOfGyrationRecord {
    pub id: i64,
    pub home_location: u32,
    pub radius_of_gyration: f64,
}

impl TableRecord for RadiusOfGyrationRecord {
    const COLUMNS: &'static [&'static str] = &["id", "home_location", "radius_of_gyration"];

    fn row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.home_location.to_string(),
            self.radius_of_gyration.to_string(),
        ]
    }
}

/// Radius of gyration of every node, centered on its home location:
/// `sqrt(mean(distance(point, home)²))` over all of the node's trace points.
///
/// The center is the home, not the center of mass. Nodes without a home
/// record are skipped.
pub fn radius_of_gyration(
    trace: &Trace,
    homes: &[HomeLocation],
    dist_type: DistanceType,
) -> Vec<RadiusOfGyrationRecord> {
    let home_by_id: HashMap<i64, &HomeLocation> = homes.iter().map(|h| (h.id, h)).collect();

    trace
        .group_by_node()
        .into_iter()
        .filter_map(|(id, points)| {
            let Some(home) = home_by_id.get(&id) else {
                debug!("[Metrics] Node {} has no home location, skipping RADG", id);
                return None;
            };

            let total: f64 = points
                .iter()
                .map(|p| dist_type.between(p.x, p.y, home.x, home.y).powi(2))
                .sum();

            Some(RadiusOfGyrationRecord {
                id,
                home_location: home.home_location,
                radius_of_gyration: (total / points.len() as f64).sqrt(),
            })
        })
        .collect()
}

pub struct RadiusOfGyration<'a> {
    trace: &'a Trace,
    homes: Cow<'a, [HomeLocation]>,
    dist_type: DistanceType,
}

impl<'a> RadiusOfGyration<'a> {
    pub fn new(trace: &'a Trace, homes: Cow<'a, [HomeLocation]>, dist_type: DistanceType) -> Self {
        Self {
            trace,
            homes,
            dist_type,
        }
    }
}

impl Metric for RadiusOfGyration<'_> {
    fn kind(&self) -> MetricKind {
        MetricKind::RadiusOfGyration
    }

    fn extract(&self) -> MetricTable {
        MetricTable::RadiusOfGyration(radius_of_gyration(self.trace, &self.homes, self.dist_type))
    }
}

// ============================================================================
// Visit Order (VISO)
// ============================================================================

/// Rank of a geo-location in the order a node visited them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VisitOrderRecord {
    pub id: i64,
    /// Time the node entered the geo-location
    pub timestamp: f64,
    pub x: f64,
    pub y: f64,
    pub sl: u32,
    pub visit_order: u32,
}

impl TableRecord for VisitOrderRecord {
    const COLUMNS: &'static [&'static str] = &["id", "timestamp", "x", "y", "sl", "visit_order"];

    fn row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.timestamp.to_string(),
            self.x.to_string(),
            self.y.to_string(),
            self.sl.to_string(),
            self.visit_order.to_string(),
        ]
    }
}

/// Number the geo-locations of each node in visiting order.
///
/// The first geo-location of every node gets order 1, and the counter
/// increments each time the node enters a different one. One record per
/// `(id, sl)`, taken from the entry row.
pub fn visit_order(trace_loc: &[LocatedPoint]) -> Vec<VisitOrderRecord> {
    let mut records: Vec<VisitOrderRecord> = Vec::new();
    let mut visited: HashSet<(i64, u32)> = HashSet::new();
    // (id, order) of the last geo-location entered
    let mut current: Option<(i64, u32)> = None;

    for row in geo_rows(trace_loc) {
        if !visited.insert((row.id, row.sl)) {
            continue;
        }

        let order = match current {
            Some((id, order)) if id == row.id => order + 1,
            _ => 1,
        };
        current = Some((row.id, order));

        records.push(VisitOrderRecord {
            id: row.id,
            timestamp: row.timestamp,
            x: row.x,
            y: row.y,
            sl: row.sl,
            visit_order: order,
        });
    }

    records
}

pub struct VisitOrder<'a> {
    trace_loc: &'a [LocatedPoint],
}

impl<'a> VisitOrder<'a> {
    pub fn new(trace_loc: &'a [LocatedPoint]) -> Self {
        Self { trace_loc }
    }
}

impl Metric for VisitOrder<'_> {
    fn kind(&self) -> MetricKind {
        MetricKind::VisitOrder
    }

    fn extract(&self) -> MetricTable {
        MetricTable::VisitOrder(visit_order(self.trace_loc))
    }
}
