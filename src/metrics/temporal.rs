//! Temporal metrics: travel time and visit time.

use serde::{Deserialize, Serialize};

use super::{geo_rows, Metric, MetricKind, MetricTable};
use crate::io::TableRecord;
use crate::LocatedPoint;

// ============================================================================
// Travel Time (TRVT)
// ============================================================================

/// Time spent travelling between two consecutive geo-locations of a node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TravelTimeRecord {
    pub id: i64,
    pub init_sl: u32,
    pub final_sl: u32,
    /// Last timestamp seen in the initial geo-location
    pub t_exit: f64,
    /// First timestamp seen in the final geo-location
    pub t_arrival: f64,
    pub travel_time: f64,
}

impl TableRecord for TravelTimeRecord {
    const COLUMNS: &'static [&'static str] =
        &["id", "init_sl", "final_sl", "t_exit", "t_arrival", "travel_time"];

    fn row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.init_sl.to_string(),
            self.final_sl.to_string(),
            self.t_exit.to_string(),
            self.t_arrival.to_string(),
            self.travel_time.to_string(),
        ]
    }
}

pub fn travel_time(trace_loc: &[LocatedPoint]) -> Vec<TravelTimeRecord> {
    geo_rows(trace_loc)
        .windows(2)
        .filter(|w| w[0].id == w[1].id && w[0].sl != w[1].sl)
        .map(|w| TravelTimeRecord {
            id: w[1].id,
            init_sl: w[0].sl,
            final_sl: w[1].sl,
            t_exit: w[0].timestamp,
            t_arrival: w[1].timestamp,
            travel_time: w[1].timestamp - w[0].timestamp,
        })
        .collect()
}

pub struct TravelTime<'a> {
    trace_loc: &'a [LocatedPoint],
}

impl<'a> TravelTime<'a> {
    pub fn new(trace_loc: &'a [LocatedPoint]) -> Self {
        Self { trace_loc }
    }
}

impl Metric for TravelTime<'_> {
    fn kind(&self) -> MetricKind {
        MetricKind::TravelTime
    }

    fn extract(&self) -> MetricTable {
        MetricTable::TravelTime(travel_time(self.trace_loc))
    }
}

// ============================================================================
// Visit Time (VIST)
// ============================================================================

/// Time a node spent inside one geo-location.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VisitTimeRecord {
    pub id: i64,
    pub sl: u32,
    /// Arrival at the geo-location
    pub timestamp: f64,
    /// Last timestamp seen in the geo-location
    pub departure: f64,
    pub visit_time: f64,
}

impl TableRecord for VisitTimeRecord {
    const COLUMNS: &'static [&'static str] = &["id", "sl", "timestamp", "departure", "visit_time"];

    fn row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.sl.to_string(),
            self.timestamp.to_string(),
            self.departure.to_string(),
            self.visit_time.to_string(),
        ]
    }
}

/// One record per visit: `departure - arrival`, where a visit ends when the
/// geo-location changes, the node changes, or the table ends.
pub fn visit_time(trace_loc: &[LocatedPoint]) -> Vec<VisitTimeRecord> {
    let rows = geo_rows(trace_loc);
    let mut records = Vec::new();

    let mut rows_iter = rows.iter();
    let Some(first) = rows_iter.next() else {
        return records;
    };

    let mut prev = first;
    let mut arrival = first.timestamp;

    let visit = |prev: &LocatedPoint, arrival: f64| VisitTimeRecord {
        id: prev.id,
        sl: prev.sl,
        timestamp: arrival,
        departure: prev.timestamp,
        visit_time: prev.timestamp - arrival,
    };

    for curr in rows_iter {
        if curr.id != prev.id || curr.sl != prev.sl {
            records.push(visit(prev, arrival));
            arrival = curr.timestamp;
        }
        prev = curr;
    }
    records.push(visit(prev, arrival));

    records
}

pub struct VisitTime<'a> {
    trace_loc: &'a [LocatedPoint],
}

impl<'a> VisitTime<'a> {
    pub fn new(trace_loc: &'a [LocatedPoint]) -> Self {
        Self { trace_loc }
    }
}

impl Metric for VisitTime<'_> {
    fn kind(&self) -> MetricKind {
        MetricKind::VisitTime
    }

    fn extract(&self) -> MetricTable {
        MetricTable::VisitTime(visit_time(self.trace_loc))
    }
}
