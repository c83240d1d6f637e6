//! Stay-location and geo-location discovery.
//!
//! ## Algorithm
//! 1. Per node, scan the time-ordered points keeping an anchor point. A point
//!    closer than `max_distance` to the anchor joins the current stay-location;
//!    otherwise it opens a new stay-location and becomes the new anchor.
//! 2. A stay-location whose time span exceeds the pause threshold is a
//!    geo-location.
//! 3. Every geo-location gets a center: mean position plus bounding box.
//!
//! Nodes are independent, so with the `parallel` feature each node is
//! processed on the rayon pool and the results are concatenated in node order.

use std::collections::BTreeMap;
use std::time::Instant;

use log::{debug, info};
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::{
    DistanceType, LocatedPoint, LocationConfig, LocationResult, Result, StayLocationCenter, Trace,
    TracePoint,
};

/// Label the stay-locations of one node.
///
/// `points` must belong to a single node and be ordered by timestamp. Labels
/// start at 0 and increase by one for every new stay-location, so they are
/// non-decreasing in time. A point exactly `max_distance` away from the
/// anchor starts a new stay-location.
///
/// The returned rows have `gl = false`; see [`geo_locations`].
pub fn stay_locations(
    points: &[TracePoint],
    max_distance: f64,
    dist_type: DistanceType,
) -> Vec<LocatedPoint> {
    let mut located = Vec::with_capacity(points.len());
    let Some(first) = points.first() else {
        return located;
    };

    let mut anchor = first;
    let mut label: u32 = 0;
    located.push(label_point(first, label));

    for point in &points[1..] {
        // Strict: NaN distances and exact ties both open a new stay-location
        if !(dist_type.distance(anchor, point) < max_distance) {
            label += 1;
            anchor = point;
        }
        located.push(label_point(point, label));
    }

    located
}

fn label_point(point: &TracePoint, sl: u32) -> LocatedPoint {
    LocatedPoint {
        id: point.id,
        timestamp: point.timestamp,
        x: point.x,
        y: point.y,
        sl,
        gl: false,
    }
}

/// Flag the stay-locations that last longer than `pause_threshold` minutes.
///
/// Groups are keyed by `(id, sl)`; a group is a geo-location iff
/// `max(timestamp) - min(timestamp) > 60 * pause_threshold`. An exact tie is
/// not a geo-location.
pub fn geo_locations(mut located: Vec<LocatedPoint>, pause_threshold: f64) -> Vec<LocatedPoint> {
    let threshold_secs = 60.0 * pause_threshold;

    let mut spans: BTreeMap<(i64, u32), (f64, f64)> = BTreeMap::new();
    for p in &located {
        spans
            .entry((p.id, p.sl))
            .and_modify(|(min, max)| {
                *min = min.min(p.timestamp);
                *max = max.max(p.timestamp);
            })
            .or_insert((p.timestamp, p.timestamp));
    }

    for p in &mut located {
        if let Some((min, max)) = spans.get(&(p.id, p.sl)) {
            p.gl = max - min > threshold_secs;
        }
    }

    located
}

/// Compute the center and bounding box of every geo-location.
///
/// Only rows with `gl = true` contribute; stay-locations that never became
/// geo-locations have no center. Output is ordered by `(id, sl)`.
pub fn stay_location_centers(trace_loc: &[LocatedPoint]) -> Vec<StayLocationCenter> {
    struct Accumulator {
        sum_x: f64,
        sum_y: f64,
        count: usize,
        min_x: f64,
        max_x: f64,
        min_y: f64,
        max_y: f64,
    }

    let mut groups: BTreeMap<(i64, u32), Accumulator> = BTreeMap::new();

    for p in trace_loc.iter().filter(|p| p.gl) {
        let acc = groups.entry((p.id, p.sl)).or_insert(Accumulator {
            sum_x: 0.0,
            sum_y: 0.0,
            count: 0,
            min_x: f64::MAX,
            max_x: f64::MIN,
            min_y: f64::MAX,
            max_y: f64::MIN,
        });
        acc.sum_x += p.x;
        acc.sum_y += p.y;
        acc.count += 1;
        acc.min_x = acc.min_x.min(p.x);
        acc.max_x = acc.max_x.max(p.x);
        acc.min_y = acc.min_y.min(p.y);
        acc.max_y = acc.max_y.max(p.y);
    }

    groups
        .into_iter()
        .map(|((id, sl), acc)| StayLocationCenter {
            id,
            sl,
            x: acc.sum_x / acc.count as f64,
            y: acc.sum_y / acc.count as f64,
            min_x: acc.min_x,
            max_x: acc.max_x,
            min_y: acc.min_y,
            max_y: acc.max_y,
        })
        .collect()
}

/// Run stay-location and geo-location discovery for a single node whose
/// points are already time-ordered.
fn locate_node(points: Vec<TracePoint>, config: &LocationConfig) -> Vec<LocatedPoint> {
    let located = stay_locations(&points, config.max_distance, config.dist_type);
    let located = geo_locations(located, config.pause_threshold);

    if let (Some(first), Some(last)) = (located.first(), located.last()) {
        debug!(
            "[Locations] Node {}: {} points, {} stay-locations",
            first.id,
            located.len(),
            last.sl + 1
        );
    }

    located
}

/// Find the stay-locations, geo-locations and geo-location centers of every
/// node of a trace.
///
/// Returns the located trace (all points, ordered by node id then time) and
/// the centers of all geo-locations.
pub fn find_locations(trace: &Trace, config: &LocationConfig) -> Result<LocationResult> {
    config.validate()?;

    let start = Instant::now();
    let nodes = trace.group_by_node();

    info!(
        "[Locations] Finding stay and geo locations for {} nodes \
         (max_distance={}, pause_threshold={}min, dist_type={})",
        nodes.len(),
        config.max_distance,
        config.pause_threshold,
        config.dist_type
    );

    #[cfg(feature = "parallel")]
    let per_node: Vec<Vec<LocatedPoint>> = nodes
        .into_par_iter()
        .map(|(_, points)| locate_node(points, config))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let per_node: Vec<Vec<LocatedPoint>> = nodes
        .into_iter()
        .map(|(_, points)| locate_node(points, config))
        .collect();

    let trace_loc: Vec<LocatedPoint> = per_node.into_iter().flatten().collect();
    let sl_centers = stay_location_centers(&trace_loc);

    info!(
        "[Locations] Found {} geo-locations over {} points in {}ms",
        sl_centers.len(),
        trace_loc.len(),
        start.elapsed().as_millis()
    );

    Ok(LocationResult {
        trace_loc,
        sl_centers,
    })
}

/// Find locations for several independent traces, each with its own
/// configuration. Results are returned in input order.
pub fn find_locations_multi(jobs: &[(&Trace, &LocationConfig)]) -> Result<Vec<LocationResult>> {
    info!("[Locations] Finding locations for {} traces", jobs.len());

    #[cfg(feature = "parallel")]
    let results: Result<Vec<LocationResult>> = jobs
        .par_iter()
        .map(|(trace, config)| find_locations(trace, config))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let results: Result<Vec<LocationResult>> = jobs
        .iter()
        .map(|(trace, config)| find_locations(trace, config))
        .collect();

    results
}
