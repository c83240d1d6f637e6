//! # Contact Detection
//!
//! Detects co-location events between distinct nodes.
//!
//! ## Algorithm
//! 1. Split the trace into snapshots, one per distinct timestamp, in order
//!    of first appearance
//! 2. Order each snapshot by node id
//! 3. Every unordered pair of points from different nodes within `radius`
//!    (inclusive) is a contact
//!
//! Small snapshots use the exhaustive O(k²) pair scan. Large snapshots query
//! an R-tree for candidates and confirm them with the exact distance, which
//! yields the same contacts in the same order.

mod rtree;

use std::collections::HashMap;
use std::time::Instant;

use log::{debug, info};
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::{Contact, ContactConfig, Result, Trace, TracePoint};

pub use rtree::{build_rtree, candidate_envelope, is_indexable, wrap_longitude, IndexedPoint};

/// Split a trace into per-timestamp snapshots.
///
/// Snapshots appear in order of first occurrence and each one is sorted by
/// node id (stable, so rows of the same node keep trace order). Rows with a
/// NaN timestamp belong to no snapshot.
pub fn snapshots(trace: &Trace) -> Vec<(f64, Vec<TracePoint>)> {
    let mut groups: Vec<(f64, Vec<TracePoint>)> = Vec::new();
    let mut index: HashMap<u64, usize> = HashMap::new();

    for point in trace.points.iter().filter(|p| !p.timestamp.is_nan()) {
        // +0.0 folds -0.0 into the same key
        let key = (point.timestamp + 0.0).to_bits();
        match index.get(&key) {
            Some(&i) => groups[i].1.push(*point),
            None => {
                index.insert(key, groups.len());
                groups.push((point.timestamp, vec![*point]));
            }
        }
    }

    for (_, points) in &mut groups {
        points.sort_by_key(|p| p.id);
    }

    groups
}

fn make_contact(a: &TracePoint, b: &TracePoint, timestamp: f64) -> Contact {
    Contact {
        id1: a.id,
        id2: b.id,
        x1: a.x,
        y1: a.y,
        x2: b.x,
        y2: b.y,
        timestamp,
    }
}

/// Exhaustive pair scan over one snapshot.
pub fn exhaustive_contacts(
    points: &[TracePoint],
    timestamp: f64,
    config: &ContactConfig,
) -> Vec<Contact> {
    let mut contacts = Vec::new();

    for (i, a) in points.iter().enumerate() {
        for b in &points[i + 1..] {
            if a.id != b.id && config.dist_type.distance(a, b) <= config.radius {
                contacts.push(make_contact(a, b, timestamp));
            }
        }
    }

    contacts
}

/// R-tree candidate search over one snapshot. Snapshots the index cannot
/// cover fall back to the exhaustive scan.
pub fn indexed_contacts(
    points: &[TracePoint],
    timestamp: f64,
    config: &ContactConfig,
) -> Vec<Contact> {
    if !is_indexable(points, config.dist_type) {
        debug!(
            "[Contacts] Snapshot at {} has latitudes outside [-90, 90], scanning exhaustively",
            timestamp
        );
        return exhaustive_contacts(points, timestamp, config);
    }

    let tree = build_rtree(points, config.dist_type);
    let mut contacts = Vec::new();
    let mut candidates: Vec<usize> = Vec::new();

    for (i, a) in points.iter().enumerate() {
        if !(a.x.is_finite() && a.y.is_finite()) {
            continue;
        }

        let envelope = candidate_envelope(a, config.radius, config.dist_type);
        candidates.clear();
        candidates.extend(
            tree.locate_in_envelope_intersecting(&envelope)
                .map(|c| c.idx)
                .filter(|&j| j > i),
        );
        candidates.sort_unstable();

        for &j in &candidates {
            let b = &points[j];
            if a.id != b.id && config.dist_type.distance(a, b) <= config.radius {
                contacts.push(make_contact(a, b, timestamp));
            }
        }
    }

    contacts
}

fn snapshot_contacts(
    points: &[TracePoint],
    timestamp: f64,
    config: &ContactConfig,
) -> Vec<Contact> {
    if points.len() < config.index_min_points {
        exhaustive_contacts(points, timestamp, config)
    } else {
        indexed_contacts(points, timestamp, config)
    }
}

/// Detect contacts between every pair of distinct nodes of a trace.
///
/// Each unordered pair is reported once per shared timestamp, with
/// `id1 < id2`. Contacts are ordered by snapshot (first appearance of the
/// timestamp) and then by pair position inside the snapshot.
pub fn detect_contacts(trace: &Trace, config: &ContactConfig) -> Result<Vec<Contact>> {
    config.validate()?;

    let start = Instant::now();
    let snapshots = snapshots(trace);

    info!(
        "[Contacts] Detecting contacts over {} timestamps (radius={}, dist_type={})",
        snapshots.len(),
        config.radius,
        config.dist_type
    );

    #[cfg(feature = "parallel")]
    let per_snapshot: Vec<Vec<Contact>> = snapshots
        .par_iter()
        .map(|(t, points)| snapshot_contacts(points, *t, config))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let per_snapshot: Vec<Vec<Contact>> = snapshots
        .iter()
        .map(|(t, points)| snapshot_contacts(points, *t, config))
        .collect();

    let indexed = snapshots
        .iter()
        .filter(|(_, p)| p.len() >= config.index_min_points)
        .count();
    debug!("[Contacts] {} snapshots used the R-tree index", indexed);

    let contacts: Vec<Contact> = per_snapshot.into_iter().flatten().collect();

    info!(
        "[Contacts] Found {} contacts in {}ms",
        contacts.len(),
        start.elapsed().as_millis()
    );

    Ok(contacts)
}
