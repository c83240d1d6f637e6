//! Home-location detection.
//!
//! A node's home is the stay-location run with the longest dwell time. The
//! dwell time of a run is the sum of timestamp deltas between consecutive
//! points that share the same `sl`. Ties keep the earliest run.

use std::time::Instant;

use log::{debug, info};
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::{HomeLocation, LocatedPoint};

/// Scan state for a single node.
struct HomeScan {
    prev: LocatedPoint,
    current_home: LocatedPoint,
    stay_time: f64,
    longer_stay_time: f64,
}

impl HomeScan {
    fn start(first: LocatedPoint) -> Self {
        Self {
            prev: first,
            current_home: first,
            stay_time: 0.0,
            longer_stay_time: 0.0,
        }
    }

    fn step(&mut self, curr: LocatedPoint) {
        if curr.sl == self.prev.sl {
            self.stay_time += curr.timestamp - self.prev.timestamp;
        } else {
            self.close_run();
        }
        self.prev = curr;
    }

    /// Compare the run ending at `prev` against the best so far.
    fn close_run(&mut self) {
        if self.stay_time > self.longer_stay_time {
            self.longer_stay_time = self.stay_time;
            self.current_home = self.prev;
        }
        self.stay_time = 0.0;
    }

    fn finish(mut self) -> HomeLocation {
        // The final run has no successor to trigger the comparison
        self.close_run();
        HomeLocation {
            id: self.prev.id,
            home_location: self.current_home.sl,
            x: self.current_home.x,
            y: self.current_home.y,
            dwell_time: self.longer_stay_time,
        }
    }
}

/// Find the home location of every node of a located trace.
///
/// `trace_loc` must be ordered by `(id, timestamp)`, as produced by
/// [`crate::find_locations`]. The home position is the last point of the
/// winning run. A node with a single point is its own home with zero dwell
/// time.
pub fn find_homes(trace_loc: &[LocatedPoint]) -> Vec<HomeLocation> {
    let start = Instant::now();
    let mut homes = Vec::new();

    let mut rows = trace_loc.iter().copied();
    let Some(first) = rows.next() else {
        return homes;
    };

    let mut scan = HomeScan::start(first);
    for row in rows {
        if row.id == scan.prev.id {
            scan.step(row);
        } else {
            let home = scan.finish();
            debug!(
                "[Homes] Node {}: home sl={} ({:.0}s)",
                home.id, home.home_location, home.dwell_time
            );
            homes.push(home);
            scan = HomeScan::start(row);
        }
    }
    homes.push(scan.finish());

    info!(
        "[Homes] Found {} home locations in {}ms",
        homes.len(),
        start.elapsed().as_millis()
    );

    homes
}

/// Find home locations for several located traces. Results are returned in
/// input order.
pub fn find_homes_multi(traces_loc: &[&[LocatedPoint]]) -> Vec<Vec<HomeLocation>> {
    info!("[Homes] Finding home locations for {} traces", traces_loc.len());

    #[cfg(feature = "parallel")]
    let homes: Vec<Vec<HomeLocation>> = traces_loc.par_iter().map(|t| find_homes(t)).collect();

    #[cfg(not(feature = "parallel"))]
    let homes: Vec<Vec<HomeLocation>> = traces_loc.iter().map(|t| find_homes(t)).collect();

    homes
}
