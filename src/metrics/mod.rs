//! # Mobility Metrics
//!
//! Sequential-scan extractors over located traces and contact tables.
//!
//! | Tag    | Metric             | Inputs                    |
//! |--------|--------------------|---------------------------|
//! | `TRVD` | Travel Distance    | trace_loc                 |
//! | `RADG` | Radius of Gyration | trace, homes or trace_loc |
//! | `VISO` | Visit Order        | trace_loc                 |
//! | `VIST` | Visit Time         | trace_loc                 |
//! | `TRVT` | Travel Time        | trace_loc                 |
//! | `INCO` | Intercontact Time  | contacts                  |
//! | `CODU` | Contact Duration   | contacts                  |
//!
//! Location-based metrics only look at geo-location rows (`gl = true`).
//! All extractors are pure: inputs are borrowed and never modified.

pub mod social;
pub mod spatial;
pub mod temporal;

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use log::info;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::OptionExt;
use crate::io::{to_delimited, TableRecord};
use crate::{
    find_homes, Contact, DistanceType, HomeLocation, LocatedPoint, MobilityError, Result, Trace,
};

pub use social::{
    contact_duration, intercontact_time, ContactDuration, ContactDurationRecord,
    IntercontactRecord, IntercontactTime, EPISODE_GAP_SECS,
};
pub use spatial::{
    radius_of_gyration, travel_distance, visit_order, RadiusOfGyration, RadiusOfGyrationRecord,
    TravelDistance, TravelDistanceRecord, VisitOrder, VisitOrderRecord,
};
pub use temporal::{
    travel_time, visit_time, TravelTime, TravelTimeRecord, VisitTime, VisitTimeRecord,
};

/// Metric type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetricKind {
    #[serde(rename = "TRVD")]
    TravelDistance,
    #[serde(rename = "RADG")]
    RadiusOfGyration,
    #[serde(rename = "VISO")]
    VisitOrder,
    #[serde(rename = "VIST")]
    VisitTime,
    #[serde(rename = "TRVT")]
    TravelTime,
    #[serde(rename = "INCO")]
    IntercontactTime,
    #[serde(rename = "CODU")]
    ContactDuration,
}

impl MetricKind {
    pub const ALL: [MetricKind; 7] = [
        MetricKind::TravelDistance,
        MetricKind::RadiusOfGyration,
        MetricKind::VisitOrder,
        MetricKind::VisitTime,
        MetricKind::TravelTime,
        MetricKind::IntercontactTime,
        MetricKind::ContactDuration,
    ];

    /// Four-letter tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::TravelDistance => "TRVD",
            MetricKind::RadiusOfGyration => "RADG",
            MetricKind::VisitOrder => "VISO",
            MetricKind::VisitTime => "VIST",
            MetricKind::TravelTime => "TRVT",
            MetricKind::IntercontactTime => "INCO",
            MetricKind::ContactDuration => "CODU",
        }
    }

    /// Human readable name.
    pub fn name(&self) -> &'static str {
        match self {
            MetricKind::TravelDistance => "Travel Distance",
            MetricKind::RadiusOfGyration => "Radius of Gyration",
            MetricKind::VisitOrder => "Visit Order",
            MetricKind::VisitTime => "Visit Time",
            MetricKind::TravelTime => "Travel Time",
            MetricKind::IntercontactTime => "Intercontact Time",
            MetricKind::ContactDuration => "Contact Duration",
        }
    }

    /// Column holding the metric value, as read by histogram consumers.
    pub fn value_column(&self) -> &'static str {
        match self {
            MetricKind::TravelDistance => "travel_distance",
            MetricKind::RadiusOfGyration => "radius_of_gyration",
            MetricKind::VisitOrder => "visit_order",
            MetricKind::VisitTime => "visit_time",
            MetricKind::TravelTime => "travel_time",
            MetricKind::IntercontactTime => "intercontact_time",
            MetricKind::ContactDuration => "contact_duration",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricKind {
    type Err = MobilityError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let tag = s.trim().to_uppercase();
        MetricKind::ALL
            .into_iter()
            .find(|k| k.as_str() == tag)
            .ok_or_else(|| MobilityError::UnsupportedMetric(s.to_string()))
    }
}

/// Extracted metric records, tagged by metric type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "metric", content = "records")]
pub enum MetricTable {
    #[serde(rename = "TRVD")]
    TravelDistance(Vec<TravelDistanceRecord>),
    #[serde(rename = "RADG")]
    RadiusOfGyration(Vec<RadiusOfGyrationRecord>),
    #[serde(rename = "VISO")]
    VisitOrder(Vec<VisitOrderRecord>),
    #[serde(rename = "VIST")]
    VisitTime(Vec<VisitTimeRecord>),
    #[serde(rename = "TRVT")]
    TravelTime(Vec<TravelTimeRecord>),
    #[serde(rename = "INCO")]
    IntercontactTime(Vec<IntercontactRecord>),
    #[serde(rename = "CODU")]
    ContactDuration(Vec<ContactDurationRecord>),
}

impl MetricTable {
    pub fn kind(&self) -> MetricKind {
        match self {
            MetricTable::TravelDistance(_) => MetricKind::TravelDistance,
            MetricTable::RadiusOfGyration(_) => MetricKind::RadiusOfGyration,
            MetricTable::VisitOrder(_) => MetricKind::VisitOrder,
            MetricTable::VisitTime(_) => MetricKind::VisitTime,
            MetricTable::TravelTime(_) => MetricKind::TravelTime,
            MetricTable::IntercontactTime(_) => MetricKind::IntercontactTime,
            MetricTable::ContactDuration(_) => MetricKind::ContactDuration,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            MetricTable::TravelDistance(r) => r.len(),
            MetricTable::RadiusOfGyration(r) => r.len(),
            MetricTable::VisitOrder(r) => r.len(),
            MetricTable::VisitTime(r) => r.len(),
            MetricTable::TravelTime(r) => r.len(),
            MetricTable::IntercontactTime(r) => r.len(),
            MetricTable::ContactDuration(r) => r.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The value column (see [`MetricKind::value_column`]) as floats.
    pub fn values(&self) -> Vec<f64> {
        match self {
            MetricTable::TravelDistance(r) => r.iter().map(|r| r.travel_distance).collect(),
            MetricTable::RadiusOfGyration(r) => r.iter().map(|r| r.radius_of_gyration).collect(),
            MetricTable::VisitOrder(r) => r.iter().map(|r| r.visit_order as f64).collect(),
            MetricTable::VisitTime(r) => r.iter().map(|r| r.visit_time).collect(),
            MetricTable::TravelTime(r) => r.iter().map(|r| r.travel_time).collect(),
            MetricTable::IntercontactTime(r) => r.iter().map(|r| r.intercontact_time).collect(),
            MetricTable::ContactDuration(r) => r.iter().map(|r| r.contact_duration).collect(),
        }
    }

    /// Render as a delimited text table with a header row.
    pub fn to_delimited(&self, sep: char) -> String {
        match self {
            MetricTable::TravelDistance(r) => to_delimited(r, sep),
            MetricTable::RadiusOfGyration(r) => to_delimited(r, sep),
            MetricTable::VisitOrder(r) => to_delimited(r, sep),
            MetricTable::VisitTime(r) => to_delimited(r, sep),
            MetricTable::TravelTime(r) => to_delimited(r, sep),
            MetricTable::IntercontactTime(r) => to_delimited(r, sep),
            MetricTable::ContactDuration(r) => to_delimited(r, sep),
        }
    }

    /// Column names of the records.
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            MetricTable::TravelDistance(_) => TravelDistanceRecord::COLUMNS,
            MetricTable::RadiusOfGyration(_) => RadiusOfGyrationRecord::COLUMNS,
            MetricTable::VisitOrder(_) => VisitOrderRecord::COLUMNS,
            MetricTable::VisitTime(_) => VisitTimeRecord::COLUMNS,
            MetricTable::TravelTime(_) => TravelTimeRecord::COLUMNS,
            MetricTable::IntercontactTime(_) => IntercontactRecord::COLUMNS,
            MetricTable::ContactDuration(_) => ContactDurationRecord::COLUMNS,
        }
    }
}

/// Uniform extraction contract shared by every metric.
pub trait Metric: Send + Sync {
    fn kind(&self) -> MetricKind;

    fn extract(&self) -> MetricTable;
}

/// Tables a metric may draw from. Only the tables required by the requested
/// metric need to be present.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricInputs<'a> {
    pub trace: Option<&'a Trace>,
    pub trace_loc: Option<&'a [LocatedPoint]>,
    pub homes: Option<&'a [HomeLocation]>,
    pub contacts: Option<&'a [Contact]>,
    pub dist_type: DistanceType,
}

impl<'a> MetricInputs<'a> {
    pub fn new(dist_type: DistanceType) -> Self {
        Self {
            dist_type,
            ..Self::default()
        }
    }

    pub fn with_trace(mut self, trace: &'a Trace) -> Self {
        self.trace = Some(trace);
        self
    }

    pub fn with_trace_loc(mut self, trace_loc: &'a [LocatedPoint]) -> Self {
        self.trace_loc = Some(trace_loc);
        self
    }

    pub fn with_homes(mut self, homes: &'a [HomeLocation]) -> Self {
        self.homes = Some(homes);
        self
    }

    pub fn with_contacts(mut self, contacts: &'a [Contact]) -> Self {
        self.contacts = Some(contacts);
        self
    }
}

/// Build the metric selected by `kind` from the given inputs.
///
/// Fails with [`MobilityError::MissingInput`] when a required table is
/// absent. Radius of Gyration derives the home locations from `trace_loc`
/// when no `homes` table is supplied.
pub fn build_metric<'a>(
    kind: MetricKind,
    inputs: &MetricInputs<'a>,
) -> Result<Box<dyn Metric + 'a>> {
    let tag = kind.as_str();

    let metric: Box<dyn Metric + 'a> = match kind {
        MetricKind::TravelDistance => Box::new(TravelDistance::new(
            inputs.trace_loc.ok_or_missing_input(tag, "trace_loc")?,
            inputs.dist_type,
        )),
        MetricKind::RadiusOfGyration => {
            let trace = inputs.trace.ok_or_missing_input(tag, "trace")?;
            let homes = match (inputs.homes, inputs.trace_loc) {
                (Some(homes), _) => Cow::Borrowed(homes),
                (None, Some(trace_loc)) => Cow::Owned(find_homes(trace_loc)),
                (None, None) => {
                    return Err(MobilityError::MissingInput {
                        metric: tag.to_string(),
                        input: "homes".to_string(),
                    });
                }
            };
            Box::new(RadiusOfGyration::new(trace, homes, inputs.dist_type))
        }
        MetricKind::VisitOrder => Box::new(VisitOrder::new(
            inputs.trace_loc.ok_or_missing_input(tag, "trace_loc")?,
        )),
        MetricKind::VisitTime => Box::new(VisitTime::new(
            inputs.trace_loc.ok_or_missing_input(tag, "trace_loc")?,
        )),
        MetricKind::TravelTime => Box::new(TravelTime::new(
            inputs.trace_loc.ok_or_missing_input(tag, "trace_loc")?,
        )),
        MetricKind::IntercontactTime => Box::new(IntercontactTime::new(
            inputs.contacts.ok_or_missing_input(tag, "contacts")?,
        )),
        MetricKind::ContactDuration => Box::new(ContactDuration::new(
            inputs.contacts.ok_or_missing_input(tag, "contacts")?,
        )),
    };

    Ok(metric)
}

/// Build and extract one metric.
pub fn extract(kind: MetricKind, inputs: &MetricInputs<'_>) -> Result<MetricTable> {
    let start = Instant::now();
    let table = build_metric(kind, inputs)?.extract();

    info!(
        "[Metrics] Extracted {} ({} rows) in {}ms",
        kind.name(),
        table.len(),
        start.elapsed().as_millis()
    );

    Ok(table)
}

/// Extract the same metric from several independent input sets. Results are
/// returned in input order.
pub fn extract_multi(kind: MetricKind, inputs: &[MetricInputs<'_>]) -> Result<Vec<MetricTable>> {
    info!("[Metrics] Extracting {} for {} traces", kind.name(), inputs.len());

    #[cfg(feature = "parallel")]
    let tables: Result<Vec<MetricTable>> = inputs.par_iter().map(|i| extract(kind, i)).collect();

    #[cfg(not(feature = "parallel"))]
    let tables: Result<Vec<MetricTable>> = inputs.iter().map(|i| extract(kind, i)).collect();

    tables
}

/// Geo-location rows ordered by `(id, timestamp)`.
pub(crate) fn geo_rows(trace_loc: &[LocatedPoint]) -> Vec<LocatedPoint> {
    let mut rows: Vec<LocatedPoint> = trace_loc.iter().filter(|p| p.gl).copied().collect();
    rows.sort_by(|a, b| a.id.cmp(&b.id).then(a.timestamp.total_cmp(&b.timestamp)));
    rows
}
