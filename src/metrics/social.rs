//! Social metrics derived from the contact table.
//!
//! Contacts of the same node pair that are at most [`EPISODE_GAP_SECS`]
//! apart belong to one contact episode.

use serde::{Deserialize, Serialize};

use super::{Metric, MetricKind, MetricTable};
use crate::io::TableRecord;
use crate::Contact;

/// Maximum gap between two contacts of the same episode, in seconds.
pub const EPISODE_GAP_SECS: f64 = 30.0;

/// Contacts ordered by `(pair, timestamp)`.
fn sorted_contacts(contacts: &[Contact]) -> Vec<Contact> {
    let mut sorted = contacts.to_vec();
    sorted.sort_by(|a, b| {
        let by_pair = a.pair().cmp(&b.pair());
        by_pair.then(a.timestamp.total_cmp(&b.timestamp))
    });
    sorted
}

// ============================================================================
// Intercontact Time (INCO)
// ============================================================================

/// Gap between two successive contact episodes of a node pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntercontactRecord {
    pub id1: i64,
    pub id2: i64,
    pub intercontact_time: f64,
}

impl TableRecord for IntercontactRecord {
    const COLUMNS: &'static [&'static str] = &["id1", "id2", "intercontact_time"];

    fn row(&self) -> Vec<String> {
        vec![
            self.id1.to_string(),
            self.id2.to_string(),
            self.intercontact_time.to_string(),
        ]
    }
}

/// Timestamp deltas between consecutive contacts of the same pair, keeping
/// only deltas above [`EPISODE_GAP_SECS`].
pub fn intercontact_time(contacts: &[Contact]) -> Vec<IntercontactRecord> {
    sorted_contacts(contacts)
        .windows(2)
        .filter(|w| w[0].pair() == w[1].pair())
        .filter_map(|w| {
            let gap = w[1].timestamp - w[0].timestamp;
            if gap > EPISODE_GAP_SECS {
                let (id1, id2) = w[1].pair();
                Some(IntercontactRecord {
                    id1,
                    id2,
                    intercontact_time: gap,
                })
            } else {
                None
            }
        })
        .collect()
}

pub struct IntercontactTime<'a> {
    contacts: &'a [Contact],
}

impl<'a> IntercontactTime<'a> {
    pub fn new(contacts: &'a [Contact]) -> Self {
        Self { contacts }
    }
}

impl Metric for IntercontactTime<'_> {
    fn kind(&self) -> MetricKind {
        MetricKind::IntercontactTime
    }

    fn extract(&self) -> MetricTable {
        MetricTable::IntercontactTime(intercontact_time(self.contacts))
    }
}

// ============================================================================
// Contact Duration (CODU)
// ============================================================================

/// One contact episode of a node pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContactDurationRecord {
    pub id1: i64,
    pub id2: i64,
    pub start: f64,
    pub end: f64,
    pub contact_duration: f64,
}

impl TableRecord for ContactDurationRecord {
    const COLUMNS: &'static [&'static str] = &["id1", "id2", "start", "end", "contact_duration"];

    fn row(&self) -> Vec<String> {
        vec![
            self.id1.to_string(),
            self.id2.to_string(),
            self.start.to_string(),
            self.end.to_string(),
            self.contact_duration.to_string(),
        ]
    }
}

/// Merge contacts into episodes and report each episode's duration.
/// An isolated contact is an episode of duration 0.
pub fn contact_duration(contacts: &[Contact]) -> Vec<ContactDurationRecord> {
    let sorted = sorted_contacts(contacts);
    let mut records = Vec::new();

    let mut contacts_iter = sorted.iter();
    let Some(first) = contacts_iter.next() else {
        return records;
    };

    let episode = |pair: (i64, i64), start: f64, end: f64| ContactDurationRecord {
        id1: pair.0,
        id2: pair.1,
        start,
        end,
        contact_duration: end - start,
    };

    let mut pair = first.pair();
    let mut start = first.timestamp;
    let mut end = first.timestamp;

    for contact in contacts_iter {
        if contact.pair() == pair && contact.timestamp - end <= EPISODE_GAP_SECS {
            end = contact.timestamp;
        } else {
            records.push(episode(pair, start, end));
            pair = contact.pair();
            start = contact.timestamp;
            end = contact.timestamp;
        }
    }
    records.push(episode(pair, start, end));

    records
}

pub struct ContactDuration<'a> {
    contacts: &'a [Contact],
}

impl<'a> ContactDuration<'a> {
    pub fn new(contacts: &'a [Contact]) -> Self {
        Self { contacts }
    }
}

impl Metric for ContactDuration<'_> {
    fn kind(&self) -> MetricKind {
        MetricKind::ContactDuration
    }

    fn extract(&self) -> MetricTable {
        MetricTable::ContactDuration(contact_duration(self.contacts))
    }
}
