// Per-host latest-time records and the cross-measurement oldest/newest fold

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Latest timestamp of one host in one measurement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostRecord {
    pub container: String,
    pub measurement: String,
    pub host: String,
    pub last: DateTime<Utc>,
}

/// Oldest and newest latest-timestamps seen for a host across a run.
/// Both bounds are always values that were actually observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostSummary {
    pub host: String,
    pub oldest: DateTime<Utc>,
    pub newest: DateTime<Utc>,
}

impl HostSummary {
    pub fn new(host: impl Into<String>, ts: DateTime<Utc>) -> Self {
        Self {
            host: host.into(),
            oldest: ts,
            newest: ts,
        }
    }

    pub fn observe(&mut self, ts: DateTime<Utc>) {
        if ts < self.oldest {
            self.oldest = ts;
        }
        if ts > self.newest {
            self.newest = ts;
        }
    }
}

/// Host summaries keyed (and iterated) by host name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostSummaries {
    by_host: BTreeMap<String, HostSummary>,
}

impl HostSummaries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, record: &HostRecord) {
        self.observe(&record.host, record.last);
    }

    pub fn observe(&mut self, host: &str, ts: DateTime<Utc>) {
        match self.by_host.get_mut(host) {
            Some(summary) => summary.observe(ts),
            None => {
                self.by_host
                    .insert(host.to_string(), HostSummary::new(host, ts));
            }
        }
    }

    pub fn get(&self, host: &str) -> Option<&HostSummary> {
        self.by_host.get(host)
    }

    pub fn iter(&self) -> impl Iterator<Item = &HostSummary> {
        self.by_host.values()
    }

    pub fn len(&self) -> usize {
        self.by_host.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_host.is_empty()
    }
}
