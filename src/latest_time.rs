// Latest-time aggregation: per (measurement, host) latest timestamp, folded into
// per-host oldest/newest summaries across every measurement of the run.
// Failures are per item: a failed tag query skips the measurement, a failed
// latest query or bad row skips the host.

use crate::influx_repo::{InfluxError, InfluxRepo};
use crate::influxql;
use crate::models::{FieldKind, HostRecord, HostSummaries, RowError, Schema};
use crate::tags;
use chrono::{DateTime, Utc};
use tracing::{info, warn};

/// What to do with each measurement in scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// List tag values only; no timestamp queries.
    TagValues,
    /// Query the latest timestamp of every tag value.
    LatestTime,
}

/// Measurements of one container to process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub container: String,
    pub measurements: Vec<String>,
}

/// Result for one measurement. `records` only holds hosts with a parsed timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeasurementReport {
    pub container: String,
    pub measurement: String,
    /// 1-based position within the container's measurements.
    pub index: usize,
    pub total: usize,
    pub hosts: Vec<String>,
    pub records: Vec<HostRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LatestTimeReport {
    pub measurements: Vec<MeasurementReport>,
    pub summaries: HostSummaries,
    /// Measurements or hosts dropped because of a query or row error.
    pub skipped: usize,
}

impl LatestTimeReport {
    pub fn record_count(&self) -> usize {
        self.measurements.iter().map(|m| m.records.len()).sum()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LatestError {
    #[error(transparent)]
    Query(#[from] InfluxError),
    #[error(transparent)]
    Row(#[from] RowError),
}

/// Processes every target in order. `on_measurement` is called as soon as a
/// measurement is done so output can be emitted progressively.
pub async fn compute_latest_times<F>(
    repo: &InfluxRepo,
    targets: &[Target],
    tag: &str,
    mode: Mode,
    mut on_measurement: F,
) -> LatestTimeReport
where
    F: FnMut(&MeasurementReport),
{
    let mut report = LatestTimeReport::default();
    for target in targets {
        let total = target.measurements.len();
        if total == 0 {
            info!(container = %target.container, "No measurements found");
            continue;
        }
        for (i, measurement) in target.measurements.iter().enumerate() {
            let Some(m) = process_measurement(
                repo,
                &target.container,
                measurement,
                tag,
                mode,
                &mut report,
            )
            .await
            else {
                continue;
            };
            let m = MeasurementReport {
                index: i + 1,
                total,
                ..m
            };
            on_measurement(&m);
            report.measurements.push(m);
        }
        info!(
            container = %target.container,
            measurements = total,
            "Completed querying measurements"
        );
    }
    report
}

async fn process_measurement(
    repo: &InfluxRepo,
    container: &str,
    measurement: &str,
    tag: &str,
    mode: Mode,
    report: &mut LatestTimeReport,
) -> Option<MeasurementReport> {
    info!(container, measurement, tag, "Fetching tag values");
    let hosts = match tags::list_tag_values(repo, container, Some(measurement), tag).await {
        Ok(h) => h,
        Err(e) => {
            warn!(
                container,
                measurement,
                error = %e,
                "tag value query failed; skipping measurement"
            );
            report.skipped += 1;
            return None;
        }
    };
    if hosts.is_empty() {
        info!(container, measurement, tag, "No tag values found");
    }

    let mut records = Vec::new();
    if mode == Mode::LatestTime {
        for host in &hosts {
            match latest_for_host(repo, container, measurement, tag, host).await {
                Ok(Some(last)) => {
                    let record = HostRecord {
                        container: container.to_string(),
                        measurement: measurement.to_string(),
                        host: host.clone(),
                        last,
                    };
                    report.summaries.record(&record);
                    records.push(record);
                }
                Ok(None) => info!(measurement, host = %host, "No data found for host"),
                Err(e) => {
                    warn!(measurement, host = %host, error = %e, "skipping host");
                    report.skipped += 1;
                }
            }
        }
    }

    Some(MeasurementReport {
        container: container.to_string(),
        measurement: measurement.to_string(),
        index: 0,
        total: 0,
        hosts,
        records,
    })
}

/// Timestamp of the most recent point where `tag = value`; None when there is no such point.
pub async fn latest_for_host(
    repo: &InfluxRepo,
    container: &str,
    measurement: &str,
    tag: &str,
    value: &str,
) -> Result<Option<DateTime<Utc>>, LatestError> {
    let statement = influxql::select_latest(measurement, tag, value);
    let result = repo.run_query(Some(container), &statement).await?;
    let schema = Schema::new().required("time", FieldKind::Timestamp);
    match result.rows(&schema).next() {
        None => Ok(None),
        Some(row) => Ok(row?.timestamp("time")),
    }
}
