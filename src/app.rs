// One run: connect, list containers and measurements, then (optionally) query
// tag values or latest times and emit console/CSV output.

use crate::config::AppConfig;
use crate::influx_repo::InfluxRepo;
use crate::latest_time::{self, MeasurementReport, Mode, Target};
use crate::lister;
use crate::models::Container;
use crate::report::{self, ContainerListing, console};
use anyhow::Context;
use chrono::TimeZone;
use std::fmt;
use std::io::{self, Write};
use tracing::{info, warn};

/// Counts for the final log line (and tests).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub containers: usize,
    pub measurements: usize,
    pub records: usize,
    pub hosts: usize,
    pub skipped: usize,
    pub files_written: usize,
}

/// Connects (fatal on failure) and runs against stdout in local time.
pub async fn run(config: &AppConfig) -> anyhow::Result<RunSummary> {
    let repo = InfluxRepo::connect(&config.connection)
        .await
        .context("connecting to InfluxDB")?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run_with(&repo, config, &mut out, &chrono::Local).await
}

/// Runs against an already connected repo. Per-item failures are logged and skipped.
pub async fn run_with<W, Tz>(
    repo: &InfluxRepo,
    config: &AppConfig,
    out: &mut W,
    tz: &Tz,
) -> anyhow::Result<RunSummary>
where
    W: Write,
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let mut summary = RunSummary::default();
    let label = repo.api_version().container_label();

    let containers = match lister::list_containers(repo).await {
        Ok(c) => c,
        Err(e) => {
            warn!(error = %e, "{} listing failed", label);
            Vec::new()
        }
    };
    summary.containers = containers.len();

    let mut listings = Vec::with_capacity(containers.len());
    for container in containers {
        let measurements = match lister::list_measurements(repo, &container.name).await {
            Ok(m) => {
                if m.is_empty() {
                    warn!(
                        container = %container.name,
                        "No measurements found; check permissions, DBRP mapping or data presence"
                    );
                }
                Some(m)
            }
            Err(e) => {
                warn!(container = %container.name, error = %e, "measurement query failed");
                None
            }
        };
        listings.push(ContainerListing {
            container,
            measurements,
        });
    }
    let buckets = listings.iter().any(|l| l.container.bucket.is_some());
    console_write(console::render_containers(out, &listings, buckets));

    let Some(mode) = config.query_mode() else {
        return Ok(summary);
    };

    let targets = resolve_targets(repo, config, &listings).await;
    if targets.is_empty() {
        info!("No {} matched; nothing to query", label);
    }

    let mut files_written = 0usize;
    let results = latest_time::compute_latest_times(
        repo,
        &targets,
        &config.tag,
        mode,
        |m: &MeasurementReport| {
            console_write(console::render_measurement(&mut *out, m, mode, &config.tag, tz));
            match report::save_measurement_csv(&config.output_dir, m, mode, tz) {
                Ok(Some(path)) => {
                    files_written += 1;
                    info!(path = %path.display(), "Saved results");
                }
                Ok(None) => info!(measurement = %m.measurement, "No data to save"),
                Err(e) => warn!(error = %format!("{:#}", e), "CSV write failed"),
            }
        },
    )
    .await;

    summary.measurements = results.measurements.len();
    summary.records = results.record_count();
    summary.hosts = results.summaries.len();
    summary.skipped = results.skipped;

    if mode == Mode::LatestTime {
        if results.summaries.is_empty() {
            info!("No host times found; summary files not written");
        } else {
            console_write(writeln!(out));
            console_write(console::render_summary(out, &results.summaries, tz));
            for saved in [
                report::save_summary_csv(&config.output_dir, &results.summaries, tz),
                report::save_summary_text(&config.output_dir, &results.summaries, tz),
            ] {
                match saved {
                    Ok(path) => {
                        files_written += 1;
                        info!(path = %path.display(), "Saved summary");
                    }
                    Err(e) => warn!(error = %format!("{:#}", e), "summary write failed"),
                }
            }
        }
    }
    summary.files_written = files_written;
    Ok(summary)
}

/// Logs a failed console write; file output carries on.
fn console_write(result: io::Result<()>) {
    if let Err(e) = result {
        warn!(error = %e, "writing console output failed");
    }
}

/// Containers to query (the named one, or every listed one) with their measurements
/// (the named one, or all of them).
async fn resolve_targets(
    repo: &InfluxRepo,
    config: &AppConfig,
    listings: &[ContainerListing],
) -> Vec<Target> {
    let selected: Vec<ContainerListing> = match &config.container {
        Some(name) => match listings.iter().find(|l| &l.container.name == name) {
            Some(l) => vec![l.clone()],
            None => {
                warn!(container = %name, "not in the listing; querying it anyway");
                vec![ContainerListing {
                    container: Container::named(name.clone()),
                    measurements: None,
                }]
            }
        },
        None => listings.to_vec(),
    };

    let mut targets = Vec::with_capacity(selected.len());
    for listing in selected {
        let name = listing.container.name;
        let measurements = match (&config.measurement, listing.measurements) {
            (Some(m), _) => vec![m.clone()],
            (None, Some(m)) => m,
            (None, None) => match lister::list_measurements(repo, &name).await {
                Ok(m) => m,
                Err(e) => {
                    warn!(container = %name, error = %e, "measurement query failed; skipping");
                    continue;
                }
            },
        };
        targets.push(Target {
            container: name,
            measurements,
        });
    }
    targets
}
