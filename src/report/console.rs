// Aligned console text. Everything here writes to a generic writer so the same
// output can go to stdout, a file (all-result.txt) or a buffer in tests.

use crate::latest_time::{MeasurementReport, Mode};
use crate::models::HostSummaries;
use crate::models::timestamp::format_utc_and_local;
use chrono::TimeZone;
use std::fmt;
use std::io::{self, Write};

use super::ContainerListing;

const COL: usize = 30;

/// One line, trailing padding removed.
fn line<W: Write>(w: &mut W, s: &str) -> io::Result<()> {
    writeln!(w, "{}", s.trim_end())
}

/// Container table followed by each container's measurements.
/// v2 buckets show their ID and retention seconds; v1 databases one line per retention policy.
pub fn render_containers<W: Write>(
    w: &mut W,
    listings: &[ContainerListing],
    buckets: bool,
) -> io::Result<()> {
    let (name_col, mid_col) = if buckets {
        ("Bucket Name", "Bucket ID")
    } else {
        ("Database Name", "Retention Policy")
    };
    line(w, &format!("{:<30} {:<40} {:<15}", name_col, mid_col, "Retention"))?;
    line(w, &"-".repeat(85))?;
    if listings.is_empty() {
        line(w, "No containers found.")?;
        return Ok(());
    }
    for listing in listings {
        let c = &listing.container;
        match &c.bucket {
            Some(meta) => line(
                w,
                &format!("{:<30} {:<40} {:<15}", c.name, meta.id, meta.retention_display()),
            )?,
            None if c.retention_policies.is_empty() => line(
                w,
                &format!("{:<30} {:<40} {:<15}", c.name, "none", "infinite"),
            )?,
            None => {
                for rp in &c.retention_policies {
                    line(
                        w,
                        &format!(
                            "{:<30} {:<40} {:<15}",
                            c.name,
                            rp.name,
                            rp.duration_display()
                        ),
                    )?;
                }
            }
        }
        let measurements = match &listing.measurements {
            Some(m) if !m.is_empty() => m.join(", "),
            _ => "None".to_string(),
        };
        line(w, &format!("  Measurements (Tables): {}", measurements))?;
        line(w, "")?;
    }
    Ok(())
}

/// Header, then either the tag value list or the latest-time table.
pub fn render_measurement<W, Tz>(
    w: &mut W,
    report: &MeasurementReport,
    mode: Mode,
    tag: &str,
    tz: &Tz,
) -> io::Result<()>
where
    W: Write,
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    line(w, "")?;
    line(
        w,
        &format!(
            "Measurement: {} ({}/{})",
            report.measurement, report.index, report.total
        ),
    )?;
    line(w, &"=".repeat(80))?;

    if report.hosts.is_empty() {
        line(
            w,
            &format!(
                "  No '{}' tag values found for measurement '{}'.",
                tag, report.measurement
            ),
        )?;
        return Ok(());
    }

    match mode {
        Mode::TagValues => {
            line(
                w,
                &format!(
                    "  List of '{}' tag values in measurement '{}' ({}):",
                    tag, report.measurement, report.container
                ),
            )?;
            line(w, &format!("  {}", "-".repeat(60)))?;
            for host in &report.hosts {
                line(w, &format!("  {}", host))?;
            }
        }
        Mode::LatestTime => {
            line(
                w,
                &format!(
                    "  Latest record time for each host in measurement '{}' ({}):",
                    report.measurement, report.container
                ),
            )?;
            line(
                w,
                &format!("  {:<COL$} {:<COL$} {:<COL$}", "Host", "Time (UTC)", "Time (Local)"),
            )?;
            line(w, &format!("  {}", "-".repeat(90)))?;
            for record in &report.records {
                let (utc, local) = format_utc_and_local(&record.last, tz);
                line(w, &format!("  {:<COL$} {:<COL$} {:<COL$}", record.host, utc, local))?;
            }
        }
    }
    Ok(())
}

/// Host / OldTime / NewTime table, one row per host in name order.
pub fn render_summary<W, Tz>(w: &mut W, summaries: &HostSummaries, tz: &Tz) -> io::Result<()>
where
    W: Write,
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    line(
        w,
        &format!(
            "{:<COL$} {:<COL$} {:<COL$} {:<COL$} {:<COL$}",
            "Host", "OldTime_UTC", "OldTime_Local", "NewTime_UTC", "NewTime_Local"
        ),
    )?;
    line(w, &"-".repeat(150))?;
    for s in summaries.iter() {
        let (old_utc, old_local) = format_utc_and_local(&s.oldest, tz);
        let (new_utc, new_local) = format_utc_and_local(&s.newest, tz);
        line(
            w,
            &format!(
                "{:<COL$} {:<COL$} {:<COL$} {:<COL$} {:<COL$}",
                s.host, old_utc, old_local, new_utc, new_local
            ),
        )?;
    }
    Ok(())
}
