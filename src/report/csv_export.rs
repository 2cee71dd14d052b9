// CSV output: per-measurement host rows and the cross-measurement summary.
// Header row is always written; LF line endings.

use crate::latest_time::{MeasurementReport, Mode};
use crate::models::HostSummaries;
use crate::models::timestamp::format_utc_and_local;
use chrono::TimeZone;
use serde::Serialize;
use std::fmt;
use std::io::Write;

pub const MEASUREMENT_HEADER: [&str; 3] = ["Host", "LastTime_UTC", "LastTime_Local"];
pub const SUMMARY_HEADER: [&str; 5] = [
    "Host",
    "OldTime_UTC",
    "OldTime_Local",
    "NewTime_UTC",
    "NewTime_Local",
];

#[derive(Serialize)]
struct MeasurementRow<'a> {
    host: &'a str,
    last_utc: String,
    last_local: String,
}

#[derive(Serialize)]
struct SummaryRow<'a> {
    host: &'a str,
    old_utc: String,
    old_local: String,
    new_utc: String,
    new_local: String,
}

fn writer<W: Write>(w: W) -> csv::Writer<W> {
    csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(w)
}

/// Rows a measurement contributes: one per record in latest-time mode,
/// one per tag value (empty times) in tag-values mode.
pub fn measurement_row_count(report: &MeasurementReport, mode: Mode) -> usize {
    match mode {
        Mode::LatestTime => report.records.len(),
        Mode::TagValues => report.hosts.len(),
    }
}

pub fn write_measurement_csv<W, Tz>(
    w: W,
    report: &MeasurementReport,
    mode: Mode,
    tz: &Tz,
) -> Result<(), csv::Error>
where
    W: Write,
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let mut wtr = writer(w);
    wtr.write_record(MEASUREMENT_HEADER)?;
    match mode {
        Mode::LatestTime => {
            for record in &report.records {
                let (last_utc, last_local) = format_utc_and_local(&record.last, tz);
                wtr.serialize(MeasurementRow {
                    host: &record.host,
                    last_utc,
                    last_local,
                })?;
            }
        }
        Mode::TagValues => {
            for host in &report.hosts {
                wtr.serialize(MeasurementRow {
                    host,
                    last_utc: String::new(),
                    last_local: String::new(),
                })?;
            }
        }
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_summary_csv<W, Tz>(w: W, summaries: &HostSummaries, tz: &Tz) -> Result<(), csv::Error>
where
    W: Write,
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let mut wtr = writer(w);
    wtr.write_record(SUMMARY_HEADER)?;
    for s in summaries.iter() {
        let (old_utc, old_local) = format_utc_and_local(&s.oldest, tz);
        let (new_utc, new_local) = format_utc_and_local(&s.newest, tz);
        wtr.serialize(SummaryRow {
            host: &s.host,
            old_utc,
            old_local,
            new_utc,
            new_local,
        })?;
    }
    wtr.flush()?;
    Ok(())
}
