// Report output: console text plus CSV/text files under the output directory.
// Each file is its own target: a failure to write one does not stop the others.

pub mod console;
pub mod csv_export;

use crate::latest_time::{MeasurementReport, Mode};
use crate::models::{Container, HostSummaries};
use anyhow::Context;
use chrono::TimeZone;
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub const SUMMARY_CSV: &str = "all-result.csv";
pub const SUMMARY_TXT: &str = "all-result.txt";

/// A container and its measurements (None when the measurement query failed).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerListing {
    pub container: Container,
    pub measurements: Option<Vec<String>>,
}

/// Replaces characters that cannot appear in a file name.
pub fn sanitize_file_component(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '\0' => '_',
            c => c,
        })
        .collect()
}

/// `{dir}/{container}_{measurement}.csv`
pub fn measurement_csv_path(dir: &Path, container: &str, measurement: &str) -> PathBuf {
    dir.join(format!(
        "{}_{}.csv",
        sanitize_file_component(container),
        sanitize_file_component(measurement)
    ))
}

/// Creates `dir` if needed and truncates/creates `path` inside it.
fn create_output_file(dir: &Path, path: &Path) -> anyhow::Result<BufWriter<File>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("creating output directory {}", dir.display()))?;
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    Ok(BufWriter::new(file))
}

/// Writes the measurement's CSV. Returns None (and writes nothing) when it has no rows.
pub fn save_measurement_csv<Tz>(
    dir: &Path,
    report: &MeasurementReport,
    mode: Mode,
    tz: &Tz,
) -> anyhow::Result<Option<PathBuf>>
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    if csv_export::measurement_row_count(report, mode) == 0 {
        return Ok(None);
    }
    let path = measurement_csv_path(dir, &report.container, &report.measurement);
    let file = create_output_file(dir, &path)?;
    csv_export::write_measurement_csv(file, report, mode, tz)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(Some(path))
}

pub fn save_summary_csv<Tz>(
    dir: &Path,
    summaries: &HostSummaries,
    tz: &Tz,
) -> anyhow::Result<PathBuf>
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let path = dir.join(SUMMARY_CSV);
    let file = create_output_file(dir, &path)?;
    csv_export::write_summary_csv(file, summaries, tz)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}

pub fn save_summary_text<Tz>(
    dir: &Path,
    summaries: &HostSummaries,
    tz: &Tz,
) -> anyhow::Result<PathBuf>
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let path = dir.join(SUMMARY_TXT);
    let mut file = create_output_file(dir, &path)?;
    console::render_summary(&mut file, summaries, tz)
        .and_then(|_| file.flush())
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}
