// Console rendering, CSV content and output file tests

use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use influx_report::latest_time::{MeasurementReport, Mode};
use influx_report::models::timestamp::parse_report_timestamp;
use influx_report::models::{BucketMeta, Container, HostRecord, HostSummaries, RetentionPolicy};
use influx_report::report::{self, ContainerListing, console, csv_export};
use tempfile::TempDir;

fn tokyo() -> FixedOffset {
    FixedOffset::east_opt(9 * 3600).unwrap()
}

fn t1() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 4, 24, 10, 0, 0).unwrap() + chrono::Duration::microseconds(123_456)
}

fn t2() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 4, 24, 11, 0, 0).unwrap()
}

fn cpu_report() -> MeasurementReport {
    MeasurementReport {
        container: "telegraf".into(),
        measurement: "cpu".into(),
        index: 1,
        total: 2,
        hosts: vec!["server1".into(), "server2".into()],
        records: vec![HostRecord {
            container: "telegraf".into(),
            measurement: "cpu".into(),
            host: "server1".into(),
            last: t1(),
        }],
    }
}

fn summaries() -> HostSummaries {
    let mut s = HostSummaries::new();
    s.observe("server1", t1());
    s.observe("server1", t2());
    s
}

fn render<F>(f: F) -> String
where
    F: FnOnce(&mut Vec<u8>) -> std::io::Result<()>,
{
    let mut buf = Vec::new();
    f(&mut buf).unwrap();
    String::from_utf8(buf).unwrap()
}

#[test]
fn test_render_databases() {
    let listings = vec![ContainerListing {
        container: Container::database(
            "telegraf",
            vec![RetentionPolicy {
                name: "autogen".into(),
                duration: "0s".into(),
                default: true,
            }],
        ),
        measurements: Some(vec!["cpu".into(), "mem".into()]),
    }];
    let out = render(|w| console::render_containers(w, &listings, false));
    let lines: Vec<&str> = out.lines().collect();
    assert!(lines[0].starts_with("Database Name"));
    assert!(lines[0].contains("Retention Policy"));
    assert_eq!(lines[1], "-".repeat(85));
    assert!(lines[2].starts_with("telegraf"));
    assert!(lines[2].contains("autogen"));
    assert!(lines[2].ends_with("infinite"));
    assert_eq!(lines[3], "  Measurements (Tables): cpu, mem");
}

#[test]
fn test_render_buckets_and_no_measurements() {
    let listings = vec![ContainerListing {
        container: Container::bucket(
            "metrics",
            BucketMeta {
                id: "0a1b2c".into(),
                retention_seconds: Some(604_800),
            },
        ),
        measurements: None,
    }];
    let out = render(|w| console::render_containers(w, &listings, true));
    assert!(out.starts_with("Bucket Name"));
    assert!(out.contains("Bucket ID"));
    assert!(out.contains("0a1b2c"));
    assert!(out.contains("604800"));
    assert!(out.contains("  Measurements (Tables): None"));
}

#[test]
fn test_render_empty_listing() {
    let out = render(|w| console::render_containers(w, &[], false));
    assert!(out.contains("No containers found."));
}

#[test]
fn test_render_latest_table_uses_both_zones() {
    let out = render(|w| {
        console::render_measurement(w, &cpu_report(), Mode::LatestTime, "host", &tokyo())
    });
    assert!(out.contains("Measurement: cpu (1/2)"));
    assert!(out.contains(&"=".repeat(80)));
    assert!(out.contains("Time (UTC)"));
    let row = out
        .lines()
        .find(|l| l.trim_start().starts_with("server1"))
        .unwrap();
    assert!(row.contains("2025-04-24 10:00:00.123456"));
    assert!(row.contains("2025-04-24 19:00:00.123456"));
    // server2 had no rows
    assert!(!out.contains("server2"));
}

#[test]
fn test_render_tag_values() {
    let out = render(|w| {
        console::render_measurement(w, &cpu_report(), Mode::TagValues, "host", &Utc)
    });
    assert!(out.contains("List of 'host' tag values in measurement 'cpu' (telegraf):"));
    assert!(out.contains("\n  server1\n"));
    assert!(out.contains("\n  server2\n"));
}

#[test]
fn test_render_no_tag_values() {
    let report = MeasurementReport {
        hosts: vec![],
        records: vec![],
        ..cpu_report()
    };
    let out = render(|w| console::render_measurement(w, &report, Mode::LatestTime, "host", &Utc));
    assert!(out.contains("No 'host' tag values found for measurement 'cpu'."));
}

#[test]
fn test_render_summary() {
    let out = render(|w| console::render_summary(w, &summaries(), &Utc));
    let lines: Vec<&str> = out.lines().collect();
    assert!(lines[0].starts_with("Host"));
    assert!(lines[0].contains("NewTime_Local"));
    assert_eq!(lines[1], "-".repeat(150));
    assert!(lines[2].starts_with("server1"));
    assert!(lines[2].contains("2025-04-24 10:00:00.123456"));
    assert!(lines[2].contains("2025-04-24 11:00:00.000000"));
    assert_eq!(lines.len(), 3);
}

#[test]
fn test_measurement_csv_latest() {
    let mut buf = Vec::new();
    csv_export::write_measurement_csv(&mut buf, &cpu_report(), Mode::LatestTime, &tokyo())
        .unwrap();
    let text = String::from_utf8(buf).unwrap();
    assert_eq!(
        text,
        "Host,LastTime_UTC,LastTime_Local\n\
         server1,2025-04-24 10:00:00.123456,2025-04-24 19:00:00.123456\n"
    );
}

#[test]
fn test_measurement_csv_tag_values_has_empty_times() {
    let mut buf = Vec::new();
    csv_export::write_measurement_csv(&mut buf, &cpu_report(), Mode::TagValues, &Utc).unwrap();
    let text = String::from_utf8(buf).unwrap();
    assert_eq!(
        text,
        "Host,LastTime_UTC,LastTime_Local\nserver1,,\nserver2,,\n"
    );
    assert_eq!(csv_export::measurement_row_count(&cpu_report(), Mode::TagValues), 2);
    assert_eq!(csv_export::measurement_row_count(&cpu_report(), Mode::LatestTime), 1);
}

#[test]
fn test_summary_csv_times_parse_back() {
    let mut buf = Vec::new();
    csv_export::write_summary_csv(&mut buf, &summaries(), &tokyo()).unwrap();
    let mut rdr = csv::Reader::from_reader(buf.as_slice());
    let headers = rdr.headers().unwrap().clone();
    assert_eq!(
        headers.iter().collect::<Vec<_>>(),
        csv_export::SUMMARY_HEADER.to_vec()
    );
    let rows: Vec<csv::StringRecord> = rdr.records().collect::<Result<_, _>>().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(&rows[0][0], "server1");
    assert_eq!(parse_report_timestamp(&rows[0][1]).unwrap(), t1());
    assert_eq!(parse_report_timestamp(&rows[0][3]).unwrap(), t2());
    assert_eq!(&rows[0][2], "2025-04-24 19:00:00.123456");
    assert_eq!(&rows[0][4], "2025-04-24 20:00:00.000000");
}

#[test]
fn test_host_with_comma_is_quoted() {
    let report = MeasurementReport {
        hosts: vec!["rack1,node2".into()],
        records: vec![],
        ..cpu_report()
    };
    let mut buf = Vec::new();
    csv_export::write_measurement_csv(&mut buf, &report, Mode::TagValues, &Utc).unwrap();
    assert!(String::from_utf8(buf).unwrap().contains("\"rack1,node2\",,"));
}

#[test]
fn test_save_creates_directory_and_overwrites() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("nested").join("output");

    let path = report::save_measurement_csv(&out, &cpu_report(), Mode::TagValues, &Utc)
        .unwrap()
        .unwrap();
    assert_eq!(path, out.join("telegraf_cpu.csv"));
    let first = std::fs::read_to_string(&path).unwrap();
    assert_eq!(first.lines().count(), 3);

    let path = report::save_measurement_csv(&out, &cpu_report(), Mode::LatestTime, &Utc)
        .unwrap()
        .unwrap();
    let second = std::fs::read_to_string(&path).unwrap();
    assert_eq!(second.lines().count(), 2);
}

#[test]
fn test_empty_measurement_writes_no_file() {
    let dir = TempDir::new().unwrap();
    let report = MeasurementReport {
        records: vec![],
        ..cpu_report()
    };
    let saved = report::save_measurement_csv(dir.path(), &report, Mode::LatestTime, &Utc).unwrap();
    assert!(saved.is_none());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_summary_files() {
    let dir = TempDir::new().unwrap();
    let csv_path = report::save_summary_csv(dir.path(), &summaries(), &Utc).unwrap();
    let txt_path = report::save_summary_text(dir.path(), &summaries(), &Utc).unwrap();
    assert_eq!(csv_path, dir.path().join(report::SUMMARY_CSV));
    assert_eq!(txt_path, dir.path().join(report::SUMMARY_TXT));

    let txt = std::fs::read_to_string(txt_path).unwrap();
    let console_text = render(|w| console::render_summary(w, &summaries(), &Utc));
    assert_eq!(txt, console_text);
}

#[test]
fn test_file_names_are_sanitized() {
    let path = report::measurement_csv_path(std::path::Path::new("out"), "db/one", "a:b");
    assert_eq!(path, std::path::Path::new("out").join("db_one_a_b.csv"));
}
