// Shared test helpers: an in-process fake InfluxDB answering canned InfluxQL results

#![allow(dead_code)]

use axum::Router;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use influx_report::config::{AppConfig, Cli, FileConfig};
use influx_report::influxql;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Basic auth header for admin:secret.
pub const ADMIN_BASIC: &str = "Basic YWRtaW46c2VjcmV0";
pub const TOKEN: &str = "t0ken";
pub const ORG: &str = "acme";

pub const CPU_SERVER1: &str = "2025-04-24T10:00:00.123456Z";
pub const MEM_SERVER1: &str = "2025-04-24T11:00:00Z";

#[derive(Debug, Clone)]
enum Auth {
    Open,
    Header(String),
}

/// Requests the fake saw, as (db, q).
pub type RequestLog = Arc<Mutex<Vec<(Option<String>, String)>>>;

pub struct FakeInflux {
    auth: Auth,
    responses: HashMap<(Option<String>, String), (StatusCode, String)>,
    buckets: Option<String>,
    delay: Option<Duration>,
    log: RequestLog,
}

impl FakeInflux {
    /// No authentication required.
    pub fn open() -> Self {
        Self {
            auth: Auth::Open,
            responses: HashMap::new(),
            buckets: None,
            delay: None,
            log: Arc::default(),
        }
    }

    /// Requires admin:secret basic auth.
    pub fn v1() -> Self {
        Self {
            auth: Auth::Header(ADMIN_BASIC.to_string()),
            ..Self::open()
        }
    }

    /// Requires `Token t0ken`.
    pub fn v2() -> Self {
        Self {
            auth: Auth::Header(format!("Token {}", TOKEN)),
            ..Self::open()
        }
    }

    pub fn respond(mut self, db: Option<&str>, q: &str, body: String) -> Self {
        self.responses
            .insert((db.map(str::to_string), q.to_string()), (StatusCode::OK, body));
        self
    }

    pub fn fail(mut self, db: Option<&str>, q: &str, status: StatusCode, body: &str) -> Self {
        self.responses.insert(
            (db.map(str::to_string), q.to_string()),
            (status, body.to_string()),
        );
        self
    }

    pub fn buckets(mut self, body: Value) -> Self {
        self.buckets = Some(body.to_string());
        self
    }

    /// Delays every /query response.
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn log(&self) -> RequestLog {
        self.log.clone()
    }

    fn authorized(&self, headers: &HeaderMap) -> bool {
        match &self.auth {
            Auth::Open => true,
            Auth::Header(expected) => headers
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .is_some_and(|v| v == expected),
        }
    }

    /// Serves on an ephemeral localhost port; returns the base URL.
    pub async fn spawn(self) -> String {
        let app = Router::new()
            .route("/ping", get(ping))
            .route("/query", get(query).post(query))
            .route("/api/v2/buckets", get(buckets))
            .with_state(Arc::new(self));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }
}

async fn ping() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn query(
    State(fake): State<Arc<FakeInflux>>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if let Some(delay) = fake.delay {
        tokio::time::sleep(delay).await;
    }
    if !fake.authorized(&headers) {
        return (
            StatusCode::UNAUTHORIZED,
            r#"{"error":"authorization failed"}"#,
        )
            .into_response();
    }
    let db = params.get("db").cloned();
    let q = params.get("q").cloned().unwrap_or_default();
    fake.log.lock().unwrap().push((db.clone(), q.clone()));
    match fake.responses.get(&(db, q)) {
        Some((status, body)) => (*status, body.clone()).into_response(),
        None => (StatusCode::OK, empty_result()).into_response(),
    }
}

async fn buckets(State(fake): State<Arc<FakeInflux>>, headers: HeaderMap) -> Response {
    if !fake.authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, r#"{"code":"unauthorized"}"#).into_response();
    }
    let body = fake
        .buckets
        .clone()
        .unwrap_or_else(|| json!({ "buckets": [] }).to_string());
    (StatusCode::OK, body).into_response()
}

pub fn series(name: &str, columns: &[&str], values: Vec<Vec<Value>>) -> Value {
    json!({ "name": name, "columns": columns, "values": values })
}

/// One statement result holding `series`.
pub fn result(series: Vec<Value>) -> String {
    json!({ "results": [{ "statement_id": 0, "series": series }] }).to_string()
}

pub fn empty_result() -> String {
    json!({ "results": [{ "statement_id": 0 }] }).to_string()
}

pub fn names(series_name: &str, names: &[&str]) -> String {
    result(vec![series(
        series_name,
        &["name"],
        names.iter().map(|n| vec![json!(n)]).collect(),
    )])
}

pub fn tag_values(measurement: &str, tag: &str, values: &[&str]) -> String {
    result(vec![series(
        measurement,
        &["key", "value"],
        values.iter().map(|v| vec![json!(tag), json!(v)]).collect(),
    )])
}

pub fn latest_row(measurement: &str, time: &str, host: &str) -> String {
    result(vec![series(
        measurement,
        &["time", "host", "usage_idle"],
        vec![vec![json!(time), json!(host), json!(97.5)]],
    )])
}

/// v1 server with database telegraf (autogen, infinite) holding cpu and mem.
/// cpu: server1 at CPU_SERVER1, server2 without rows; mem: server1 at MEM_SERVER1.
pub fn telegraf_v1() -> FakeInflux {
    FakeInflux::v1()
        .respond(None, &influxql::show_databases(), names("databases", &["telegraf"]))
        .respond(
            Some("telegraf"),
            &influxql::show_retention_policies("telegraf"),
            result(vec![series(
                "",
                &["name", "duration", "shardGroupDuration", "replicaN", "default"],
                vec![vec![
                    json!("autogen"),
                    json!("0s"),
                    json!("168h0m0s"),
                    json!(1),
                    json!(true),
                ]],
            )]),
        )
        .respond(
            Some("telegraf"),
            &influxql::show_measurements(),
            names("measurements", &["cpu", "mem"]),
        )
        .respond(
            Some("telegraf"),
            &influxql::show_tag_values("telegraf", Some("cpu"), "host"),
            tag_values("cpu", "host", &["server1", "server2"]),
        )
        .respond(
            Some("telegraf"),
            &influxql::show_tag_values("telegraf", Some("mem"), "host"),
            tag_values("mem", "host", &["server1"]),
        )
        .respond(
            Some("telegraf"),
            &influxql::select_latest("cpu", "host", "server1"),
            latest_row("cpu", CPU_SERVER1, "server1"),
        )
        .respond(
            Some("telegraf"),
            &influxql::select_latest("mem", "host", "server1"),
            latest_row("mem", MEM_SERVER1, "server1"),
        )
}

/// v1 CLI flags for `url` authenticating as admin:secret and writing under `out`.
pub fn v1_cli(url: &str, out: &Path) -> Cli {
    Cli {
        url: Some(url.to_string()),
        username: Some("admin".into()),
        password: Some("secret".into()),
        output_dir: Some(out.to_path_buf()),
        timeout_secs: Some(5),
        ..Cli::default()
    }
}

pub fn config(cli: Cli) -> AppConfig {
    AppConfig::merge(cli, FileConfig::default()).unwrap()
}
