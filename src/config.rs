// Command-line flags merged over an optional TOML config file.
// Flags win over the file; the merged result is validated once.

use crate::influx_repo::{ConnectionConfig, Credentials, normalize_url};
use crate::latest_time::Mode;
use crate::tags::DEFAULT_TAG;
use clap::Parser;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_OUTPUT_DIR: &str = "output";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// List InfluxDB databases/buckets, host tag values and the latest record time per host.
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "influx-report", version, about)]
pub struct Cli {
    /// InfluxDB server URL (e.g. http://localhost:8086)
    #[arg(long, env = "INFLUX_URL")]
    pub url: Option<String>,

    /// v1 username (optional when authentication is disabled)
    #[arg(long, env = "INFLUX_USERNAME")]
    pub username: Option<String>,

    /// v1 password
    #[arg(long, env = "INFLUX_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// v2 API token; selects the v2 API
    #[arg(long, env = "INFLUX_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// v2 organization name
    #[arg(long, env = "INFLUX_ORG")]
    pub org: Option<String>,

    /// Database (v1) or bucket (v2) to query
    #[arg(long = "database", visible_alias = "bucket")]
    pub container: Option<String>,

    /// Measurement (table) to query
    #[arg(long)]
    pub measurement: Option<String>,

    /// Query every measurement of the database/bucket
    #[arg(long)]
    pub all_measurement: bool,

    /// Query the latest record time for each host
    #[arg(long)]
    pub latest_time: bool,

    /// Tag identifying a host [default: host]
    #[arg(long)]
    pub tag: Option<String>,

    /// Directory for CSV and summary files [default: output]
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Per-request timeout in seconds [default: 30]
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// TOML config file with [connection] and [output] tables
    #[arg(long, env = "INFLUX_REPORT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log raw server responses
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub connection: FileConnection,
    #[serde(default)]
    pub output: FileOutput,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConnection {
    pub url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub token: Option<String>,
    pub org: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileOutput {
    pub dir: Option<PathBuf>,
    pub tag: Option<String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let s = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("reading config file {}: {}", path.display(), e))?;
        Self::load_from_str(&s)
    }

    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(s)?)
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub connection: ConnectionConfig,
    pub container: Option<String>,
    pub measurement: Option<String>,
    pub all_measurement: bool,
    pub latest_time: bool,
    pub tag: String,
    pub output_dir: PathBuf,
    pub verbose: bool,
}

impl AppConfig {
    /// Reads the config file named by `--config` (if any) and merges the flags over it.
    pub fn load(cli: Cli) -> anyhow::Result<Self> {
        let file = match &cli.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        Self::merge(cli, file)
    }

    /// Same as [`AppConfig::load`] with the file contents given as a string (e.g. for tests).
    pub fn load_from_str(cli: Cli, file: &str) -> anyhow::Result<Self> {
        Self::merge(cli, FileConfig::load_from_str(file)?)
    }

    pub fn merge(cli: Cli, file: FileConfig) -> anyhow::Result<Self> {
        let conn = file.connection;
        let url = cli.url.or(conn.url).unwrap_or_default();
        let username = cli.username.or(conn.username);
        let password = cli.password.or(conn.password);
        let token = cli.token.or(conn.token);
        let org = cli.org.or(conn.org);

        let credentials = match (token, org) {
            (None, None) => Credentials::V1 { username, password },
            (Some(token), Some(org)) => {
                anyhow::ensure!(
                    username.is_none() && password.is_none(),
                    "--username/--password are v1 options and cannot be combined with --token"
                );
                Credentials::V2 { token, org }
            }
            (Some(_), None) => anyhow::bail!("--org is required with --token"),
            (None, Some(_)) => anyhow::bail!("--token is required with --org"),
        };

        let timeout_secs = cli
            .timeout_secs
            .or(conn.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        anyhow::ensure!(
            timeout_secs > 0,
            "timeout_secs must be > 0, got {}",
            timeout_secs
        );

        let config = AppConfig {
            connection: ConnectionConfig {
                url,
                credentials,
                timeout: Duration::from_secs(timeout_secs),
            },
            container: cli.container,
            measurement: cli.measurement,
            all_measurement: cli.all_measurement,
            latest_time: cli.latest_time,
            tag: cli
                .tag
                .or(file.output.tag)
                .unwrap_or_else(|| DEFAULT_TAG.to_string()),
            output_dir: cli
                .output_dir
                .or(file.output.dir)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            verbose: cli.verbose,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            !self.connection.url.trim().is_empty(),
            "url is required (--url, INFLUX_URL or [connection].url)"
        );
        normalize_url(&self.connection.url)?;
        if let Credentials::V2 { token, org } = &self.connection.credentials {
            anyhow::ensure!(!token.is_empty(), "token must be non-empty");
            anyhow::ensure!(!org.is_empty(), "org must be non-empty");
        }
        anyhow::ensure!(!self.tag.trim().is_empty(), "tag must be non-empty");
        anyhow::ensure!(
            !self.output_dir.as_os_str().is_empty(),
            "output_dir must be non-empty"
        );
        if let Some(c) = &self.container {
            anyhow::ensure!(!c.is_empty(), "database/bucket name must be non-empty");
        }
        if let Some(m) = &self.measurement {
            anyhow::ensure!(!m.is_empty(), "measurement name must be non-empty");
        }
        Ok(())
    }

    /// None means listing only.
    pub fn query_mode(&self) -> Option<Mode> {
        if self.latest_time {
            Some(Mode::LatestTime)
        } else if self.all_measurement || self.measurement.is_some() {
            Some(Mode::TagValues)
        } else {
            None
        }
    }
}
