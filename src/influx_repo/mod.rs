// InfluxDB query client over HTTP: InfluxQL /query for v1 and the v2 compatibility
// layer, plus the v2 buckets API. One request in flight at a time, no retries.

mod buckets;
mod error;
mod response;

pub use error::InfluxError;

use crate::models::QueryResult;
use crate::version;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Credentials select the API flavour.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Basic auth when a username is set; anonymous otherwise.
    V1 {
        username: Option<String>,
        password: Option<String>,
    },
    /// `Authorization: Token <token>`; InfluxQL goes through the DBRP mapping.
    V2 { token: String, org: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiVersion {
    V1,
    V2,
}

impl ApiVersion {
    /// What a container is called in this API version.
    pub fn container_label(&self) -> &'static str {
        match self {
            ApiVersion::V1 => "database",
            ApiVersion::V2 => "bucket",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    pub url: String,
    pub credentials: Credentials,
    /// Bound on each request (connect + response).
    pub timeout: Duration,
}

pub struct InfluxRepo {
    client: reqwest::Client,
    base_url: String,
    credentials: Credentials,
}

impl InfluxRepo {
    /// Builds the client, checks the server answers /ping, then checks the credentials.
    pub async fn connect(config: &ConnectionConfig) -> Result<Self, InfluxError> {
        let base_url = normalize_url(&config.url)?;
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.timeout)
            .user_agent(version::user_agent())
            .build()
            .map_err(|e| InfluxError::from_transport(&base_url, e))?;
        let repo = Self {
            client,
            base_url,
            credentials: config.credentials.clone(),
        };
        repo.ping().await?;
        repo.check_auth().await?;
        info!(url = %repo.base_url, api = ?repo.api_version(), "Connected to InfluxDB");
        Ok(repo)
    }

    pub fn api_version(&self) -> ApiVersion {
        match self.credentials {
            Credentials::V1 { .. } => ApiVersion::V1,
            Credentials::V2 { .. } => ApiVersion::V2,
        }
    }

    async fn ping(&self) -> Result<(), InfluxError> {
        let url = format!("{}/ping", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| InfluxError::from_transport(&self.base_url, e))?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(InfluxError::Connection {
                url: self.base_url.clone(),
                message: format!("/ping returned HTTP {}", status.as_u16()),
            })
        }
    }

    async fn check_auth(&self) -> Result<(), InfluxError> {
        match &self.credentials {
            Credentials::V1 { .. } => {
                self.run_query(None, &crate::influxql::show_databases())
                    .await?;
            }
            Credentials::V2 { .. } => {
                self.fetch_buckets_page(1, 0).await?;
            }
        }
        Ok(())
    }

    /// Runs one InfluxQL statement. `container` is sent as `db`.
    #[instrument(skip(self), fields(repo = "influx", operation = "run_query"))]
    pub async fn run_query(
        &self,
        container: Option<&str>,
        statement: &str,
    ) -> Result<QueryResult, InfluxError> {
        let url = format!("{}/query", self.base_url);
        let mut params: Vec<(&str, &str)> = vec![("q", statement)];
        if let Some(db) = container {
            params.push(("db", db));
        }
        let request = match &self.credentials {
            Credentials::V1 { username, password } => {
                let request = self.client.get(&url).query(&params);
                match username {
                    Some(user) => request.basic_auth(user, password.as_deref()),
                    None => request,
                }
            }
            Credentials::V2 { token, org } => {
                params.push(("org", org.as_str()));
                self.client
                    .post(&url)
                    .query(&params)
                    .header(reqwest::header::AUTHORIZATION, format!("Token {}", token))
            }
        };
        let (status, body) = self.send(request).await?;
        response::decode_query_response(status, &body)
    }

    /// Sends a request and returns the 2xx status and body; other statuses become errors.
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<(u16, String), InfluxError> {
        let response = request
            .send()
            .await
            .map_err(|e| InfluxError::from_transport(&self.base_url, e))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| InfluxError::from_transport(&self.base_url, e))?;
        debug!(status, body = %body, "raw InfluxDB response");
        if (200..300).contains(&status) {
            Ok((status, body))
        } else {
            Err(InfluxError::from_status(status, body))
        }
    }
}

/// Accepts `http://host:port[/]`; trailing slashes are dropped.
pub fn normalize_url(url: &str) -> Result<String, InfluxError> {
    let trimmed = url.trim().trim_end_matches('/');
    let rest = trimmed
        .strip_prefix("http://")
        .or_else(|| trimmed.strip_prefix("https://"));
    match rest {
        Some(host) if !host.is_empty() => Ok(trimmed.to_string()),
        _ => Err(InfluxError::InvalidUrl(url.to_string())),
    }
}
