// Query client errors. Connection/auth failures at startup abort the run;
// everything else is reported per item by the caller.

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InfluxError {
    #[error("invalid InfluxDB URL {0:?}: expected http:// or https://")]
    InvalidUrl(String),
    #[error("cannot reach InfluxDB at {url}: {message}")]
    Connection { url: String, message: String },
    #[error("InfluxDB at {url} did not respond in time")]
    Timeout { url: String },
    #[error("authentication failed (HTTP {status}): {body}")]
    Auth { status: u16, body: String },
    #[error("query failed (HTTP {status}): {message}")]
    Query { status: u16, message: String },
    #[error("malformed InfluxDB response: {0}")]
    Decode(String),
    #[error("{0} requires InfluxDB v2 credentials (--token/--org)")]
    Unsupported(&'static str),
}

impl InfluxError {
    /// Errors that make every further request pointless.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            InfluxError::InvalidUrl(_) | InfluxError::Connection { .. } | InfluxError::Auth { .. }
        )
    }

    pub(super) fn from_transport(url: &str, e: reqwest::Error) -> Self {
        if e.is_timeout() {
            InfluxError::Timeout {
                url: url.to_string(),
            }
        } else {
            InfluxError::Connection {
                url: url.to_string(),
                message: e.to_string(),
            }
        }
    }

    /// Maps a non-2xx HTTP status; the raw body is kept for diagnosis.
    pub(super) fn from_status(status: u16, body: String) -> Self {
        match status {
            401 | 403 => InfluxError::Auth { status, body },
            _ => InfluxError::Query {
                status,
                message: body,
            },
        }
    }
}
