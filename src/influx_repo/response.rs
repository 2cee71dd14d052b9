// InfluxQL /query JSON envelope:
// {"results":[{"statement_id":0,"series":[...]}]} or an "error" at either level.

use super::InfluxError;
use crate::models::{QueryResult, Series};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    results: Vec<StatementResult>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StatementResult {
    #[serde(default)]
    series: Vec<Series>,
    #[serde(default)]
    error: Option<String>,
}

/// Decodes a successful (2xx) response body. Only the first statement result is used;
/// a result without series is an empty result.
pub(super) fn decode_query_response(status: u16, body: &str) -> Result<QueryResult, InfluxError> {
    let response: QueryResponse =
        serde_json::from_str(body).map_err(|e| InfluxError::Decode(e.to_string()))?;
    if let Some(message) = response.error {
        return Err(InfluxError::Query { status, message });
    }
    let Some(first) = response.results.into_iter().next() else {
        return Ok(QueryResult::default());
    };
    if let Some(message) = first.error {
        return Err(InfluxError::Query { status, message });
    }
    Ok(QueryResult {
        series: first.series,
    })
}
