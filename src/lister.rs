// Container (database/bucket) and measurement listing.

use crate::influx_repo::{ApiVersion, InfluxError, InfluxRepo};
use crate::influxql;
use crate::models::{Container, FieldKind, QueryResult, RetentionPolicy, Schema};
use tracing::{instrument, warn};

/// All containers visible to the credentials, sorted by name. An empty server is not an error.
pub async fn list_containers(repo: &InfluxRepo) -> Result<Vec<Container>, InfluxError> {
    let mut containers = match repo.api_version() {
        ApiVersion::V1 => list_databases(repo).await?,
        ApiVersion::V2 => repo.list_buckets().await?,
    };
    containers.sort_by(|a, b| a.name.cmp(&b.name));
    containers.dedup_by(|a, b| a.name == b.name);
    Ok(containers)
}

#[instrument(skip(repo), fields(operation = "list_databases"))]
async fn list_databases(repo: &InfluxRepo) -> Result<Vec<Container>, InfluxError> {
    let statement = influxql::show_databases();
    let result = repo.run_query(None, &statement).await?;
    let names = distinct_strings(&result, "name", &statement);

    let mut out = Vec::with_capacity(names.len());
    for name in names {
        // A database without readable policies is still listed.
        let policies = match retention_policies(repo, &name).await {
            Ok(p) => p,
            Err(e) => {
                warn!(database = %name, error = %e, "retention policy query failed");
                Vec::new()
            }
        };
        out.push(Container::database(name, policies));
    }
    Ok(out)
}

/// v1 retention policies of one database.
pub async fn retention_policies(
    repo: &InfluxRepo,
    database: &str,
) -> Result<Vec<RetentionPolicy>, InfluxError> {
    let statement = influxql::show_retention_policies(database);
    let result = repo.run_query(Some(database), &statement).await?;
    let schema = Schema::new()
        .required("name", FieldKind::String)
        .required("duration", FieldKind::String)
        .optional("default", FieldKind::Boolean);

    let mut policies = Vec::new();
    for row in result.rows(&schema) {
        match row {
            Ok(row) => policies.push(RetentionPolicy {
                name: row.str("name").unwrap_or_default().to_string(),
                duration: row.str("duration").unwrap_or_default().to_string(),
                default: row.bool("default").unwrap_or(false),
            }),
            Err(e) => warn!(database, error = %e, "skipping retention policy row"),
        }
    }
    Ok(policies)
}

/// Measurement names of one container, sorted and de-duplicated.
#[instrument(skip(repo), fields(operation = "list_measurements"))]
pub async fn list_measurements(
    repo: &InfluxRepo,
    container: &str,
) -> Result<Vec<String>, InfluxError> {
    let statement = influxql::show_measurements();
    let result = repo.run_query(Some(container), &statement).await?;
    Ok(distinct_strings(&result, "name", &statement))
}

/// Sorted, de-duplicated values of a string column across every series.
/// Rows that do not carry the column as a string are logged and skipped.
pub(crate) fn distinct_strings(
    result: &QueryResult,
    column: &'static str,
    statement: &str,
) -> Vec<String> {
    let schema = Schema::new().required(column, FieldKind::String);
    let mut out: Vec<String> = result
        .rows(&schema)
        .filter_map(|row| match row {
            Ok(row) => row.str(column).map(str::to_string),
            Err(e) => {
                warn!(statement, error = %e, "skipping row");
                None
            }
        })
        .collect();
    out.sort();
    out.dedup();
    out
}
