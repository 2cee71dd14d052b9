// Distinct tag values (normally "host") of a measurement or a whole container.

use crate::influx_repo::{InfluxError, InfluxRepo};
use crate::influxql;
use crate::lister::distinct_strings;
use tracing::instrument;

/// Default tag used to identify a host.
pub const DEFAULT_TAG: &str = "host";

/// Values of `tag` in `measurement`, or across the container when `measurement` is None.
/// SHOW TAG VALUES returns one series per measurement; values are merged, sorted and de-duplicated.
#[instrument(skip(repo), fields(operation = "list_tag_values"))]
pub async fn list_tag_values(
    repo: &InfluxRepo,
    container: &str,
    measurement: Option<&str>,
    tag: &str,
) -> Result<Vec<String>, InfluxError> {
    let statement = influxql::show_tag_values(container, measurement, tag);
    let result = repo.run_query(Some(container), &statement).await?;
    Ok(distinct_strings(&result, "value", &statement))
}
