// v2 buckets API (GET /api/v2/buckets), paged with limit/offset.

use super::{Credentials, InfluxError, InfluxRepo};
use crate::models::{BucketMeta, Container};
use serde::Deserialize;
use std::collections::HashSet;
use tracing::{instrument, warn};

/// Largest page the buckets API accepts.
const PAGE_LIMIT: usize = 100;

#[derive(Debug, Deserialize)]
struct BucketsPage {
    #[serde(default)]
    buckets: Vec<BucketBody>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BucketBody {
    id: String,
    name: String,
    #[serde(default)]
    retention_rules: Vec<RetentionRule>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RetentionRule {
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    every_seconds: u64,
}

impl BucketBody {
    fn into_container(self) -> Container {
        let retention_seconds = self
            .retention_rules
            .iter()
            .find(|r| r.kind.as_deref().is_none_or(|k| k == "expire"))
            .map(|r| r.every_seconds)
            .filter(|secs| *secs > 0);
        Container::bucket(
            self.name,
            BucketMeta {
                id: self.id,
                retention_seconds,
            },
        )
    }
}

fn bucket_id(c: &Container) -> String {
    c.bucket
        .as_ref()
        .map_or_else(|| c.name.clone(), |meta| meta.id.clone())
}

impl InfluxRepo {
    /// Every bucket of the organisation, in server order.
    /// Paging stops on a short page or on a page that repeats already seen ids
    /// (a server or proxy ignoring `offset`).
    #[instrument(skip(self), fields(repo = "influx", operation = "list_buckets"))]
    pub async fn list_buckets(&self) -> Result<Vec<Container>, InfluxError> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        loop {
            let page = self.fetch_buckets_page(PAGE_LIMIT, out.len()).await?;
            let n = page.len();
            let before = out.len();
            out.extend(page.into_iter().filter(|c| seen.insert(bucket_id(c))));
            if n < PAGE_LIMIT {
                break;
            }
            if out.len() == before {
                warn!(offset = before, "bucket page repeated known ids; stopping");
                break;
            }
        }
        Ok(out)
    }

    pub(super) async fn fetch_buckets_page(
        &self,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Container>, InfluxError> {
        let Credentials::V2 { token, org } = &self.credentials else {
            return Err(InfluxError::Unsupported("bucket listing"));
        };
        let url = format!("{}/api/v2/buckets", self.base_url);
        let request = self
            .client
            .get(&url)
            .query(&[
                ("org", org.clone()),
                ("limit", limit.to_string()),
                ("offset", offset.to_string()),
            ])
            .header(reqwest::header::AUTHORIZATION, format!("Token {}", token));
        let (_, body) = self.send(request).await?;
        let page: BucketsPage =
            serde_json::from_str(&body).map_err(|e| InfluxError::Decode(e.to_string()))?;
        Ok(page
            .buckets
            .into_iter()
            .map(BucketBody::into_container)
            .collect())
    }
}
