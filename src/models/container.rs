// Container (v1 database / v2 bucket) models

use serde::{Deserialize, Serialize};

/// v1 retention policy as returned by SHOW RETENTION POLICIES.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionPolicy {
    pub name: String,
    pub duration: String,
    #[serde(default)]
    pub default: bool,
}

impl RetentionPolicy {
    /// Duration for display; "0s" means data is kept forever.
    pub fn duration_display(&self) -> &str {
        if self.duration.is_empty() || self.duration == "0s" {
            "infinite"
        } else {
            &self.duration
        }
    }
}

/// v2 bucket metadata from the buckets API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketMeta {
    pub id: String,
    /// None when the bucket has no expire rule (or everySeconds = 0).
    pub retention_seconds: Option<u64>,
}

impl BucketMeta {
    pub fn retention_display(&self) -> String {
        match self.retention_seconds {
            Some(secs) => secs.to_string(),
            None => "infinite".to_string(),
        }
    }
}

/// Top-level namespace holding measurements. Immutable for the duration of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Container {
    pub name: String,
    #[serde(default)]
    pub retention_policies: Vec<RetentionPolicy>,
    #[serde(default)]
    pub bucket: Option<BucketMeta>,
}

impl Container {
    pub fn database(name: impl Into<String>, retention_policies: Vec<RetentionPolicy>) -> Self {
        Self {
            name: name.into(),
            retention_policies,
            bucket: None,
        }
    }

    pub fn bucket(name: impl Into<String>, meta: BucketMeta) -> Self {
        Self {
            name: name.into(),
            retention_policies: Vec::new(),
            bucket: Some(meta),
        }
    }

    /// Name-only container, e.g. one named on the command line.
    pub fn named(name: impl Into<String>) -> Self {
        Self::database(name, Vec::new())
    }
}
