// Domain models: containers, host records/summaries, typed query rows, timestamps

mod container;
mod host;
mod row;
pub mod timestamp;

pub use container::{BucketMeta, Container, RetentionPolicy};
pub use host::{HostRecord, HostSummaries, HostSummary};
pub use row::{Field, FieldKind, FieldValue, QueryResult, Row, RowError, Schema, Series};
pub use timestamp::TimestampParseError;
