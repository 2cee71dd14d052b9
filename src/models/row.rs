// Typed query rows. InfluxQL series arrive as column names plus JSON value arrays;
// a Schema picks the columns a statement needs and checks their kinds.

use super::timestamp::{TimestampParseError, parse_influx_timestamp};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Float,
    Integer,
    Boolean,
    Timestamp,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FieldKind::String => "string",
            FieldKind::Float => "float",
            FieldKind::Integer => "integer",
            FieldKind::Boolean => "boolean",
            FieldKind::Timestamp => "timestamp",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    String(String),
    Float(f64),
    Integer(i64),
    Boolean(bool),
    Timestamp(DateTime<Utc>),
    Null,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub value: FieldValue,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RowError {
    #[error("column {0:?} missing from series")]
    MissingColumn(String),
    #[error("column {0:?} is null")]
    Null(String),
    #[error("column {column:?}: expected {expected}, found {found}")]
    TypeMismatch {
        column: String,
        expected: FieldKind,
        found: &'static str,
    },
    #[error("column {column:?}: {source}")]
    Timestamp {
        column: String,
        #[source]
        source: TimestampParseError,
    },
}

#[derive(Debug, Clone)]
struct ColumnDef {
    name: &'static str,
    kind: FieldKind,
    required: bool,
}

/// Columns (name, kind, required) a statement's rows must carry.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    columns: Vec<ColumnDef>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(mut self, name: &'static str, kind: FieldKind) -> Self {
        self.columns.push(ColumnDef {
            name,
            kind,
            required: true,
        });
        self
    }

    /// Missing or null values become [`FieldValue::Null`] instead of an error.
    pub fn optional(mut self, name: &'static str, kind: FieldKind) -> Self {
        self.columns.push(ColumnDef {
            name,
            kind,
            required: false,
        });
        self
    }
}

/// One row, holding the schema's columns in schema order.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    fields: Vec<Field>,
}

impl Row {
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|f| f.name == name).map(|f| &f.value)
    }

    pub fn str(&self, name: &str) -> Option<&str> {
        match self.get(name) {
            Some(FieldValue::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn bool(&self, name: &str) -> Option<bool> {
        match self.get(name) {
            Some(FieldValue::Boolean(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn float(&self, name: &str) -> Option<f64> {
        match self.get(name) {
            Some(FieldValue::Float(v)) => Some(*v),
            Some(FieldValue::Integer(v)) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn timestamp(&self, name: &str) -> Option<DateTime<Utc>> {
        match self.get(name) {
            Some(FieldValue::Timestamp(ts)) => Some(*ts),
            _ => None,
        }
    }
}

/// One series of an InfluxQL statement result, as it appears on the wire.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Series {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub values: Vec<Vec<Value>>,
}

impl Series {
    /// Typed rows; each row is validated on its own so one bad row does not hide the others.
    pub fn rows<'a>(
        &'a self,
        schema: &'a Schema,
    ) -> impl Iterator<Item = Result<Row, RowError>> + 'a {
        let positions: Vec<Option<usize>> = schema
            .columns
            .iter()
            .map(|c| self.columns.iter().position(|name| name == c.name))
            .collect();
        self.values
            .iter()
            .map(move |values| typed_row(schema, &positions, values))
    }
}

/// Series of the (single) statement result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    pub series: Vec<Series>,
}

impl QueryResult {
    pub fn is_empty(&self) -> bool {
        self.series.iter().all(|s| s.values.is_empty())
    }

    /// Rows of every series, in server order.
    pub fn rows<'a>(
        &'a self,
        schema: &'a Schema,
    ) -> impl Iterator<Item = Result<Row, RowError>> + 'a {
        self.series.iter().flat_map(move |s| s.rows(schema))
    }
}

fn typed_row(
    schema: &Schema,
    positions: &[Option<usize>],
    values: &[Value],
) -> Result<Row, RowError> {
    let mut fields = Vec::with_capacity(schema.columns.len());
    for (col, pos) in schema.columns.iter().zip(positions) {
        let raw = pos.and_then(|i| values.get(i));
        let value = match (raw, col.required) {
            (None, true) => return Err(RowError::MissingColumn(col.name.to_string())),
            (Some(Value::Null), true) => return Err(RowError::Null(col.name.to_string())),
            (None | Some(Value::Null), false) => FieldValue::Null,
            (Some(v), _) => convert(col, v)?,
        };
        fields.push(Field {
            name: col.name.to_string(),
            value,
        });
    }
    Ok(Row { fields })
}

fn convert(col: &ColumnDef, value: &Value) -> Result<FieldValue, RowError> {
    let mismatch = || RowError::TypeMismatch {
        column: col.name.to_string(),
        expected: col.kind,
        found: json_kind(value),
    };
    match (col.kind, value) {
        (FieldKind::String, Value::String(s)) => Ok(FieldValue::String(s.clone())),
        (FieldKind::Float, Value::Number(n)) => {
            n.as_f64().map(FieldValue::Float).ok_or_else(mismatch)
        }
        (FieldKind::Integer, Value::Number(n)) => {
            n.as_i64().map(FieldValue::Integer).ok_or_else(mismatch)
        }
        (FieldKind::Boolean, Value::Bool(b)) => Ok(FieldValue::Boolean(*b)),
        (FieldKind::Timestamp, Value::String(s)) => parse_influx_timestamp(s)
            .map(FieldValue::Timestamp)
            .map_err(|source| RowError::Timestamp {
                column: col.name.to_string(),
                source,
            }),
        _ => Err(mismatch()),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
