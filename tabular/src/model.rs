//! Core data types for structured records.
//!
//! A [`Record`] is an ordered list of [`Value`]s whose first field is the row
//! identifier. Each value carries its own [`LogicalType`]; an optional
//! [`FieldSchema`] can declare the type of each position instead.

use std::collections::BTreeMap;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A key-ordered map from column key to value.
///
/// Decoded rows produce one `ColumnMap` per column group; on encode every
/// entry of a map-typed field becomes its own column.
pub type ColumnMap = BTreeMap<String, Value>;

/// The logical type of a record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogicalType {
    Null,
    Boolean,
    Int,
    Long,
    Float,
    Double,
    DateTime,
    ByteArray,
    CharArray,
    BigInteger,
    BigDecimal,
    Map,
    Tuple,
    Bag,
}

/// A single field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bytes(Bytes),
    String(String),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    /// An integer wider than 64 bits.
    BigInteger(i128),
    BigDecimal(Decimal),
    Boolean(bool),
    DateTime(DateTime<Utc>),
    Map(ColumnMap),
    Tuple(Vec<Value>),
    /// An unordered collection of tuples.
    Bag(Vec<Vec<Value>>),
}

impl Value {
    /// Infers the logical type from the value itself.
    pub fn logical_type(&self) -> LogicalType {
        match self {
            Value::Null => LogicalType::Null,
            Value::Bytes(_) => LogicalType::ByteArray,
            Value::String(_) => LogicalType::CharArray,
            Value::Int(_) => LogicalType::Int,
            Value::Long(_) => LogicalType::Long,
            Value::Float(_) => LogicalType::Float,
            Value::Double(_) => LogicalType::Double,
            Value::BigInteger(_) => LogicalType::BigInteger,
            Value::BigDecimal(_) => LogicalType::BigDecimal,
            Value::Boolean(_) => LogicalType::Boolean,
            Value::DateTime(_) => LogicalType::DateTime,
            Value::Map(_) => LogicalType::Map,
            Value::Tuple(_) => LogicalType::Tuple,
            Value::Bag(_) => LogicalType::Bag,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_map(&self) -> Option<&ColumnMap> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Value::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<Bytes> for Value {
    fn from(value: Bytes) -> Self {
        Value::Bytes(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Long(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Float(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Double(value)
    }
}

impl From<i128> for Value {
    fn from(value: i128) -> Self {
        Value::BigInteger(value)
    }
}

impl From<Decimal> for Value {
    fn from(value: Decimal) -> Self {
        Value::BigDecimal(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Value::DateTime(value)
    }
}

impl From<ColumnMap> for Value {
    fn from(value: ColumnMap) -> Self {
        Value::Map(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

/// A structured record: an ordered list of fields, field 0 being the row.
///
/// # Example
///
/// ```
/// use tabular::{ColumnMap, Record, Value};
///
/// let mut columns = ColumnMap::new();
/// columns.insert("name".to_string(), Value::from("ada"));
///
/// let record = Record::new("user-1").with("active").with(columns);
/// assert_eq!(record.len(), 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<Value>,
}

impl Record {
    /// Creates a record holding only the row identifier.
    pub fn new(row: impl Into<Value>) -> Self {
        Self {
            fields: vec![row.into()],
        }
    }

    pub fn from_fields(fields: Vec<Value>) -> Self {
        Self { fields }
    }

    /// Appends a field, returning the record.
    pub fn with(mut self, field: impl Into<Value>) -> Self {
        self.fields.push(field.into());
        self
    }

    pub fn push(&mut self, field: impl Into<Value>) {
        self.fields.push(field.into());
    }

    /// The row identifier, if the record has any fields.
    pub fn row(&self) -> Option<&Value> {
        self.fields.first()
    }

    pub fn get(&self, position: usize) -> Option<&Value> {
        self.fields.get(position)
    }

    pub fn fields(&self) -> &[Value] {
        &self.fields
    }

    pub fn into_fields(self) -> Vec<Value> {
        self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Declared logical types for the fields of a record, by position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldSchema(Vec<LogicalType>);

impl FieldSchema {
    pub fn new(types: Vec<LogicalType>) -> Self {
        Self(types)
    }

    /// The declared type at `position`, if the schema covers it.
    pub fn type_at(&self, position: usize) -> Option<LogicalType> {
        self.0.get(position).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<LogicalType> for FieldSchema {
    fn from_iter<I: IntoIterator<Item = LogicalType>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Resolves the logical type of `value` at `position`, preferring the schema.
pub(crate) fn resolve_type(
    value: &Value,
    position: usize,
    schema: Option<&FieldSchema>,
) -> LogicalType {
    schema
        .and_then(|schema| schema.type_at(position))
        .unwrap_or_else(|| value.logical_type())
}
