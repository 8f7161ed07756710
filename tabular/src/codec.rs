//! Field value ⇄ byte payload conversion.
//!
//! [`ValueCaster`] is the pluggable converter that renders each kind of
//! scalar or container value as bytes. [`ValueCodec`] sits in front of it:
//! it resolves the logical type of a field, checks the value against that
//! type, and dispatches to the caster. It also narrows field values to
//! 64-bit timestamps.

use bytes::Bytes;
use chrono::{DateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;

use crate::error::{Error, Result};
use crate::model::{ColumnMap, FieldSchema, LogicalType, Record, Value, resolve_type};

/// Renders typed values as byte payloads.
///
/// Byte arrays are never passed to the caster; their payload is the bytes
/// themselves.
pub trait ValueCaster: Send + Sync {
    fn string_to_bytes(&self, value: &str) -> Result<Bytes>;
    fn int_to_bytes(&self, value: i32) -> Result<Bytes>;
    fn long_to_bytes(&self, value: i64) -> Result<Bytes>;
    fn float_to_bytes(&self, value: f32) -> Result<Bytes>;
    fn double_to_bytes(&self, value: f64) -> Result<Bytes>;
    fn big_integer_to_bytes(&self, value: i128) -> Result<Bytes>;
    fn big_decimal_to_bytes(&self, value: &Decimal) -> Result<Bytes>;
    fn boolean_to_bytes(&self, value: bool) -> Result<Bytes>;
    fn date_time_to_bytes(&self, value: &DateTime<Utc>) -> Result<Bytes>;
    fn map_to_bytes(&self, value: &ColumnMap) -> Result<Bytes>;
    fn tuple_to_bytes(&self, value: &[Value]) -> Result<Bytes>;
    fn bag_to_bytes(&self, value: &[Vec<Value>]) -> Result<Bytes>;
}

/// [`ValueCaster`] that writes every value as UTF-8 text.
///
/// Scalars use their plain text form, datetimes are RFC 3339 with
/// millisecond precision, maps render as `[k#v,k#v]`, tuples as `(a,b)` and
/// bags as `{(a),(b)}`. Nulls nested inside containers render as empty text.
#[derive(Debug, Default, Clone, Copy)]
pub struct Utf8Caster;

impl Utf8Caster {
    fn write_text(value: &Value, out: &mut String) {
        match value {
            Value::Null => {}
            Value::Bytes(bytes) => out.push_str(&String::from_utf8_lossy(bytes)),
            Value::String(s) => out.push_str(s),
            Value::Int(v) => out.push_str(&v.to_string()),
            Value::Long(v) => out.push_str(&v.to_string()),
            Value::Float(v) => out.push_str(&v.to_string()),
            Value::Double(v) => out.push_str(&v.to_string()),
            Value::BigInteger(v) => out.push_str(&v.to_string()),
            Value::BigDecimal(v) => out.push_str(&v.to_string()),
            Value::Boolean(v) => out.push_str(if *v { "true" } else { "false" }),
            Value::DateTime(v) => out.push_str(&v.to_rfc3339_opts(SecondsFormat::Millis, true)),
            Value::Map(map) => Self::write_map(map, out),
            Value::Tuple(fields) => Self::write_tuple(fields, out),
            Value::Bag(tuples) => Self::write_bag(tuples, out),
        }
    }

    fn write_map(map: &ColumnMap, out: &mut String) {
        out.push('[');
        for (i, (key, value)) in map.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            out.push_str(key);
            out.push('#');
            Self::write_text(value, out);
        }
        out.push(']');
    }

    fn write_tuple(fields: &[Value], out: &mut String) {
        out.push('(');
        for (i, field) in fields.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            Self::write_text(field, out);
        }
        out.push(')');
    }

    fn write_bag(tuples: &[Vec<Value>], out: &mut String) {
        out.push('{');
        for (i, tuple) in tuples.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            Self::write_tuple(tuple, out);
        }
        out.push('}');
    }

    fn text(value: impl ToString) -> Result<Bytes> {
        Ok(Bytes::from(value.to_string()))
    }
}

impl ValueCaster for Utf8Caster {
    fn string_to_bytes(&self, value: &str) -> Result<Bytes> {
        Ok(Bytes::copy_from_slice(value.as_bytes()))
    }

    fn int_to_bytes(&self, value: i32) -> Result<Bytes> {
        Self::text(value)
    }

    fn long_to_bytes(&self, value: i64) -> Result<Bytes> {
        Self::text(value)
    }

    fn float_to_bytes(&self, value: f32) -> Result<Bytes> {
        Self::text(value)
    }

    fn double_to_bytes(&self, value: f64) -> Result<Bytes> {
        Self::text(value)
    }

    fn big_integer_to_bytes(&self, value: i128) -> Result<Bytes> {
        Self::text(value)
    }

    fn big_decimal_to_bytes(&self, value: &Decimal) -> Result<Bytes> {
        Self::text(value)
    }

    fn boolean_to_bytes(&self, value: bool) -> Result<Bytes> {
        Self::text(value)
    }

    fn date_time_to_bytes(&self, value: &DateTime<Utc>) -> Result<Bytes> {
        Self::text(value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    fn map_to_bytes(&self, value: &ColumnMap) -> Result<Bytes> {
        let mut out = String::new();
        Self::write_map(value, &mut out);
        Ok(Bytes::from(out))
    }

    fn tuple_to_bytes(&self, value: &[Value]) -> Result<Bytes> {
        let mut out = String::new();
        Self::write_tuple(value, &mut out);
        Ok(Bytes::from(out))
    }

    fn bag_to_bytes(&self, value: &[Vec<Value>]) -> Result<Bytes> {
        let mut out = String::new();
        Self::write_bag(value, &mut out);
        Ok(Bytes::from(out))
    }
}

/// Typed facade over a [`ValueCaster`].
#[derive(Debug, Default, Clone)]
pub struct ValueCodec<C = Utf8Caster> {
    caster: C,
}

impl<C: ValueCaster> ValueCodec<C> {
    pub fn new(caster: C) -> Self {
        Self { caster }
    }

    /// Encodes field `position` of `record`, taking its logical type from
    /// `schema` when present.
    ///
    /// Returns `Ok(None)` for a missing or null field.
    pub fn encode_field(
        &self,
        record: &Record,
        position: usize,
        schema: Option<&FieldSchema>,
    ) -> Result<Option<Bytes>> {
        match record.get(position) {
            Some(value) => {
                self.encode(position, value, resolve_type(value, position, schema))
            }
            None => Ok(None),
        }
    }

    /// Encodes `value` as `logical_type`.
    ///
    /// A null value, or a value declared as the null type, has no payload and
    /// yields `Ok(None)`; callers omit the column. A value whose runtime kind
    /// does not match `logical_type` fails with [`Error::UnsupportedType`].
    pub fn encode(
        &self,
        position: usize,
        value: &Value,
        logical_type: LogicalType,
    ) -> Result<Option<Bytes>> {
        let caster = &self.caster;
        let bytes = match (logical_type, value) {
            (_, Value::Null) | (LogicalType::Null, _) => return Ok(None),
            (LogicalType::ByteArray, Value::Bytes(v)) => v.clone(),
            (LogicalType::CharArray, Value::String(v)) => caster.string_to_bytes(v)?,
            (LogicalType::Int, Value::Int(v)) => caster.int_to_bytes(*v)?,
            (LogicalType::Long, Value::Long(v)) => caster.long_to_bytes(*v)?,
            (LogicalType::Float, Value::Float(v)) => caster.float_to_bytes(*v)?,
            (LogicalType::Double, Value::Double(v)) => caster.double_to_bytes(*v)?,
            (LogicalType::BigInteger, Value::BigInteger(v)) => caster.big_integer_to_bytes(*v)?,
            (LogicalType::BigDecimal, Value::BigDecimal(v)) => caster.big_decimal_to_bytes(v)?,
            (LogicalType::Boolean, Value::Boolean(v)) => caster.boolean_to_bytes(*v)?,
            (LogicalType::DateTime, Value::DateTime(v)) => caster.date_time_to_bytes(v)?,
            (LogicalType::Map, Value::Map(v)) => caster.map_to_bytes(v)?,
            (LogicalType::Tuple, Value::Tuple(v)) => caster.tuple_to_bytes(v)?,
            (LogicalType::Bag, Value::Bag(v)) => caster.bag_to_bytes(v)?,
            (_, other) => {
                return Err(Error::UnsupportedType {
                    position,
                    observed: other.logical_type(),
                });
            }
        };
        Ok(Some(bytes))
    }

    /// Reads field `position` of `record` as a timestamp.
    pub fn timestamp_field(
        &self,
        record: &Record,
        position: usize,
        schema: Option<&FieldSchema>,
    ) -> Result<i64> {
        let value = record.get(position).unwrap_or(&Value::Null);
        self.decode_timestamp(position, value, resolve_type(value, position, schema))
    }

    /// Converts `value` to a 64-bit timestamp.
    ///
    /// Integers convert directly and floating point values truncate toward
    /// zero. Text and byte arrays must hold a base-10 integer literal. Big
    /// integers and decimals are narrowed to 64 bits; when narrowing changes
    /// the value a warning is logged and the narrowed value is returned.
    pub fn decode_timestamp(
        &self,
        position: usize,
        value: &Value,
        logical_type: LogicalType,
    ) -> Result<i64> {
        match (logical_type, value) {
            (LogicalType::Long, Value::Long(v)) => Ok(*v),
            (LogicalType::Int, Value::Int(v)) => Ok(i64::from(*v)),
            (LogicalType::Float, Value::Float(v)) => Ok(*v as i64),
            (LogicalType::Double, Value::Double(v)) => Ok(*v as i64),
            (LogicalType::CharArray, Value::String(v)) => parse_timestamp(position, v),
            (LogicalType::ByteArray, Value::Bytes(v)) => match std::str::from_utf8(v) {
                Ok(text) => parse_timestamp(position, text),
                Err(_) => Err(Error::Format {
                    position,
                    message: format!("could not cast bytes into long: {:?}", v),
                }),
            },
            (LogicalType::BigInteger, Value::BigInteger(v)) => {
                let narrowed = *v as i64;
                if i128::from(narrowed) != *v {
                    tracing::warn!(
                        position,
                        original = %v,
                        narrowed,
                        "narrowing big integer to a 64-bit timestamp changed its value"
                    );
                }
                Ok(narrowed)
            }
            (LogicalType::BigDecimal, Value::BigDecimal(v)) => {
                let (narrowed, exact) = narrow_decimal(v);
                if !exact {
                    tracing::warn!(
                        position,
                        original = %v,
                        narrowed,
                        "narrowing big decimal to a 64-bit timestamp lost information"
                    );
                }
                Ok(narrowed)
            }
            (_, other) => Err(Error::UnsupportedType {
                position,
                observed: other.logical_type(),
            }),
        }
    }
}

fn parse_timestamp(position: usize, text: &str) -> Result<i64> {
    text.parse::<i64>().map_err(|err| Error::Format {
        position,
        message: format!("could not cast '{}' into long: {}", text, err),
    })
}

/// Truncates the fraction and keeps the low 64 bits of the integral part.
/// The flag is true when no information was lost.
fn narrow_decimal(value: &Decimal) -> (i64, bool) {
    let integral = value.trunc();
    let wide = integral.mantissa() / 10_i128.pow(integral.scale());
    let narrowed = wide as i64;
    let exact = value.fract().is_zero() && i128::from(narrowed) == wide;
    (narrowed, exact)
}
