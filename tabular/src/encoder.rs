//! Encoding of structured records into row mutations.

use bytes::Bytes;
use common::{ColumnUpdate, Mutation};

use crate::codec::{Utf8Caster, ValueCaster, ValueCodec};
use crate::column_spec::ColumnSpecs;
use crate::error::{Error, Result};
use crate::model::{ColumnMap, FieldSchema, LogicalType, Record, Value, resolve_type};

const FIXED_ROW: usize = 0;
const FIXED_FAMILY: usize = 1;
const FIXED_QUALIFIER: usize = 2;
const FIXED_VISIBILITY: usize = 3;
const FIXED_TIMESTAMP: usize = 4;
const FIXED_MIN_FIELDS: usize = 4;
const FIXED_VISIBILITY_FIELDS: usize = 5;
const FIXED_MAX_FIELDS: usize = 6;

/// How record fields map onto columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodeMode {
    /// Fields are `row, family, qualifier, [visibility], [timestamp], value`.
    Fixed,
    /// Field 0 is the row; field `i` is written to the column declared by
    /// spec `i - 1`, with map fields flattened into one column per entry.
    Columns(ColumnSpecs),
}

impl Default for EncodeMode {
    fn default() -> Self {
        EncodeMode::Columns(ColumnSpecs::default())
    }
}

/// Encodes records into [`Mutation`]s.
///
/// Each call allocates its own buffers, so one encoder can be shared across
/// threads.
#[derive(Debug, Clone, Default)]
pub struct RecordEncoder<C = Utf8Caster> {
    mode: EncodeMode,
    codec: ValueCodec<C>,
}

impl RecordEncoder {
    pub fn new(mode: EncodeMode) -> Self {
        Self::with_caster(mode, Utf8Caster)
    }
}

impl<C: ValueCaster> RecordEncoder<C> {
    pub fn with_caster(mode: EncodeMode, caster: C) -> Self {
        Self {
            mode,
            codec: ValueCodec::new(caster),
        }
    }

    pub fn mode(&self) -> &EncodeMode {
        &self.mode
    }

    /// Encodes `record`, taking field types from `schema` when present.
    ///
    /// Returns `Ok(None)` when the record resolves to no columns, which is a
    /// legitimate no-op rather than an error.
    pub fn encode(&self, record: &Record, schema: Option<&FieldSchema>) -> Result<Option<Mutation>> {
        let mutation = match &self.mode {
            EncodeMode::Fixed => self.encode_fixed(record, schema)?,
            EncodeMode::Columns(specs) => {
                if record.len() <= 1 {
                    tracing::debug!(fields = record.len(), "ignoring record without columns");
                    return Ok(None);
                }
                self.encode_columns(record, specs, schema)?
            }
        };
        Ok(Some(mutation).filter(|mutation| !mutation.is_empty()))
    }

    fn encode_fixed(&self, record: &Record, schema: Option<&FieldSchema>) -> Result<Mutation> {
        let fields = record.len();
        if fields < FIXED_MIN_FIELDS {
            return Err(Error::InvalidInput(format!(
                "fixed layout needs at least {} fields, got {}",
                FIXED_MIN_FIELDS, fields
            )));
        }
        if fields > FIXED_MAX_FIELDS {
            tracing::warn!(
                fields,
                "ignoring fields beyond position {}",
                FIXED_MAX_FIELDS - 1
            );
        }

        let mut mutation = Mutation::new(self.row(record, schema)?);
        let value_position = fields.min(FIXED_MAX_FIELDS) - 1;
        let Some(value) = self.codec.encode_field(record, value_position, schema)? else {
            tracing::warn!(position = value_position, "skipping column with null value");
            return Ok(mutation);
        };

        let family = self.key_part(record, FIXED_FAMILY, schema)?;
        let qualifier = self.key_part(record, FIXED_QUALIFIER, schema)?;
        let mut update = ColumnUpdate::new(family, qualifier, value);
        if fields >= FIXED_VISIBILITY_FIELDS {
            update = update.with_visibility(self.key_part(record, FIXED_VISIBILITY, schema)?);
        }
        if fields >= FIXED_MAX_FIELDS {
            update = update.with_timestamp(self.codec.timestamp_field(
                record,
                FIXED_TIMESTAMP,
                schema,
            )?);
        }
        mutation.put(update);
        Ok(mutation)
    }

    fn encode_columns(
        &self,
        record: &Record,
        specs: &ColumnSpecs,
        schema: Option<&FieldSchema>,
    ) -> Result<Mutation> {
        let mut mutation = Mutation::new(self.row(record, schema)?);
        for (position, value) in record.fields().iter().enumerate().skip(1) {
            let spec = specs.for_field(position);
            match resolve_type(value, position, schema) {
                LogicalType::Map => {
                    let Some(map) = map_field(position, value)? else {
                        continue;
                    };
                    for (key, entry) in map {
                        let Some(payload) = self.codec.encode(position, entry, entry.logical_type())?
                        else {
                            tracing::warn!(position, key = %key, "skipping null map entry");
                            continue;
                        };
                        let (family, qualifier) = match spec {
                            Some(spec) => (spec.family_bytes(), spec.map_qualifier(key)),
                            None => (Bytes::new(), Bytes::copy_from_slice(key.as_bytes())),
                        };
                        mutation.put(ColumnUpdate::new(family, qualifier, payload));
                    }
                }
                logical_type => {
                    let Some(spec) = spec else {
                        tracing::warn!(position, "no destination column known, skipping field");
                        continue;
                    };
                    let Some(payload) = self.codec.encode(position, value, logical_type)? else {
                        continue;
                    };
                    mutation.put(ColumnUpdate::new(
                        spec.family_bytes(),
                        spec.scalar_qualifier(),
                        payload,
                    ));
                }
            }
        }
        Ok(mutation)
    }

    fn row(&self, record: &Record, schema: Option<&FieldSchema>) -> Result<Bytes> {
        self.codec
            .encode_field(record, FIXED_ROW, schema)?
            .ok_or_else(|| Error::InvalidInput("record has a null row".to_string()))
    }

    /// Encodes a family, qualifier or visibility field; null becomes empty.
    fn key_part(&self, record: &Record, position: usize, schema: Option<&FieldSchema>) -> Result<Bytes> {
        match self.codec.encode_field(record, position, schema)? {
            Some(bytes) => Ok(bytes),
            None => {
                tracing::warn!(position, "creating empty text from null value");
                Ok(Bytes::new())
            }
        }
    }
}

/// Borrows a map-typed field, treating null as absent.
fn map_field(position: usize, value: &Value) -> Result<Option<&ColumnMap>> {
    match value {
        Value::Null => Ok(None),
        Value::Map(map) => Ok(Some(map)),
        other => Err(Error::UnsupportedType {
            position,
            observed: other.logical_type(),
        }),
    }
}
