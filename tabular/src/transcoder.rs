//! The configurable transcoding engine.

use common::{Cell, Mutation, MutationBatch};

use crate::codec::{Utf8Caster, ValueCaster};
use crate::config::TranscoderConfig;
use crate::decoder::RowDecoder;
use crate::encoder::RecordEncoder;
use crate::error::Result;
use crate::model::{FieldSchema, Record};

/// Converts between cells of the store and structured records.
///
/// Decode and encode are independent and symmetric: both follow the
/// [`Layout`](crate::Layout) of the configuration the transcoder was built
/// from. A transcoder holds no mutable state, so it can be shared between
/// tasks behind an `Arc`.
#[derive(Debug, Clone)]
pub struct Transcoder<C = Utf8Caster> {
    config: TranscoderConfig,
    decoder: RowDecoder,
    encoder: RecordEncoder<C>,
}

impl Transcoder {
    pub fn new(config: TranscoderConfig) -> Self {
        Self::with_caster(config, Utf8Caster)
    }
}

impl Default for Transcoder {
    fn default() -> Self {
        Self::new(TranscoderConfig::default())
    }
}

impl<C: ValueCaster> Transcoder<C> {
    /// Creates a transcoder that renders field values with `caster`.
    pub fn with_caster(config: TranscoderConfig, caster: C) -> Self {
        let decoder = RowDecoder::new(config.layout.decode_mode());
        let encoder = RecordEncoder::with_caster(config.layout.encode_mode(), caster);
        Self {
            config,
            decoder,
            encoder,
        }
    }

    pub fn config(&self) -> &TranscoderConfig {
        &self.config
    }

    /// Decodes the sorted cells of one row.
    pub fn decode_row(&self, cells: &[Cell]) -> Result<Vec<Record>> {
        self.decoder.decode(cells)
    }

    /// Encodes one record into a mutation for its row.
    ///
    /// Returns `Ok(None)` when the record produces no columns.
    pub fn encode_record(
        &self,
        record: &Record,
        schema: Option<&FieldSchema>,
    ) -> Result<Option<Mutation>> {
        self.encoder.encode(record, schema)
    }

    /// Encodes `records` and accumulates the mutations by row.
    ///
    /// Records that produce no columns are skipped. The first failing record
    /// aborts the batch.
    pub fn encode_batch<'a>(
        &self,
        records: impl IntoIterator<Item = &'a Record>,
        schema: Option<&FieldSchema>,
    ) -> Result<MutationBatch> {
        let mut batch = MutationBatch::new();
        for record in records {
            if let Some(mutation) = self.encode_record(record, schema)? {
                batch.apply(mutation);
            }
        }
        Ok(batch)
    }
}
