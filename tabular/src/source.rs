//! Reading records from a cell store.

use std::sync::Arc;

use common::{BytesRange, CellRead};

use crate::codec::{Utf8Caster, ValueCaster};
use crate::error::Result;
use crate::model::Record;
use crate::transcoder::Transcoder;

/// Reads rows from a [`CellRead`] and decodes them into records.
pub struct RowSource<R, C = Utf8Caster> {
    transcoder: Arc<Transcoder<C>>,
    reader: R,
}

impl<R: CellRead, C: ValueCaster> RowSource<R, C> {
    pub fn new(transcoder: Arc<Transcoder<C>>, reader: R) -> Self {
        Self { transcoder, reader }
    }

    /// Reads and decodes one row. A row with no cells yields no records.
    #[tracing::instrument(level = "trace", skip_all)]
    pub async fn read_row(&self, row: &[u8]) -> Result<Vec<Record>> {
        let cells = self.reader.scan_row(row).await?;
        if cells.is_empty() {
            return Ok(Vec::new());
        }
        self.transcoder.decode_row(&cells)
    }

    /// Reads every row whose identifier falls in `rows`, decoding each row
    /// on its own.
    #[tracing::instrument(level = "trace", skip_all)]
    pub async fn read_range(&self, rows: BytesRange) -> Result<Vec<Record>> {
        let cells = self.reader.scan(rows).await?;
        let mut records = Vec::new();
        for row in cells.chunk_by(|a, b| a.row == b.row) {
            records.extend(self.transcoder.decode_row(row)?);
        }
        Ok(records)
    }

    pub fn reader(&self) -> &R {
        &self.reader
    }
}
