//! Writing records to a cell store.

use std::sync::Arc;

use common::{CellWrite, MutationBatch};

use crate::codec::{Utf8Caster, ValueCaster};
use crate::error::Result;
use crate::model::{FieldSchema, Record};
use crate::transcoder::Transcoder;

/// Buffers encoded records and writes them to a [`CellWrite`].
///
/// Records for the same row merge into one mutation until the buffer is
/// written. The buffer is written when [`flush`](Self::flush) is called or
/// once its estimated size reaches the flush threshold.
pub struct RecordSink<W, C = Utf8Caster> {
    transcoder: Arc<Transcoder<C>>,
    writer: W,
    schema: Option<FieldSchema>,
    batch: MutationBatch,
    flush_threshold: Option<usize>,
}

impl<W: CellWrite, C: ValueCaster> RecordSink<W, C> {
    pub fn new(transcoder: Arc<Transcoder<C>>, writer: W) -> Self {
        Self {
            transcoder,
            writer,
            schema: None,
            batch: MutationBatch::new(),
            flush_threshold: None,
        }
    }

    /// Declares the field types of appended records.
    pub fn with_schema(mut self, schema: FieldSchema) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Writes the buffer whenever its estimated size reaches `bytes`.
    pub fn with_flush_threshold(mut self, bytes: usize) -> Self {
        self.flush_threshold = Some(bytes);
        self
    }

    /// Encodes `record` into the buffer.
    ///
    /// A record that produces no columns is dropped without error.
    #[tracing::instrument(level = "trace", skip_all)]
    pub async fn append(&mut self, record: &Record) -> Result<()> {
        let Some(mutation) = self
            .transcoder
            .encode_record(record, self.schema.as_ref())?
        else {
            return Ok(());
        };
        self.batch.apply(mutation);
        if let Some(threshold) = self.flush_threshold
            && self.batch.estimate_size() >= threshold
        {
            self.write_pending().await?;
        }
        Ok(())
    }

    /// Writes the buffer and flushes the writer.
    #[tracing::instrument(level = "trace", skip_all)]
    pub async fn flush(&mut self) -> Result<()> {
        self.write_pending().await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// Estimated size of the buffered mutations in bytes.
    pub fn pending_size(&self) -> usize {
        self.batch.estimate_size()
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    /// Writes the buffered mutations. The buffer is kept when the write
    /// fails so a later flush can retry it.
    async fn write_pending(&mut self) -> Result<()> {
        let mutations = self.batch.clone().freeze();
        if !mutations.is_empty() {
            tracing::debug!(rows = mutations.len(), "writing mutations");
            self.writer.write(mutations).await?;
        }
        self.batch = MutationBatch::new();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use bytes::Bytes;
    use common::{Mutation, StorageError, StorageResult};

    use super::*;
    use crate::column_spec::ColumnSpecs;
    use crate::config::{Layout, TranscoderConfig};
    use crate::decoder::Grouping;
    use crate::error::Error;

    #[derive(Default)]
    struct RecordingWriter {
        writes: Mutex<Vec<Vec<Mutation>>>,
        flushes: Mutex<usize>,
        failures: Mutex<usize>,
    }

    impl RecordingWriter {
        fn failing(times: usize) -> Self {
            Self {
                failures: Mutex::new(times),
                ..Default::default()
            }
        }
    }

    #[async_trait]
    impl CellWrite for RecordingWriter {
        async fn write(&self, mutations: Vec<Mutation>) -> StorageResult<()> {
            {
                let mut failures = self.failures.lock().unwrap();
                if *failures > 0 {
                    *failures -= 1;
                    return Err(StorageError::Storage("writer closed".to_string()));
                }
            }
            self.writes.lock().unwrap().push(mutations);
            Ok(())
        }

        async fn flush(&self) -> StorageResult<()> {
            *self.flushes.lock().unwrap() += 1;
            Ok(())
        }
    }

    fn transcoder(spec: &str) -> Arc<Transcoder> {
        Arc::new(Transcoder::new(TranscoderConfig::new(Layout::Columns {
            columns: ColumnSpecs::parse(spec).unwrap(),
            grouping: Grouping::PerFamily,
        })))
    }

    #[tokio::test]
    async fn should_buffer_until_flush() {
        // given
        let mut sink = RecordSink::new(transcoder("cf:a"), RecordingWriter::default());

        // when
        sink.append(&Record::new("row1").with("v1")).await.unwrap();
        sink.append(&Record::new("row2").with("v2")).await.unwrap();

        // then
        assert!(sink.writer().writes.lock().unwrap().is_empty());
        assert!(sink.pending_size() > 0);

        // when
        sink.flush().await.unwrap();

        // then
        let writes = sink.writer().writes.lock().unwrap();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].len(), 2);
        assert_eq!(writes[0][0].row(), &Bytes::from("row1"));
        assert_eq!(*sink.writer().flushes.lock().unwrap(), 1);
        assert_eq!(sink.pending_size(), 0);
    }

    #[tokio::test]
    async fn should_write_when_threshold_reached() {
        // given
        let mut sink =
            RecordSink::new(transcoder("cf:a"), RecordingWriter::default()).with_flush_threshold(1);

        // when
        sink.append(&Record::new("row1").with("v1")).await.unwrap();

        // then
        assert_eq!(sink.writer().writes.lock().unwrap().len(), 1);
        assert_eq!(*sink.writer().flushes.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn should_not_write_records_without_columns() {
        // given
        let mut sink = RecordSink::new(transcoder(""), RecordingWriter::default());

        // when
        sink.append(&Record::new("row1").with("unmapped")).await.unwrap();
        sink.flush().await.unwrap();

        // then
        assert!(sink.writer().writes.lock().unwrap().is_empty());
        assert_eq!(*sink.writer().flushes.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn should_surface_writer_failure() {
        // given
        let mut sink = RecordSink::new(transcoder("cf"), RecordingWriter::failing(1));
        sink.append(&Record::new("row1").with("v")).await.unwrap();

        // when
        let result = sink.flush().await;

        // then
        assert_eq!(result, Err(Error::Storage("writer closed".to_string())));
    }

    #[tokio::test]
    async fn should_keep_buffer_when_write_fails() {
        // given
        let mut sink = RecordSink::new(transcoder("cf"), RecordingWriter::failing(1));
        sink.append(&Record::new("row1").with("v")).await.unwrap();

        // when
        let failed = sink.flush().await;

        // then
        assert!(failed.is_err());
        assert!(sink.pending_size() > 0);
        assert!(sink.writer().writes.lock().unwrap().is_empty());

        // when
        sink.flush().await.unwrap();

        // then
        let writes = sink.writer().writes.lock().unwrap();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].len(), 1);
        assert_eq!(writes[0][0].row(), &Bytes::from("row1"));
        assert_eq!(sink.pending_size(), 0);
    }

    #[tokio::test]
    async fn should_keep_buffer_when_threshold_write_fails() {
        // given
        let mut sink = RecordSink::new(transcoder("cf"), RecordingWriter::failing(1))
            .with_flush_threshold(1);

        // when
        let failed = sink.append(&Record::new("row1").with("v1")).await;
        sink.append(&Record::new("row2").with("v2")).await.unwrap();

        // then
        assert!(failed.is_err());
        let writes = sink.writer().writes.lock().unwrap();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].len(), 2);
    }
}
