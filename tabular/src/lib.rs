//! Transcoding between wide-column cells and structured records.
//!
//! A row of the store is a sorted run of cells addressed by
//! `(row, family, qualifier, visibility, timestamp)`. A [`Record`] is an
//! ordered list of typed [`Value`]s whose first field is the row. The
//! [`Transcoder`] converts in both directions according to its [`Layout`]:
//!
//! - [`Layout::Cells`] maps each cell to a six-field record and back.
//! - [`Layout::Columns`] decodes a row into map fields grouped per family or
//!   per row, and encodes records by writing field `i` to the `i`-th column
//!   of a [`ColumnSpecs`] list, flattening map fields into one column per
//!   entry.
//!
//! [`RecordSink`] and [`RowSource`] bind a transcoder to the
//! [`CellWrite`](common::CellWrite) and [`CellRead`](common::CellRead)
//! storage traits.
//!
//! # Example
//!
//! ```
//! use tabular::{ColumnSpecs, Grouping, Layout, Record, Transcoder, TranscoderConfig};
//!
//! let config = TranscoderConfig::new(Layout::Columns {
//!     columns: "info:name".parse::<ColumnSpecs>().unwrap(),
//!     grouping: Grouping::PerFamily,
//! });
//! let transcoder = Transcoder::new(config);
//!
//! let record = Record::new("user-1").with("ada");
//! let mutation = transcoder.encode_record(&record, None).unwrap().unwrap();
//! assert_eq!(mutation.len(), 1);
//! ```

pub mod codec;
pub mod column_spec;
pub mod config;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod model;
pub mod sink;
pub mod source;
pub mod transcoder;

pub use codec::{Utf8Caster, ValueCaster, ValueCodec};
pub use column_spec::{ColumnSpec, ColumnSpecs};
pub use config::{Layout, TranscoderConfig};
pub use decoder::{DecodeMode, Grouping, RowDecoder};
pub use encoder::{EncodeMode, RecordEncoder};
pub use error::{Error, Result};
pub use model::{ColumnMap, FieldSchema, LogicalType, Record, Value};
pub use sink::RecordSink;
pub use source::RowSource;
pub use transcoder::Transcoder;
