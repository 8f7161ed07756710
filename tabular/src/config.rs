//! Configuration for the [`Transcoder`](crate::Transcoder).
//!
//! The configuration selects one of the two record layouts the engine
//! supports. It deserializes from the same shape it serializes to:
//!
//! ```json
//! { "layout": { "type": "columns", "columns": "cf:q_,other", "grouping": "per_row" } }
//! ```

use serde::{Deserialize, Serialize};

use crate::column_spec::ColumnSpecs;
use crate::decoder::{DecodeMode, Grouping};
use crate::encoder::EncodeMode;

/// Configuration for a [`Transcoder`](crate::Transcoder).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscoderConfig {
    /// Layout of the records read and written.
    #[serde(default)]
    pub layout: Layout,
}

impl TranscoderConfig {
    pub fn new(layout: Layout) -> Self {
        Self { layout }
    }
}

/// Record layout shared by decode and encode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Layout {
    /// One record per cell, carrying the full cell key:
    /// `(row, family, qualifier, visibility, timestamp, value)`.
    Cells,

    /// One record per row. Encode writes field `i` to column spec `i - 1`;
    /// decode groups the row's cells into map fields.
    Columns {
        /// Column destinations for record fields 1..N.
        #[serde(default)]
        columns: ColumnSpecs,

        /// Grouping of decoded cells into map fields.
        #[serde(default)]
        grouping: Grouping,
    },
}

impl Default for Layout {
    fn default() -> Self {
        Layout::Columns {
            columns: ColumnSpecs::default(),
            grouping: Grouping::default(),
        }
    }
}

impl Layout {
    pub(crate) fn decode_mode(&self) -> DecodeMode {
        match self {
            Layout::Cells => DecodeMode::Fixed,
            Layout::Columns { grouping, .. } => DecodeMode::Grouped(*grouping),
        }
    }

    pub(crate) fn encode_mode(&self) -> EncodeMode {
        match self {
            Layout::Cells => EncodeMode::Fixed,
            Layout::Columns { columns, .. } => EncodeMode::Columns(columns.clone()),
        }
    }
}
