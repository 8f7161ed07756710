//! Cell-level data types for the wide-column store.
//!
//! A [`Cell`] is one stored version of a column: the five-part address
//! `(row, family, qualifier, visibility, timestamp)` plus its value. Cells
//! are produced by reads and never mutated afterwards. Writes are described
//! by [`ColumnUpdate`]s grouped into a [`Mutation`](crate::Mutation).

use bytes::Bytes;

use crate::serde::cell_key::CellKey;

/// One cell read from the store.
///
/// An empty `visibility` means the cell carries no visibility constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub row: Bytes,
    pub family: Bytes,
    pub qualifier: Bytes,
    pub visibility: Bytes,
    pub timestamp: i64,
    pub value: Bytes,
}

impl Cell {
    /// Creates an unconstrained cell with timestamp 0.
    pub fn new(
        row: impl Into<Bytes>,
        family: impl Into<Bytes>,
        qualifier: impl Into<Bytes>,
        value: impl Into<Bytes>,
    ) -> Self {
        Self {
            row: row.into(),
            family: family.into(),
            qualifier: qualifier.into(),
            visibility: Bytes::new(),
            timestamp: 0,
            value: value.into(),
        }
    }

    pub fn with_visibility(mut self, visibility: impl Into<Bytes>) -> Self {
        self.visibility = visibility.into();
        self
    }

    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Returns the storage key addressing this cell.
    pub fn key(&self) -> CellKey {
        CellKey {
            row: self.row.clone(),
            family: self.family.clone(),
            qualifier: self.qualifier.clone(),
            visibility: self.visibility.clone(),
            timestamp: self.timestamp,
        }
    }

    /// Rebuilds a cell from its decoded storage key and value.
    pub fn from_key(key: CellKey, value: Bytes) -> Self {
        Self {
            row: key.row,
            family: key.family,
            qualifier: key.qualifier,
            visibility: key.visibility,
            timestamp: key.timestamp,
            value,
        }
    }
}

/// A single column write within a [`Mutation`](crate::Mutation).
///
/// `visibility` is `None` when the write carries no visibility label; an
/// empty label is never stored. `timestamp` is `None` when the store should
/// assign the write time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnUpdate {
    pub family: Bytes,
    pub qualifier: Bytes,
    pub visibility: Option<Bytes>,
    pub timestamp: Option<i64>,
    pub value: Bytes,
}

impl ColumnUpdate {
    pub fn new(
        family: impl Into<Bytes>,
        qualifier: impl Into<Bytes>,
        value: impl Into<Bytes>,
    ) -> Self {
        Self {
            family: family.into(),
            qualifier: qualifier.into(),
            visibility: None,
            timestamp: None,
            value: value.into(),
        }
    }

    /// Attaches a visibility label. An empty label leaves the update
    /// unconstrained.
    pub fn with_visibility(mut self, visibility: impl Into<Bytes>) -> Self {
        let visibility = visibility.into();
        self.visibility = if visibility.is_empty() {
            None
        } else {
            Some(visibility)
        };
        self
    }

    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Approximate encoded size of this update in bytes.
    pub fn estimate_size(&self) -> usize {
        self.family.len()
            + self.qualifier.len()
            + self.visibility.as_ref().map_or(0, Bytes::len)
            + self.value.len()
            + 8
    }
}
