//! Decoding of one row's cells into structured records.

use bytes::Bytes;
use common::Cell;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{ColumnMap, Record, Value};

const KEY_SEPARATOR: char = ':';

/// How cells of one row are grouped into map fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Grouping {
    /// A new map field starts whenever the column family changes.
    #[default]
    PerFamily,
    /// One map field holds every column of the row.
    PerRow,
}

/// Shape of the records produced by [`RowDecoder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeMode {
    /// One six-field record per cell:
    /// `(row, family, qualifier, visibility, timestamp, value)`.
    Fixed,
    /// One record per row: the row followed by one map field per group.
    Grouped(Grouping),
}

impl Default for DecodeMode {
    fn default() -> Self {
        DecodeMode::Grouped(Grouping::default())
    }
}

/// Decodes the sorted cells of a single row.
///
/// Stateless apart from its mode, so one decoder can be shared across
/// threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct RowDecoder {
    mode: DecodeMode,
}

impl RowDecoder {
    pub fn new(mode: DecodeMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> DecodeMode {
        self.mode
    }

    /// Decodes `cells`, which must all belong to one row and be sorted by
    /// `(family, qualifier)`.
    ///
    /// Fixed mode yields one record per cell. Grouped mode yields exactly one
    /// record whose map fields follow group encounter order.
    pub fn decode(&self, cells: &[Cell]) -> Result<Vec<Record>> {
        let row = validate_row(cells)?;
        match self.mode {
            DecodeMode::Fixed => Ok(cells.iter().map(fixed_record).collect()),
            DecodeMode::Grouped(grouping) => Ok(vec![grouped_record(row, cells, grouping)]),
        }
    }
}

/// Returns the shared row of `cells`, rejecting empty or mixed-row input.
fn validate_row(cells: &[Cell]) -> Result<&Bytes> {
    let Some(first) = cells.first() else {
        return Err(Error::InvalidInput(
            "cannot decode a row with no cells".to_string(),
        ));
    };
    if let Some(stray) = cells.iter().find(|cell| cell.row != first.row) {
        return Err(Error::InvalidInput(format!(
            "cells of rows {:?} and {:?} cannot be decoded together",
            first.row, stray.row
        )));
    }
    Ok(&first.row)
}

fn fixed_record(cell: &Cell) -> Record {
    Record::from_fields(vec![
        Value::Bytes(cell.row.clone()),
        Value::Bytes(cell.family.clone()),
        Value::Bytes(cell.qualifier.clone()),
        Value::Bytes(cell.visibility.clone()),
        Value::Long(cell.timestamp),
        Value::Bytes(cell.value.clone()),
    ])
}

fn grouped_record(row: &Bytes, cells: &[Cell], grouping: Grouping) -> Record {
    let mut record = Record::new(Value::Bytes(row.clone()));
    let mut group = ColumnMap::new();
    let mut group_family: Option<&Bytes> = None;

    for cell in cells {
        let starts_group = match (grouping, group_family) {
            (_, None) => false,
            (Grouping::PerFamily, Some(family)) => *family != cell.family,
            (Grouping::PerRow, Some(_)) => false,
        };
        if starts_group {
            record.push(Value::Map(std::mem::take(&mut group)));
        }
        group_family = Some(&cell.family);
        group.insert(column_key(cell), Value::Bytes(cell.value.clone()));
    }
    record.push(Value::Map(group));
    record
}

/// Map key for a cell: `family:qualifier`, or `family` when the qualifier is
/// empty.
fn column_key(cell: &Cell) -> String {
    let family = String::from_utf8_lossy(&cell.family);
    if cell.qualifier.is_empty() {
        return family.into_owned();
    }
    let qualifier = String::from_utf8_lossy(&cell.qualifier);
    let mut key = String::with_capacity(family.len() + 1 + qualifier.len());
    key.push_str(&family);
    key.push(KEY_SEPARATOR);
    key.push_str(&qualifier);
    key
}
