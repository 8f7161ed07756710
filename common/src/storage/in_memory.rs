//! In-memory cell store.
//!
//! Cells are kept in a single sorted map keyed by the encoded
//! [`CellKey`]. Reads collapse each column to its newest version, matching
//! the default versioning of a wide-column store.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::RwLock;

use crate::BytesRange;
use crate::cell::Cell;
use crate::clock::{Clock, SystemClock};
use crate::mutation::Mutation;
use crate::serde::cell_key::CellKey;
use crate::storage::{CellRead, CellWrite, StorageResult};

/// A [`CellRead`] + [`CellWrite`] backed by a sorted in-memory map.
pub struct InMemoryCellStore {
    cells: RwLock<BTreeMap<Bytes, Bytes>>,
    clock: Arc<dyn Clock>,
}

impl Default for InMemoryCellStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryCellStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Creates a store that stamps timestamp-less writes with `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            cells: RwLock::new(BTreeMap::new()),
            clock,
        }
    }

    /// Number of stored cell versions.
    pub async fn len(&self) -> usize {
        self.cells.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.cells.read().await.is_empty()
    }
}

/// Decodes a run of stored entries, keeping the first (newest) version of
/// each column.
fn latest_versions<'a>(
    entries: impl Iterator<Item = (&'a Bytes, &'a Bytes)>,
) -> StorageResult<Vec<Cell>> {
    let mut cells: Vec<Cell> = Vec::new();
    for (key, value) in entries {
        let key = CellKey::deserialize(key)?;
        if let Some(prev) = cells.last()
            && prev.row == key.row
            && prev.family == key.family
            && prev.qualifier == key.qualifier
            && prev.visibility == key.visibility
        {
            continue;
        }
        cells.push(Cell::from_key(key, value.clone()));
    }
    Ok(cells)
}

#[async_trait]
impl CellRead for InMemoryCellStore {
    #[tracing::instrument(level = "trace", skip_all)]
    async fn scan_row(&self, row: &[u8]) -> StorageResult<Vec<Cell>> {
        let cells = self.cells.read().await;
        latest_versions(cells.range(CellKey::row_range(row)))
    }

    #[tracing::instrument(level = "trace", skip_all)]
    async fn scan(&self, rows: BytesRange) -> StorageResult<Vec<Cell>> {
        let range = CellKey::rows_range(&rows);
        if rows.is_empty() || range.is_empty() {
            return Ok(Vec::new());
        }
        let cells = self.cells.read().await;
        latest_versions(cells.range(range))
    }
}

#[async_trait]
impl CellWrite for InMemoryCellStore {
    #[tracing::instrument(level = "trace", skip_all)]
    async fn write(&self, mutations: Vec<Mutation>) -> StorageResult<()> {
        let now = self.clock.now_millis();
        let mut cells = self.cells.write().await;
        for mutation in mutations {
            let row = mutation.row().clone();
            for update in mutation.into_updates() {
                let key = CellKey {
                    row: row.clone(),
                    family: update.family,
                    qualifier: update.qualifier,
                    visibility: update.visibility.unwrap_or_default(),
                    timestamp: update.timestamp.unwrap_or(now),
                };
                cells.insert(key.serialize(), update.value);
            }
        }
        Ok(())
    }

    async fn flush(&self) -> StorageResult<()> {
        Ok(())
    }
}
