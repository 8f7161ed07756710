//! Storage interfaces for reading cells and writing mutations.
//!
//! The traits here are the seam between systems built on the cell model and
//! the store that persists it. Network transport, batching, flush latency and
//! retry all live behind [`CellWrite`]; this crate only ships an in-memory
//! implementation.

pub mod in_memory;

use std::sync::Arc;

use async_trait::async_trait;

use crate::BytesRange;
use crate::cell::Cell;
use crate::mutation::Mutation;
use crate::serde::DeserializeError;

/// Error type for storage operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Failure reported by the storage backend.
    Storage(String),
    /// Unexpected internal failure, such as a corrupt key.
    Internal(String),
}

impl std::error::Error for StorageError {}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::Storage(msg) => write!(f, "Storage error: {}", msg),
            StorageError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl From<DeserializeError> for StorageError {
    fn from(err: DeserializeError) -> Self {
        StorageError::Internal(err.message)
    }
}

/// Result type alias for storage operations.
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Read access to sorted cells.
#[async_trait]
pub trait CellRead: Send + Sync {
    /// Returns the latest version of every column of `row`, sorted by
    /// `(family, qualifier, visibility)`.
    async fn scan_row(&self, row: &[u8]) -> StorageResult<Vec<Cell>>;

    /// Returns the latest version of every column of every row whose
    /// identifier falls in `rows`, sorted by row and then column.
    async fn scan(&self, rows: BytesRange) -> StorageResult<Vec<Cell>>;
}

/// Write access for mutations.
#[async_trait]
pub trait CellWrite: Send + Sync {
    /// Applies each mutation atomically for its row.
    async fn write(&self, mutations: Vec<Mutation>) -> StorageResult<()>;

    /// Flushes any buffered writes.
    async fn flush(&self) -> StorageResult<()>;
}

#[async_trait]
impl<T: CellRead + ?Sized> CellRead for Arc<T> {
    async fn scan_row(&self, row: &[u8]) -> StorageResult<Vec<Cell>> {
        (**self).scan_row(row).await
    }

    async fn scan(&self, rows: BytesRange) -> StorageResult<Vec<Cell>> {
        (**self).scan(rows).await
    }
}

#[async_trait]
impl<T: CellWrite + ?Sized> CellWrite for Arc<T> {
    async fn write(&self, mutations: Vec<Mutation>) -> StorageResult<()> {
        (**self).write(mutations).await
    }

    async fn flush(&self) -> StorageResult<()> {
        (**self).flush().await
    }
}
