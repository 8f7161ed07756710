pub mod bytes;
pub mod cell;
pub mod clock;
pub mod mutation;
pub mod serde;
pub mod storage;

pub use crate::bytes::BytesRange;
pub use cell::{Cell, ColumnUpdate};
pub use clock::{Clock, SystemClock};
pub use mutation::{Mutation, MutationBatch};
pub use storage::in_memory::InMemoryCellStore;
pub use storage::{CellRead, CellWrite, StorageError, StorageResult};
