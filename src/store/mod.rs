//! Append-only persistence of completed attempts.

pub mod memory;
pub mod sqlite;
pub mod worker;

pub use crate::error::StoreError;
pub use memory::{MemoryProvider, MemoryResultStore};
pub use sqlite::{SqliteProvider, SqliteResultStore};
pub use worker::{StoreEvent, StoreHandle, StoreRequest, StoreWorker};

use crate::result::QuizResult;

/// Name of the record collection inside the store.
pub const COLLECTION: &str = "quiz_results";

pub trait ResultStore {
    /// Returns the auto-assigned key of the new record.
    fn append(&mut self, result: &QuizResult) -> Result<i64, StoreError>;

    /// All records, in no particular order.
    fn read_all(&self) -> Result<Vec<QuizResult>, StoreError>;

    /// Destroy every record and recreate an empty collection.
    fn reset(&mut self) -> Result<(), StoreError>;
}

/// Opens stores and can wipe them even when they no longer open.
pub trait StoreProvider: Send + 'static {
    fn open(&self) -> Result<Box<dyn ResultStore + Send>, StoreError>;

    fn destroy(&self) -> Result<(), StoreError>;
}
