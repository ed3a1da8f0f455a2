//! Record source port trait.

use crate::domain::error::TipdashError;
use crate::domain::record::Record;
use crate::domain::record_store::RecordStore;

/// A source of transaction records, read once at startup.
pub trait RecordPort {
    /// Loads every row. Any malformed row or missing column fails the whole
    /// load; partial results are never returned.
    fn load_records(&self) -> Result<Vec<Record>, TipdashError>;

    fn load_store(&self) -> Result<RecordStore, TipdashError> {
        self.load_records().map(RecordStore::new)
    }
}
