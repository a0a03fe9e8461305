//! Storage abstraction for the persisted rate table

use crate::core::error::CacheError;
use crate::core::rates::RateTable;

/// Storage collaborator holding at most one [`RateTable`].
///
/// `load` returns `Ok(None)` when nothing has been stored yet. Both methods
/// are expected to be cheap local operations.
pub trait RateCache: Send + Sync {
    fn load(&self) -> Result<Option<RateTable>, CacheError>;

    /// Replaces any previously stored table.
    fn save(&self, table: &RateTable) -> Result<(), CacheError>;
}

impl<T: RateCache + ?Sized> RateCache for &T {
    fn load(&self) -> Result<Option<RateTable>, CacheError> {
        (**self).load()
    }

    fn save(&self, table: &RateTable) -> Result<(), CacheError> {
        (**self).save(table)
    }
}

impl<T: RateCache + ?Sized> RateCache for Box<T> {
    fn load(&self) -> Result<Option<RateTable>, CacheError> {
        (**self).load()
    }

    fn save(&self, table: &RateTable) -> Result<(), CacheError> {
        (**self).save(table)
    }
}
