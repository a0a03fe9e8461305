//! Core business logic: rate tables, caching policy and conversion

pub mod cache;
pub mod config;
pub mod convert;
pub mod error;
pub mod history;
pub mod log;
pub mod rate_store;
pub mod rates;

// Re-export main types for cleaner imports
pub use cache::RateCache;
pub use convert::convert;
pub use error::{CacheError, ConversionError, FetchCause, FetchError, RateError};
pub use history::{ConversionHistory, ConversionHistoryEntry, HISTORY_CAPACITY};
pub use rate_store::{CurrentRates, RateOrigin, RateStore};
pub use rates::{RateFetcher, RateStatus, RateTable};
