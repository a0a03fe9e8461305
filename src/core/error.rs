//! Error taxonomy for rate lookups, persistence and conversions

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by [`crate::core::rate_store::RateStore`].
#[derive(Debug, Error)]
pub enum RateError {
    /// No source URL is configured, so fresh rates cannot be fetched.
    #[error("Set API URL first")]
    ConfigMissing,
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// A failed attempt to obtain a rate table from the upstream source.
///
/// Every failure mode collapses into this one type; the underlying cause is
/// kept as the error source for diagnostics.
#[derive(Debug, Error)]
#[error("Failed to fetch rates from {url}: {cause}")]
pub struct FetchError {
    pub url: String,
    #[source]
    pub cause: FetchCause,
}

impl FetchError {
    pub fn new(url: &str, cause: impl Into<FetchCause>) -> Self {
        Self {
            url: url.to_string(),
            cause: cause.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum FetchCause {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("HTTP status {0}")]
    Status(u16),
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("API request failed with result '{0}'")]
    Unsuccessful(String),
    #[error("invalid rate table: {0}")]
    InvalidTable(String),
}

/// Local persistence failures. Never fatal.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Failed to read rate cache {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to write rate cache {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed rate cache {}: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    #[error("Invalid currency selected: {0}")]
    UnknownCurrency(String),
    #[error("Invalid amount: '{0}'")]
    InvalidAmount(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_fetch_error_keeps_cause_as_source() {
        let err = FetchError::new(
            "http://example.com",
            FetchCause::Unsuccessful("error".into()),
        );
        assert!(err.to_string().contains("http://example.com"));
        assert!(err.to_string().contains("'error'"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_config_missing_message() {
        assert_eq!(RateError::ConfigMissing.to_string(), "Set API URL first");
    }
}
