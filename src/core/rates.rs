//! Exchange-rate snapshot and the fetch abstraction that produces it

use crate::core::error::FetchError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Display;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RateStatus {
    Success,
    Failure(String),
}

impl From<String> for RateStatus {
    fn from(s: String) -> Self {
        if s == "success" {
            RateStatus::Success
        } else {
            RateStatus::Failure(s)
        }
    }
}

impl From<RateStatus> for String {
    fn from(status: RateStatus) -> Self {
        status.to_string()
    }
}

impl Display for RateStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RateStatus::Success => write!(f, "success"),
            RateStatus::Failure(s) => write!(f, "{s}"),
        }
    }
}

/// One snapshot of exchange rates relative to `base_code`.
///
/// Tables are never mutated once handed out. A newer fetch supersedes the
/// whole value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateTable {
    #[serde(rename = "result")]
    pub status: RateStatus,
    pub fetched_at_unix: i64,
    #[serde(rename = "time_last_update_unix", default)]
    pub upstream_updated_unix: i64,
    pub base_code: String,
    #[serde(rename = "conversion_rates")]
    pub rates: BTreeMap<String, f64>,
    #[serde(rename = "api_url")]
    pub source_url: String,
}

impl RateTable {
    /// Checks the snapshot invariants: success status, a non-empty rate map
    /// and only finite positive multipliers.
    pub fn validate(&self) -> Result<(), String> {
        if self.status != RateStatus::Success {
            return Err(format!("status is '{}'", self.status));
        }
        if self.rates.is_empty() {
            return Err("no conversion rates".to_string());
        }
        if let Some((code, rate)) = self
            .rates
            .iter()
            .find(|(_, r)| !r.is_finite() || **r <= 0.0)
        {
            return Err(format!("rate for {code} is not positive: {rate}"));
        }
        Ok(())
    }

    /// Currency codes in sorted order.
    pub fn currencies(&self) -> Vec<&str> {
        self.rates.keys().map(String::as_str).collect()
    }

    /// Seconds elapsed between the snapshot and `now_unix`, saturating at the
    /// `i64` bounds.
    pub fn age_secs(&self, now_unix: i64) -> i64 {
        now_unix.saturating_sub(self.fetched_at_unix)
    }
}

/// Fetch collaborator: obtains a fresh [`RateTable`] from `source_url`.
#[async_trait]
pub trait RateFetcher: Send + Sync {
    async fn fetch(&self, source_url: &str) -> Result<RateTable, FetchError>;
}
