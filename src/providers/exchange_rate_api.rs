use crate::core::error::{FetchCause, FetchError};
use crate::core::rates::{RateFetcher, RateStatus, RateTable};
use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, error, instrument};

const USER_AGENT: &str = concat!("fxconv/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct LatestRatesResponse {
    result: String,
    #[serde(default)]
    time_last_update_unix: i64,
    #[serde(default)]
    base_code: String,
    #[serde(default)]
    conversion_rates: BTreeMap<String, f64>,
}

/// Fetches the latest rates from an ExchangeRate-API style endpoint.
pub struct HttpRateFetcher {
    client: reqwest::Client,
}

impl HttpRateFetcher {
    /// Builds a fetcher whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl RateFetcher for HttpRateFetcher {
    #[instrument(name = "ExchangeRateFetch", skip(self))]
    async fn fetch(&self, source_url: &str) -> Result<RateTable, FetchError> {
        debug!("Requesting rates from {}", source_url);
        let response = self
            .client
            .get(source_url)
            .send()
            .await
            .map_err(|e| FetchError::new(source_url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(
                source_url,
                FetchCause::Status(status.as_u16()),
            ));
        }

        let text = response
            .text()
            .await
            .map_err(|e| FetchError::new(source_url, e))?;

        let data: LatestRatesResponse = match serde_json::from_str(&text) {
            Ok(data) => data,
            Err(e) => {
                error!(error = ?e, response = %text, "Failed to parse rates response");
                return Err(FetchError::new(source_url, e));
            }
        };

        if data.result != "success" {
            return Err(FetchError::new(
                source_url,
                FetchCause::Unsuccessful(data.result),
            ));
        }

        let table = RateTable {
            status: RateStatus::Success,
            fetched_at_unix: Utc::now().timestamp(),
            upstream_updated_unix: data.time_last_update_unix,
            base_code: data.base_code,
            rates: data.conversion_rates,
            source_url: source_url.to_string(),
        };
        table
            .validate()
            .map_err(|reason| FetchError::new(source_url, FetchCause::InvalidTable(reason)))?;

        debug!(
            base = %table.base_code,
            currencies = table.rates.len(),
            "Received rate table"
        );
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const LATEST_PATH: &str = "/v6/test-key/latest/USD";

    const MOCK_JSON: &str = r#"{
        "result": "success",
        "time_last_update_unix": 1700000000,
        "base_code": "USD",
        "conversion_rates": { "USD": 1, "EUR": 0.9, "JPY": 150.0 }
    }"#;

    async fn create_mock_server(template: ResponseTemplate) -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(LATEST_PATH))
            .respond_with(template)
            .mount(&mock_server)
            .await;

        mock_server
    }

    fn fetcher() -> HttpRateFetcher {
        HttpRateFetcher::new(Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_successful_fetch() {
        let server = create_mock_server(ResponseTemplate::new(200).set_body_string(MOCK_JSON)).await;
        let url = format!("{}{}", server.uri(), LATEST_PATH);

        let table = fetcher().fetch(&url).await.unwrap();

        assert_eq!(table.status, RateStatus::Success);
        assert_eq!(table.base_code, "USD");
        assert_eq!(table.upstream_updated_unix, 1_700_000_000);
        assert_eq!(table.rates.len(), 3);
        assert_eq!(table.rates["JPY"], 150.0);
        assert_eq!(table.source_url, url);
    }

    #[tokio::test]
    async fn test_unsuccessful_result_is_fetch_error() {
        let body = r#"{ "result": "error", "error-type": "invalid-key" }"#;
        let server = create_mock_server(ResponseTemplate::new(200).set_body_string(body)).await;
        let url = format!("{}{}", server.uri(), LATEST_PATH);

        let err = fetcher().fetch(&url).await.unwrap_err();

        assert!(matches!(err.cause, FetchCause::Unsuccessful(ref r) if r == "error"));
        assert_eq!(err.url, url);
    }

    #[tokio::test]
    async fn test_http_error_status() {
        let server = create_mock_server(ResponseTemplate::new(500)).await;
        let url = format!("{}{}", server.uri(), LATEST_PATH);

        let err = fetcher().fetch(&url).await.unwrap_err();

        assert!(matches!(err.cause, FetchCause::Status(500)));
    }

    #[tokio::test]
    async fn test_malformed_json() {
        let server =
            create_mock_server(ResponseTemplate::new(200).set_body_string("<html></html>")).await;
        let url = format!("{}{}", server.uri(), LATEST_PATH);

        let err = fetcher().fetch(&url).await.unwrap_err();

        assert!(matches!(err.cause, FetchCause::Decode(_)));
    }

    #[tokio::test]
    async fn test_success_with_empty_rates_is_rejected() {
        let body = r#"{ "result": "success", "base_code": "USD", "conversion_rates": {} }"#;
        let server = create_mock_server(ResponseTemplate::new(200).set_body_string(body)).await;
        let url = format!("{}{}", server.uri(), LATEST_PATH);

        let err = fetcher().fetch(&url).await.unwrap_err();

        assert!(matches!(err.cause, FetchCause::InvalidTable(_)));
    }

    #[tokio::test]
    async fn test_timeout_is_request_error() {
        let server = create_mock_server(
            ResponseTemplate::new(200)
                .set_body_string(MOCK_JSON)
                .set_delay(Duration::from_secs(2)),
        )
        .await;
        let url = format!("{}{}", server.uri(), LATEST_PATH);
        let fetcher = HttpRateFetcher::new(Duration::from_millis(200)).unwrap();

        let err = fetcher.fetch(&url).await.unwrap_err();

        assert!(matches!(err.cause, FetchCause::Request(_)));
    }
}
