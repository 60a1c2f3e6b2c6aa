//! Remote settlement API client
//!
//! Fetches line items for a date range from `GET {base_url}/settlements`.
//! Every request carries the configured timeout. Authentication and retries
//! are not handled here.

use crate::config::ApiConfig;
use crate::{Error, Result};
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use tracing::{debug, info};

/// Inclusive settlement date range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self> {
        if from > to {
            return Err(Error::configuration(format!(
                "settlement range starts after it ends ({} > {})",
                from, to
            )));
        }
        Ok(Self { from, to })
    }

    /// Parse `YYYY-MM-DD` bounds
    pub fn parse(from: &str, to: &str) -> Result<Self> {
        Self::new(parse_date(from)?, parse_date(to)?)
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.from, self.to)
    }
}

fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|e| Error::configuration(format!("invalid date '{}': {}", value, e)))
}

/// The API answers with a bare array or an object wrapping one
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SettlementResponse {
    Items(Vec<Value>),
    Wrapped { items: Vec<Value> },
}

impl SettlementResponse {
    fn into_items(self) -> Vec<Value> {
        match self {
            SettlementResponse::Items(items) | SettlementResponse::Wrapped { items } => items,
        }
    }
}

/// Parse a settlements response body into line items
pub fn parse_line_items(body: &str) -> Result<Vec<Value>> {
    serde_json::from_str::<SettlementResponse>(body)
        .map(SettlementResponse::into_items)
        .map_err(|e| Error::remote_api(format!("unexpected settlements response: {}", e), None))
}

#[derive(Debug, Clone)]
pub struct SettlementApiClient {
    client: Client,
    base_url: String,
}

impl SettlementApiClient {
    /// Build a client from `[api]`; fails when no base URL is configured
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let base_url = config
            .base_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| Error::configuration("api.base_url is not set"))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::remote_api("failed to build HTTP client", Some(e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim().trim_end_matches('/').to_string(),
        })
    }

    pub fn settlements_url(&self) -> String {
        format!("{}/settlements", self.base_url)
    }

    /// Fetch every line item settled within `range`
    pub async fn fetch_line_items(&self, range: &DateRange) -> Result<Vec<Value>> {
        let url = self.settlements_url();
        debug!("GET {} for {}", url, range);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("from", range.from.to_string()),
                ("to", range.to.to_string()),
            ])
            .send()
            .await
            .map_err(|e| Error::remote_api("settlement request failed", Some(e)))?
            .error_for_status()
            .map_err(|e| Error::remote_api("settlement API returned an error", Some(e)))?;

        let body = response
            .text()
            .await
            .map_err(|e| Error::remote_api("failed to read settlement response", Some(e)))?;

        let items = parse_line_items(&body)?;
        info!("Fetched {} settlement line items for {}", items.len(), range);
        Ok(items)
    }
}
