use std::time::Duration;

use reqwest::Client;

use crate::controller::AddressLookup;
use crate::error::LookupError;
use crate::normalize::PostalCode;
use crate::types::{Address, ZipcloudResponse};

const API_BASE_URL: &str = "https://zipcloud.ibsnet.co.jp/api";
const STATUS_OK: i32 = 200;

/// Configuration for ZipcloudClient
#[derive(Debug, Clone, Default)]
pub struct ZipcloudConfig {
    /// Override the API base URL (testing, mirrors)
    pub base_url: Option<String>,
    /// Per-request timeout; the service enforces none by default
    pub timeout: Option<Duration>,
}

/// Client for the zipcloud postal-code search API
#[derive(Debug, Clone)]
pub struct ZipcloudClient {
    http_client: Client,
    base_url: String,
}

impl ZipcloudClient {
    pub fn new() -> Result<Self, LookupError> {
        Self::with_config(ZipcloudConfig::default())
    }

    pub fn with_config(config: ZipcloudConfig) -> Result<Self, LookupError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build()?;

        Ok(Self {
            http_client,
            base_url: config
                .base_url
                .unwrap_or_else(|| API_BASE_URL.to_string()),
        })
    }

    /// Make a single search request for a validated postal code
    async fn make_request(&self, code: &PostalCode) -> Result<ZipcloudResponse, LookupError> {
        let url = format!("{}/search?zipcode={}", self.base_url, code);

        let response = self.http_client.get(&url).send().await?;
        let response = response.error_for_status()?;
        let body = response.text().await?;

        Ok(serde_json::from_str(&body)?)
    }

    /// Resolve a postal code to a structured address
    pub async fn lookup(&self, code: &PostalCode) -> Result<Address, LookupError> {
        tracing::debug!("Looking up postal code {}", code);
        let response = self.make_request(code).await?;
        map_response(response)
    }
}

/// Map the service response to an address, taking the first entry.
///
/// Success requires the service's own status to be OK and a non-empty
/// results array; zipcloud signals "no match" as `results: null` with
/// status 200, and parameter errors as a non-200 status.
pub(crate) fn map_response(response: ZipcloudResponse) -> Result<Address, LookupError> {
    if response.status != STATUS_OK {
        tracing::debug!(
            "Service returned status {}: {}",
            response.status,
            response.message.as_deref().unwrap_or("")
        );
        return Err(LookupError::NotFound);
    }

    response
        .results
        .as_deref()
        .and_then(|results| results.first())
        .map(Address::from_entry)
        .ok_or(LookupError::NotFound)
}

impl AddressLookup for ZipcloudClient {
    async fn lookup(&self, code: &PostalCode) -> Result<Address, LookupError> {
        ZipcloudClient::lookup(self, code).await
    }
}
