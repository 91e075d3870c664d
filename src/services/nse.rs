use async_trait::async_trait;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, COOKIE, USER_AGENT};
use reqwest::{Client, StatusCode};
use serde_json::Value;

use crate::config::NseConfig;
use crate::error::ChainError;

/// Source of raw option-chain snapshots
#[async_trait]
pub trait OptionChainSource: Send + Sync {
    /// Index symbol the snapshots are for
    fn symbol(&self) -> &str;

    /// One outbound request, no retries
    async fn fetch_option_chain(&self) -> Result<Value, ChainError>;
}

/// Client for the NSE `option-chain-indices` endpoint
#[derive(Clone)]
pub struct NseService {
    client: Client,
    base_url: String,
    symbol: String,
    user_agent: String,
    cookie: Option<String>,
}

impl NseService {
    pub fn new(config: &NseConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            symbol: config.symbol.clone(),
            user_agent: config.user_agent.clone(),
            cookie: config.cookie.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl OptionChainSource for NseService {
    fn symbol(&self) -> &str {
        &self.symbol
    }

    async fn fetch_option_chain(&self) -> Result<Value, ChainError> {
        let url = format!("{}/api/option-chain-indices", self.base_url);

        tracing::info!("Fetching {} option chain from {}", self.symbol, url);

        let mut request = self
            .client
            .get(&url)
            .query(&[("symbol", self.symbol.as_str())])
            .header(USER_AGENT, self.user_agent.as_str())
            .header(ACCEPT, "application/json, text/plain, */*")
            .header(ACCEPT_LANGUAGE, "en-US,en");

        if let Some(cookie) = &self.cookie {
            request = request.header(COOKIE, cookie.as_str());
        }

        let response = request.send().await.map_err(|e| {
            tracing::error!("Failed to retrieve data from NSE API: {}", e);
            ChainError::FetchFailure(e.to_string())
        })?;

        let status = response.status();
        if status != StatusCode::OK {
            let error_text = response.text().await.unwrap_or_default();
            let preview: String = error_text.chars().take(200).collect();
            tracing::error!("NSE API error {}: {}", status, preview);
            return Err(ChainError::FetchFailure(format!("NSE API returned {}", status)));
        }

        let payload: Value = response.json().await.map_err(|e| {
            tracing::error!("NSE API returned an unreadable body: {}", e);
            ChainError::FetchFailure(e.to_string())
        })?;

        tracing::debug!("Fetched {} option chain snapshot", self.symbol);

        Ok(payload)
    }
}
