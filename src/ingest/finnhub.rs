use super::provider::{MarketDataError, MarketDataProvider, NewsPayload, NewsWindow, QuotePayload};
use crate::config::DEFAULT_BASE_URL;
use async_trait::async_trait;
use std::time::Duration;

/// Settings for the Finnhub REST client
#[derive(Debug, Clone)]
pub struct FinnhubConfig {
    pub api_key: String,
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout: u64,
}

impl Default for FinnhubConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: 30,
        }
    }
}

/// Finnhub market data provider over plain reqwest
pub struct FinnhubProvider {
    client: reqwest::Client,
    config: FinnhubConfig,
}

impl FinnhubProvider {
    pub fn new(config: FinnhubConfig) -> Result<Self, MarketDataError> {
        if config.api_key.is_empty() {
            return Err(MarketDataError::ConfigError("API key is required".to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()?;

        log::info!("Finnhub provider initialized against {}", config.base_url);
        Ok(Self { client, config })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url, path)
    }

    fn quote_request(&self, symbol: &str) -> Result<reqwest::Request, MarketDataError> {
        Ok(self
            .client
            .get(self.endpoint("quote"))
            .query(&[("symbol", symbol), ("token", self.config.api_key.as_str())])
            .build()?)
    }

    fn company_news_request(
        &self,
        symbol: &str,
        window: &NewsWindow,
    ) -> Result<reqwest::Request, MarketDataError> {
        Ok(self
            .client
            .get(self.endpoint("company-news"))
            .query(&[
                ("symbol", symbol),
                ("from", window.from_param().as_str()),
                ("to", window.to_param().as_str()),
                ("token", self.config.api_key.as_str()),
            ])
            .build()?)
    }

    fn market_news_request(&self, category: &str) -> Result<reqwest::Request, MarketDataError> {
        Ok(self
            .client
            .get(self.endpoint("news"))
            .query(&[("category", category), ("token", self.config.api_key.as_str())])
            .build()?)
    }

    /// Execute a request and return the body of a 2xx response
    async fn fetch(&self, request: reqwest::Request) -> Result<String, MarketDataError> {
        log::debug!("GET {}", request.url().path());

        let response = self.client.execute(request).await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(MarketDataError::HttpStatus {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }
        Ok(body)
    }
}

pub fn parse_quote_body(body: &str) -> Result<QuotePayload, MarketDataError> {
    Ok(serde_json::from_str(body)?)
}

/// News endpoints answer with a bare JSON array of articles
pub fn parse_news_body(body: &str) -> Result<NewsPayload, MarketDataError> {
    Ok(serde_json::from_str(body)?)
}

#[async_trait]
impl MarketDataProvider for FinnhubProvider {
    fn name(&self) -> &str {
        "Finnhub"
    }

    async fn get_quote(&self, symbol: &str) -> Result<QuotePayload, MarketDataError> {
        let request = self.quote_request(symbol)?;
        let body = self.fetch(request).await?;
        parse_quote_body(&body)
    }

    async fn get_company_news(
        &self,
        symbol: &str,
        window: &NewsWindow,
    ) -> Result<NewsPayload, MarketDataError> {
        let request = self.company_news_request(symbol, window)?;
        let body = self.fetch(request).await?;
        parse_news_body(&body)
    }

    async fn get_market_news(&self, category: &str) -> Result<NewsPayload, MarketDataError> {
        let request = self.market_news_request(category)?;
        let body = self.fetch(request).await?;
        parse_news_body(&body)
    }
}
