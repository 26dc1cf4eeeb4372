use std::env;

pub const DEFAULT_BASE_URL: &str = "https://finnhub.io/api/v1";

/// Configuration errors raised while reading the environment at startup
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} environment variable not set")]
    Missing(&'static str),

    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },

    #[error("TICKERS must contain at least one symbol")]
    NoTickers,
}

/// Ingestion settings, read once at process startup.
///
/// Every external identifier lives here so that nothing about the
/// deployment is baked into the binary.
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Finnhub API key
    pub api_key: String,
    /// Upper-cased ticker symbols, in configured order
    pub tickers: Vec<String>,
    /// Structured table receiving quote rows
    pub table_id: String,
    /// Bucket receiving company news blobs
    pub bucket_name: String,
    /// Collection receiving activity log entries
    pub collection_name: String,
    /// Collection receiving general market news articles
    pub market_news_collection: String,
    /// Articles kept from the general news feed per run, 0 disables the feed
    pub market_news_limit: usize,
    /// Calendar days covered by the company news window, today included
    pub news_lookback_days: u32,
    pub base_url: String,
    pub request_timeout_secs: u64,
    pub port: u16,
}

impl IngestConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let required = |name: &'static str| get(name).ok_or(ConfigError::Missing(name));

        let tickers = parse_tickers(&get("TICKERS").unwrap_or_else(|| "AAPL".to_string()));
        if tickers.is_empty() {
            return Err(ConfigError::NoTickers);
        }

        let news_lookback_days = parse_or("NEWS_LOOKBACK_DAYS", get("NEWS_LOOKBACK_DAYS"), 7u32)?;
        if news_lookback_days == 0 {
            return Err(ConfigError::Invalid {
                name: "NEWS_LOOKBACK_DAYS",
                value: "0".to_string(),
            });
        }

        Ok(Self {
            api_key: required("FINNHUB_API_KEY")?,
            tickers,
            table_id: required("QUOTE_TABLE_ID")?,
            bucket_name: required("NEWS_BUCKET_NAME")?,
            collection_name: get("LOG_COLLECTION_NAME")
                .unwrap_or_else(|| "ingestion_logs".to_string()),
            market_news_collection: get("MARKET_NEWS_COLLECTION")
                .unwrap_or_else(|| "market_news".to_string()),
            market_news_limit: parse_or("MARKET_NEWS_LIMIT", get("MARKET_NEWS_LIMIT"), 5usize)?,
            news_lookback_days,
            base_url: get("FINNHUB_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            request_timeout_secs: parse_or("REQUEST_TIMEOUT_SECS", get("REQUEST_TIMEOUT_SECS"), 30u64)?,
            port: parse_or("PORT", get("PORT"), 8080u16)?,
        })
    }
}

/// Split a comma-separated symbol list, normalizing case and dropping blanks
pub fn parse_tickers(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_or<T: std::str::FromStr>(
    name: &'static str,
    value: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        None => Ok(default),
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    const REQUIRED: [(&str, &str); 3] = [
        ("FINNHUB_API_KEY", "test_key"),
        ("QUOTE_TABLE_ID", "stock_data"),
        ("NEWS_BUCKET_NAME", "news-bucket"),
    ];

    #[test]
    fn test_defaults_applied() {
        let config = IngestConfig::from_lookup(lookup(&REQUIRED)).unwrap();

        assert_eq!(config.api_key, "test_key");
        assert_eq!(config.tickers, vec!["AAPL"]);
        assert_eq!(config.collection_name, "ingestion_logs");
        assert_eq!(config.market_news_collection, "market_news");
        assert_eq!(config.market_news_limit, 5);
        assert_eq!(config.news_lookback_days, 7);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_missing_api_key() {
        let result = IngestConfig::from_lookup(lookup(&REQUIRED[1..]));
        assert_eq!(result.unwrap_err(), ConfigError::Missing("FINNHUB_API_KEY"));
    }

    #[test]
    fn test_blank_value_counts_as_missing() {
        let mut vars = REQUIRED.to_vec();
        vars[2] = ("NEWS_BUCKET_NAME", "   ");
        let result = IngestConfig::from_lookup(lookup(&vars));
        assert_eq!(result.unwrap_err(), ConfigError::Missing("NEWS_BUCKET_NAME"));
    }

    #[test]
    fn test_ticker_list_normalized() {
        assert_eq!(parse_tickers(" aapl, msft ,,nvda "), vec!["AAPL", "MSFT", "NVDA"]);
        assert!(parse_tickers(" , ").is_empty());

        let mut vars = REQUIRED.to_vec();
        vars.push(("TICKERS", ","));
        let result = IngestConfig::from_lookup(lookup(&vars));
        assert_eq!(result.unwrap_err(), ConfigError::NoTickers);
    }

    #[test]
    fn test_invalid_numbers_rejected() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("MARKET_NEWS_LIMIT", "five"));
        let result = IngestConfig::from_lookup(lookup(&vars));
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::Invalid { name: "MARKET_NEWS_LIMIT", .. }
        ));

        let mut vars = REQUIRED.to_vec();
        vars.push(("NEWS_LOOKBACK_DAYS", "0"));
        assert!(IngestConfig::from_lookup(lookup(&vars)).is_err());
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("FINNHUB_BASE_URL", "http://localhost:9000/api/v1/"));
        let config = IngestConfig::from_lookup(lookup(&vars)).unwrap();
        assert_eq!(config.base_url, "http://localhost:9000/api/v1");
    }
}
