use std::env;
use std::fmt;
use std::time::Duration;

use anyhow::{Context, Result};
use dotenvy::dotenv;

/// Settings for the outbound custom-search call. Read once at startup and
/// shared read-only between requests.
#[derive(Clone)]
pub struct Config {
    pub endpoint: String,
    pub subscription_key: String,
    pub custom_config_id: String,
    /// Appended to every entity name before searching.
    pub query_suffix: String,
    pub market: String,
    pub result_count: u32,
    pub safe_search: String,
    pub timeout: Duration,
}

impl Config {
    pub fn new(endpoint: &str, subscription_key: &str, custom_config_id: &str) -> Config {
        Config {
            endpoint: endpoint.to_string(),
            subscription_key: subscription_key.to_string(),
            custom_config_id: custom_config_id.to_string(),
            query_suffix: "Fraud".to_string(),
            market: "en-us".to_string(),
            result_count: 10,
            safe_search: "Moderate".to_string(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn from_env() -> Result<Config> {
        dotenv().ok(); // Load .env file if present
        let timeout_secs: u64 = parse_env_or_default("SEARCH_TIMEOUT_SECS", 10)?;
        Ok(Config {
            endpoint: get_env("SEARCH_ENDPOINT")?,
            subscription_key: get_env("SEARCH_SUBSCRIPTION_KEY")?,
            custom_config_id: get_env("SEARCH_CUSTOM_CONFIG_ID")?,
            query_suffix: get_env_or_default("SEARCH_QUERY_SUFFIX", "Fraud"),
            market: get_env_or_default("SEARCH_MARKET", "en-us"),
            result_count: parse_env_or_default("SEARCH_RESULT_COUNT", 10)?,
            safe_search: get_env_or_default("SEARCH_SAFE_SEARCH", "Moderate"),
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

// The subscription key never reaches logs.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("endpoint", &self.endpoint)
            .field("subscription_key", &"<redacted>")
            .field("custom_config_id", &self.custom_config_id)
            .field("query_suffix", &self.query_suffix)
            .field("market", &self.market)
            .field("result_count", &self.result_count)
            .field("safe_search", &self.safe_search)
            .field("timeout", &self.timeout)
            .finish()
    }
}

fn get_env(key: &str) -> Result<String> {
    env::var(key).with_context(|| format!("Missing required environment variable: {key}"))
}

fn get_env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env_or_default<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid value for {key}: {raw}")),
        Err(_) => Ok(default),
    }
}
