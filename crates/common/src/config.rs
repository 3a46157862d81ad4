use std::time::Duration;

use serde::Deserialize;

/// Default Telegram Bot API base URL.
pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// Global application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Telegram bot token. Empty when unset; the first send then fails with
    /// an authorization error instead of failing at startup.
    pub telegram_bot_token: String,

    /// Destination chat id (numeric id or `@channelname`)
    pub telegram_chat_id: String,

    /// Bot API base URL (default: https://api.telegram.org)
    pub telegram_api_url: String,

    /// Per-request HTTP timeout in milliseconds (default: 10000)
    pub telegram_timeout_ms: u64,

    /// Retry timing for transient delivery failures
    pub retry: RetryConfig,
}

/// Timing knobs for the delivery retry loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RetryConfig {
    /// Delay used when a transient failure carries no retry-after hint (default: 2s)
    pub default_backoff: Duration,

    /// Added on top of a server-provided retry-after hint (default: 0.5s)
    pub retry_after_jitter: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            default_backoff: Duration::from_millis(2000),
            retry_after_jitter: Duration::from_millis(500),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = Self {
            telegram_bot_token: lookup("TELEGRAM_BOT_TOKEN").unwrap_or_default(),
            telegram_chat_id: lookup("TELEGRAM_CHAT_ID").unwrap_or_default(),
            telegram_api_url: lookup("TELEGRAM_API_URL")
                .unwrap_or_else(|| DEFAULT_TELEGRAM_API_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            telegram_timeout_ms: parse_u64(&lookup, "TELEGRAM_TIMEOUT_MS", 10_000)?,
            retry: RetryConfig {
                default_backoff: Duration::from_millis(parse_u64(
                    &lookup,
                    "NOTIFY_DEFAULT_BACKOFF_MS",
                    2000,
                )?),
                retry_after_jitter: Duration::from_millis(parse_u64(
                    &lookup,
                    "NOTIFY_RETRY_JITTER_MS",
                    500,
                )?),
            },
        };

        if config.telegram_bot_token.is_empty() {
            tracing::warn!("TELEGRAM_BOT_TOKEN is not set; deliveries will be rejected");
        }
        if config.telegram_chat_id.is_empty() {
            tracing::warn!("TELEGRAM_CHAT_ID is not set; deliveries will be rejected");
        }

        Ok(config)
    }

    pub fn telegram_timeout(&self) -> Duration {
        Duration::from_millis(self.telegram_timeout_ms)
    }
}

fn parse_u64<F>(lookup: &F, key: &str, default: u64) -> anyhow::Result<u64>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("{key} must be a valid u64")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.telegram_bot_token, "");
        assert_eq!(config.telegram_chat_id, "");
        assert_eq!(config.telegram_api_url, DEFAULT_TELEGRAM_API_URL);
        assert_eq!(config.telegram_timeout(), Duration::from_secs(10));
        assert_eq!(config.retry, RetryConfig::default());
        assert_eq!(config.retry.default_backoff, Duration::from_secs(2));
        assert_eq!(config.retry.retry_after_jitter, Duration::from_millis(500));
    }

    #[test]
    fn test_custom_values() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("TELEGRAM_BOT_TOKEN", "123:abc"),
            ("TELEGRAM_CHAT_ID", "-100200300"),
            ("TELEGRAM_API_URL", "http://localhost:8081/"),
            ("TELEGRAM_TIMEOUT_MS", "2500"),
            ("NOTIFY_DEFAULT_BACKOFF_MS", "100"),
            ("NOTIFY_RETRY_JITTER_MS", "0"),
        ]))
        .unwrap();
        assert_eq!(config.telegram_bot_token, "123:abc");
        assert_eq!(config.telegram_chat_id, "-100200300");
        assert_eq!(config.telegram_api_url, "http://localhost:8081");
        assert_eq!(config.telegram_timeout(), Duration::from_millis(2500));
        assert_eq!(config.retry.default_backoff, Duration::from_millis(100));
        assert_eq!(config.retry.retry_after_jitter, Duration::ZERO);
    }

    #[test]
    fn test_malformed_number_is_rejected() {
        let err = AppConfig::from_lookup(lookup_from(&[("NOTIFY_DEFAULT_BACKOFF_MS", "soon")]))
            .unwrap_err();
        assert!(err.to_string().contains("NOTIFY_DEFAULT_BACKOFF_MS"));
    }
}
