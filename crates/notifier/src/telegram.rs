//! Telegram Bot API transport.
//!
//! Posts to `{api_url}/bot{token}/sendMessage` and maps the Bot API error
//! envelope (`ok`, `error_code`, `description`, `parameters.retry_after`)
//! onto `TransportError`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;

use courier_common::config::AppConfig;
use courier_common::error::NotifyError;

use crate::transport::{Ack, SendOptions, Transport, TransportError};

/// Bot API response envelope.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    error_code: Option<u16>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    parameters: Option<ResponseParameters>,
    #[serde(default)]
    result: Option<SentMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseParameters {
    #[serde(default)]
    retry_after: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct SentMessage {
    message_id: i64,
}

pub struct TelegramTransport {
    http_client: Client,
    api_url: String,
    bot_token: String,
}

impl TelegramTransport {
    pub fn new(
        api_url: impl Into<String>,
        bot_token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, NotifyError> {
        let api_url = api_url.into().trim_end_matches('/').to_string();
        if !api_url.starts_with("http://") && !api_url.starts_with("https://") {
            return Err(NotifyError::Config(format!(
                "TELEGRAM_API_URL must be an http(s) URL, got {api_url:?}"
            )));
        }

        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            api_url,
            bot_token: bot_token.into(),
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, NotifyError> {
        Self::new(
            config.telegram_api_url.clone(),
            config.telegram_bot_token.clone(),
            config.telegram_timeout(),
        )
    }

    fn send_message_url(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_url, self.bot_token)
    }
}

impl std::fmt::Debug for TelegramTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramTransport")
            .field("api_url", &self.api_url)
            .field("bot_token", &"***")
            .finish()
    }
}

#[async_trait]
impl Transport for TelegramTransport {
    async fn send(
        &self,
        destination: &str,
        text: &str,
        options: &SendOptions,
    ) -> Result<Ack, TransportError> {
        let body = json!({
            "chat_id": destination,
            "text": text,
            "parse_mode": options.markup.parse_mode(),
            "disable_web_page_preview": options.disable_link_preview,
        });

        let response = self
            .http_client
            .post(self.send_message_url())
            .json(&body)
            .send()
            .await
            .map_err(map_request_error)?;

        let status = response.status();
        let raw = response.text().await.map_err(map_request_error)?;

        match serde_json::from_str::<ApiResponse>(&raw) {
            Ok(api) if status.is_success() && api.ok => Ok(Ack {
                message_id: api.result.map(|m| m.message_id),
            }),
            Ok(api) => Err(map_api_error(status, api)),
            Err(_) => Err(map_api_error(
                status,
                ApiResponse {
                    ok: false,
                    error_code: None,
                    description: Some(raw),
                    parameters: None,
                    result: None,
                },
            )),
        }
    }
}

fn map_request_error(error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout
    } else {
        // Strip the URL; it embeds the bot token.
        TransportError::Network(error.without_url().to_string())
    }
}

fn map_api_error(status: StatusCode, api: ApiResponse) -> TransportError {
    let code = api.error_code.unwrap_or(status.as_u16());
    let description = api
        .description
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown error").to_string());

    match code {
        429 => match api.parameters.and_then(|p| p.retry_after) {
            Some(seconds) => TransportError::RetryAfter {
                retry_after: Duration::from_secs(seconds),
            },
            None => TransportError::Timeout,
        },
        // The Bot API answers 404 when the token in the URL is empty or unknown.
        401 | 403 | 404 => TransportError::Unauthorized(description),
        400 => TransportError::BadRequest(clean_bad_request(&description)),
        _ => TransportError::Api {
            status: code,
            description,
        },
    }
}

/// `"Bad Request: chat not found"` → `"Chat not found"`.
fn clean_bad_request(description: &str) -> String {
    let detail = description
        .strip_prefix("Bad Request: ")
        .unwrap_or(description);
    let mut chars = detail.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => description.to_string(),
    }
}
