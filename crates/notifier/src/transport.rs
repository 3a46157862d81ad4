//! Transport seam: the narrow capability the delivery engine sends through.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Markup dialect the endpoint should use when rendering the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MarkupDialect {
    #[default]
    Markdown,
    MarkdownV2,
    Html,
}

impl MarkupDialect {
    /// Telegram `parse_mode` value.
    pub fn parse_mode(&self) -> &'static str {
        match self {
            MarkupDialect::Markdown => "Markdown",
            MarkupDialect::MarkdownV2 => "MarkdownV2",
            MarkupDialect::Html => "HTML",
        }
    }
}

/// Per-message send options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SendOptions {
    pub disable_link_preview: bool,
    pub markup: MarkupDialect,
}

impl Default for SendOptions {
    fn default() -> Self {
        Self {
            disable_link_preview: true,
            markup: MarkupDialect::Markdown,
        }
    }
}

/// Acknowledgement returned by the endpoint on success.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ack {
    pub message_id: Option<i64>,
}

/// Raw failure as reported by a transport.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("Timed out")]
    Timeout,

    #[error("Flood control exceeded. Retry in {} seconds", .retry_after.as_secs())]
    RetryAfter { retry_after: Duration },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {status}: {description}")]
    Api { status: u16, description: String },
}

/// Anything able to push a text message to a destination.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(
        &self,
        destination: &str,
        text: &str,
        options: &SendOptions,
    ) -> Result<Ack, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    async fn send(
        &self,
        destination: &str,
        text: &str,
        options: &SendOptions,
    ) -> Result<Ack, TransportError> {
        (**self).send(destination, text, options).await
    }
}
