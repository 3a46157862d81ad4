//! Notifier capability and the Telegram backend.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use courier_common::config::AppConfig;
use courier_common::error::NotifyError;
use courier_common::types::{DeliveryOutcome, NotificationEvent};

use crate::engine::DeliveryEngine;
use crate::formatter::MessageFormat;
use crate::telegram::TelegramTransport;
use crate::transport::Transport;

/// A backend that can deliver notifications.
///
/// `notify` is fire-and-forget: delivery problems are logged, never returned.
#[async_trait]
pub trait Notifier: Send + Sync {
    fn name(&self) -> &'static str;

    async fn notify(&self, event: &NotificationEvent);
}

/// Run a notification on its own task so a long retry loop never holds up
/// the caller or other notifications.
pub fn spawn_notify(notifier: Arc<dyn Notifier>, event: NotificationEvent) -> JoinHandle<()> {
    tokio::spawn(async move { notifier.notify(&event).await })
}

/// Formats events as Telegram Markdown and delivers them to one chat.
pub struct TelegramNotifier<T = TelegramTransport> {
    engine: Arc<DeliveryEngine<T>>,
    chat_id: String,
    cancel: CancellationToken,
}

impl TelegramNotifier<TelegramTransport> {
    /// Build the notifier from configuration.
    ///
    /// Missing credentials are not checked here; they show up as an auth or
    /// client error on the first delivery.
    pub fn from_config(config: &AppConfig) -> Result<Self, NotifyError> {
        let transport = TelegramTransport::from_config(config)?;
        let engine = DeliveryEngine::new(transport, config.retry);
        Ok(Self::new(engine, config.telegram_chat_id.clone()))
    }
}

impl<T: Transport> TelegramNotifier<T> {
    pub fn new(engine: DeliveryEngine<T>, chat_id: impl Into<String>) -> Self {
        tracing::debug!("Initialized telegram notifier");
        Self {
            engine: Arc::new(engine),
            chat_id: chat_id.into(),
            cancel: CancellationToken::new(),
        }
    }

    /// Use an externally owned token, e.g. one cancelled on shutdown.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Format and deliver one event, returning how it ended.
    pub async fn send_event(&self, event: &NotificationEvent) -> DeliveryOutcome {
        tracing::debug!(title = %event.title, "Sending notification to telegram");
        let text = event.render();
        self.engine
            .deliver_with_cancel(&text, &self.chat_id, &self.cancel)
            .await
    }
}

#[async_trait]
impl<T: Transport + 'static> Notifier for TelegramNotifier<T> {
    fn name(&self) -> &'static str {
        "telegram"
    }

    async fn notify(&self, event: &NotificationEvent) {
        let outcome = self.send_event(event).await;
        if let DeliveryOutcome::Dropped { reason } = &outcome {
            tracing::debug!(title = %event.title, reason = %reason, "Notification dropped");
        }
    }
}
