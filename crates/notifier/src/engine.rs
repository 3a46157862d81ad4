//! Delivery engine — the retry state machine around a `Transport`.
//!
//! Each call to `deliver` walks `Attempting → (Retrying → Attempting)* → Terminal`:
//! 1. Attempt a send through the transport
//! 2. On failure, classify the error (see `classify`)
//! 3. Transient failures sleep and retry, with no attempt limit
//! 4. Auth, client and unknown failures drop the notification immediately
//!
//! Backoff sleeps suspend only the calling task. A `CancellationToken` is
//! checked before every attempt and raced against every sleep, so a caller
//! can abort a delivery stuck behind an endless run of transient failures.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

use courier_common::config::RetryConfig;
use courier_common::types::DeliveryOutcome;

use crate::classify::{ErrorClass, classify};
use crate::transport::{SendOptions, Transport, TransportError};

/// Appended to credential failures. A 403 also lands here when the bot was
/// removed from the chat, so the hint names both causes.
pub const AUTH_HINT: &str =
    "check TELEGRAM_BOT_TOKEN and that the bot is still a member of the chat";

/// Appended to client errors that name a missing destination.
pub const DESTINATION_HINT: &str = "check TELEGRAM_CHAT_ID";

/// Drop reasons that are not taken from the transport.
pub const REASON_AUTH: &str = "auth";
pub const REASON_UNKNOWN: &str = "unknown";
pub const REASON_CANCELLED: &str = "cancelled";

/// Suspends the current task for a backoff delay.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Timer-backed sleeper used outside tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[derive(Debug)]
enum DeliveryState {
    Attempting,
    Retrying { delay: Duration },
    Terminal(DeliveryOutcome),
}

/// Delivers formatted text through a transport, retrying transient failures.
///
/// Holds only read-only configuration; share it behind an `Arc` to run
/// deliveries from several tasks at once.
pub struct DeliveryEngine<T> {
    transport: T,
    retry: RetryConfig,
    options: SendOptions,
    sleeper: Arc<dyn Sleeper>,
}

impl<T: Transport> DeliveryEngine<T> {
    pub fn new(transport: T, retry: RetryConfig) -> Self {
        Self {
            transport,
            retry,
            options: SendOptions::default(),
            sleeper: Arc::new(TokioSleeper),
        }
    }

    /// Replace the backoff sleeper (tests use one that records delays).
    pub fn with_sleeper<S>(mut self, sleeper: S) -> Self
    where
        S: Sleeper + 'static,
    {
        self.sleeper = Arc::new(sleeper);
        self
    }

    /// Delay before the next attempt after a transient failure.
    ///
    /// A server hint wins (plus a fixed jitter); otherwise the flat default.
    pub fn retry_delay(&self, retry_after_hint: Option<Duration>) -> Duration {
        match retry_after_hint {
            Some(hint) => hint.saturating_add(self.retry.retry_after_jitter),
            None => self.retry.default_backoff,
        }
    }

    /// Deliver without an external cancellation signal.
    pub async fn deliver(&self, text: &str, destination: &str) -> DeliveryOutcome {
        self.deliver_with_cancel(text, destination, &CancellationToken::new())
            .await
    }

    /// Deliver `text` to `destination`, stopping early if `cancel` fires.
    ///
    /// Never fails: every delivery problem ends in `DeliveryOutcome::Dropped`.
    pub async fn deliver_with_cancel(
        &self,
        text: &str,
        destination: &str,
        cancel: &CancellationToken,
    ) -> DeliveryOutcome {
        let delivery_id = Uuid::new_v4();
        let span = tracing::info_span!("deliver", delivery_id = %delivery_id, destination);

        async move {
            let mut attempt: u32 = 0;
            let mut state = DeliveryState::Attempting;

            loop {
                state = match state {
                    DeliveryState::Attempting if cancel.is_cancelled() => {
                        DeliveryState::Terminal(Self::cancelled(attempt))
                    }
                    DeliveryState::Attempting => {
                        attempt += 1;
                        tracing::debug!(attempt, "Attempting delivery");

                        match self.transport.send(destination, text, &self.options).await {
                            Ok(ack) => {
                                tracing::info!(
                                    attempt,
                                    message_id = ?ack.message_id,
                                    "Sent message to telegram"
                                );
                                tracing::debug!(message = %text, "Delivered message body");
                                DeliveryState::Terminal(DeliveryOutcome::Sent)
                            }
                            Err(error) => self.on_failure(&error, attempt),
                        }
                    }
                    DeliveryState::Retrying { delay } => {
                        tokio::select! {
                            _ = cancel.cancelled() => DeliveryState::Terminal(Self::cancelled(attempt)),
                            _ = self.sleeper.sleep(delay) => DeliveryState::Attempting,
                        }
                    }
                    DeliveryState::Terminal(outcome) => return outcome,
                };
            }
        }
        .instrument(span)
        .await
    }

    fn on_failure(&self, error: &TransportError, attempt: u32) -> DeliveryState {
        match classify(error) {
            ErrorClass::Transient { retry_after_hint } => {
                let delay = self.retry_delay(retry_after_hint);
                tracing::warn!(
                    attempt,
                    delay = ?delay,
                    error = %error,
                    "Delivery failed - retrying in {:.1}s",
                    delay.as_secs_f64()
                );
                DeliveryState::Retrying { delay }
            }
            ErrorClass::AuthFailure => {
                tracing::error!(attempt, "{} - {} - skipping retries", error, AUTH_HINT);
                DeliveryState::Terminal(DeliveryOutcome::dropped(REASON_AUTH))
            }
            ErrorClass::ClientError { detail } => {
                tracing::error!(attempt, "{}", client_error_message(&detail));
                DeliveryState::Terminal(DeliveryOutcome::dropped(detail))
            }
            ErrorClass::Unknown { detail } => {
                tracing::error!(attempt, "Failed to send message! Error: {}", detail);
                DeliveryState::Terminal(DeliveryOutcome::dropped(REASON_UNKNOWN))
            }
        }
    }

    fn cancelled(attempts: u32) -> DeliveryOutcome {
        tracing::warn!(attempts, "Delivery cancelled - dropping notification");
        DeliveryOutcome::dropped(REASON_CANCELLED)
    }
}

/// Log line for a non-retryable client error.
///
/// A missing destination gets a pointer at the chat id configuration.
pub fn client_error_message(detail: &str) -> String {
    if detail.to_lowercase().contains("chat not found") {
        format!("{} - {} - skipping retries", detail, DESTINATION_HINT)
    } else {
        format!("{} - skipping retries", detail)
    }
}
