//! Notification delivery.
//!
//! Events are rendered by the `formatter`, then handed to a `DeliveryEngine`
//! that retries transient transport failures until the message is sent or a
//! terminal failure drops it. Telegram is the only backend.

pub mod classify;
pub mod engine;
pub mod formatter;
pub mod notifier;
pub mod telegram;
pub mod transport;

pub use classify::{ErrorClass, classify};
pub use engine::{DeliveryEngine, Sleeper, TokioSleeper};
pub use formatter::{MessageFormat, format_message, humanize_key};
pub use notifier::{Notifier, TelegramNotifier, spawn_notify};
pub use telegram::TelegramTransport;
pub use transport::{Ack, MarkupDialect, SendOptions, Transport, TransportError};
