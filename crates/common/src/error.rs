use thiserror::Error;

/// Construction-time failures.
///
/// Delivery failures never surface here; the delivery engine absorbs them and
/// reports a `DeliveryOutcome` instead.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid field: {0}")]
    InvalidField(String),
}
