use serde::{Deserialize, Serialize};

use crate::error::NotifyError;

/// A notification to be formatted and delivered.
///
/// Either `message` is used verbatim, or `fields` are rendered as a list in
/// insertion order. A title-only event is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationEvent {
    pub title: String,
    #[serde(default)]
    pub message: Option<String>,
    /// Ordered field name → value pairs
    #[serde(default)]
    pub fields: Vec<(String, String)>,
}

impl NotificationEvent {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: None,
            fields: Vec::new(),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((key.into(), value.into()));
        self
    }

    /// Parse a `key=value` pair. The value may itself contain `=`.
    pub fn parse_field(raw: &str) -> Result<(String, String), NotifyError> {
        match raw.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() => {
                Ok((key.trim().to_string(), value.to_string()))
            }
            _ => Err(NotifyError::InvalidField(format!(
                "expected key=value, got {raw:?}"
            ))),
        }
    }
}

/// Final result of one delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum DeliveryOutcome {
    Sent,
    Dropped { reason: String },
}

impl DeliveryOutcome {
    pub fn dropped(reason: impl Into<String>) -> Self {
        DeliveryOutcome::Dropped {
            reason: reason.into(),
        }
    }

    pub fn is_sent(&self) -> bool {
        matches!(self, DeliveryOutcome::Sent)
    }
}

impl std::fmt::Display for DeliveryOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeliveryOutcome::Sent => write!(f, "sent"),
            DeliveryOutcome::Dropped { reason } => write!(f, "dropped ({})", reason),
        }
    }
}
