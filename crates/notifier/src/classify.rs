//! Maps raw transport errors onto the retry taxonomy.
//!
//! Only failures that are known to be transient are retried. Anything the
//! transport reports that we do not recognise is treated as terminal.

use std::time::Duration;

use crate::transport::TransportError;

/// Retry-relevant class of a delivery failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorClass {
    /// Timeout or rate limiting; retry after the hint (if any).
    Transient { retry_after_hint: Option<Duration> },
    /// Credentials rejected.
    AuthFailure,
    /// The request itself is wrong (bad destination, malformed payload).
    ClientError { detail: String },
    /// Anything else.
    Unknown { detail: String },
}

/// Classify a raw transport error.
pub fn classify(error: &TransportError) -> ErrorClass {
    match error {
        TransportError::Timeout => ErrorClass::Transient {
            retry_after_hint: None,
        },
        TransportError::RetryAfter { retry_after } => ErrorClass::Transient {
            retry_after_hint: Some(*retry_after),
        },
        TransportError::Unauthorized(_) => ErrorClass::AuthFailure,
        TransportError::BadRequest(detail) => ErrorClass::ClientError {
            detail: detail.clone(),
        },
        TransportError::Network(detail) => ErrorClass::Unknown {
            detail: detail.clone(),
        },
        TransportError::Api { .. } => ErrorClass::Unknown {
            detail: error.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_is_transient_without_hint() {
        assert_eq!(
            classify(&TransportError::Timeout),
            ErrorClass::Transient {
                retry_after_hint: None
            }
        );
    }

    #[test]
    fn test_retry_after_keeps_hint() {
        let class = classify(&TransportError::RetryAfter {
            retry_after: Duration::from_secs(7),
        });
        assert_eq!(
            class,
            ErrorClass::Transient {
                retry_after_hint: Some(Duration::from_secs(7))
            }
        );
    }

    #[test]
    fn test_unauthorized_is_auth_failure() {
        assert_eq!(
            classify(&TransportError::Unauthorized("Unauthorized".to_string())),
            ErrorClass::AuthFailure
        );
    }

    #[test]
    fn test_bad_request_is_client_error() {
        assert_eq!(
            classify(&TransportError::BadRequest("Chat not found".to_string())),
            ErrorClass::ClientError {
                detail: "Chat not found".to_string()
            }
        );
    }

    #[test]
    fn test_network_and_api_errors_are_unknown() {
        assert_eq!(
            classify(&TransportError::Network("connection reset".to_string())),
            ErrorClass::Unknown {
                detail: "connection reset".to_string()
            }
        );
        assert_eq!(
            classify(&TransportError::Api {
                status: 502,
                description: "Bad Gateway".to_string()
            }),
            ErrorClass::Unknown {
                detail: "API error 502: Bad Gateway".to_string()
            }
        );
    }
}
