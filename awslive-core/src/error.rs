//! Service access layer errors

use thiserror::Error;

/// Failure reported by the remote service access layer.
///
/// Carries a human-readable message plus the underlying cause when one is
/// available (an SDK transport error, a malformed response, ...). Lifecycle
/// wrappers attach these as the `#[source]` of their own error variants.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ApiError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }
}

/// Whether a remote call completed with a non-success status.
///
/// The managed service reports an HTTP status alongside each response;
/// anything other than 200 counts as an error.
pub fn is_error_call(status: u16) -> bool {
    status != 200
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_200_is_not_an_error() {
        assert!(!is_error_call(200));
    }

    #[test]
    fn status_400_is_an_error() {
        assert!(is_error_call(400));
    }

    #[test]
    fn error_chain_keeps_the_cause() {
        let cause = std::io::Error::new(std::io::ErrorKind::Other, "socket closed");
        let err = ApiError::with_source("ListQueues call failed", cause);
        assert_eq!(err.to_string(), "ListQueues call failed");
        assert!(std::error::Error::source(&err).is_some());
    }
}
