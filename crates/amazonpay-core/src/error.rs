//! # Client Error Types
//!
//! Typed error handling for the amazonpay-rs client.
//! Every fallible operation returns `Result<T, AmazonPayError>`.
//!
//! Non-2xx responses are *not* errors. A 4xx/5xx with a populated
//! `reasonCode` decodes into the normal response type and the caller
//! branches on the status code.

use crate::response::RawResponse;
use thiserror::Error;

/// Core error type for all client operations
#[derive(Debug, Error)]
pub enum AmazonPayError {
    /// Private key material is malformed or not an RSA key
    #[error("Key parse error: {0}")]
    KeyParse(String),

    /// Request body could not be represented as canonical JSON
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Cryptographic signing failed
    #[error("Signing error: {0}")]
    Signing(String),

    /// Network-level failure (connect, DNS, TLS, body read)
    #[error("Transport error: {message}")]
    Transport {
        message: String,
        raw: Option<Box<RawResponse>>,
    },

    /// Response body is not valid JSON or does not match the expected shape
    #[error("Decode error (status {}): {message}", .raw.status)]
    Decode {
        message: String,
        raw: Box<RawResponse>,
    },

    /// The caller's cancellation token fired before the call completed
    #[error("Request canceled")]
    Canceled,

    /// The caller's deadline elapsed before the call completed
    #[error("Request deadline exceeded")]
    Timeout,

    /// Invalid client configuration (unknown region, bad base URL)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Invalid request data (bad path, bad header value)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl AmazonPayError {
    /// Create a transport error with no response attached
    pub fn transport(message: impl Into<String>) -> Self {
        AmazonPayError::Transport {
            message: message.into(),
            raw: None,
        }
    }

    /// Returns true if a caller-side retry policy may retry this error.
    ///
    /// A retried call must be rebuilt so it gets a fresh timestamp and signature.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AmazonPayError::Transport { .. } | AmazonPayError::Timeout
        )
    }

    /// Returns true for errors that indicate a programming or deployment fault
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            AmazonPayError::KeyParse(_)
                | AmazonPayError::Signing(_)
                | AmazonPayError::Configuration(_)
        )
    }

    /// The raw HTTP response, when one was received before the failure
    pub fn raw_response(&self) -> Option<&RawResponse> {
        match self {
            AmazonPayError::Transport { raw, .. } => raw.as_deref(),
            AmazonPayError::Decode { raw, .. } => Some(&**raw),
            _ => None,
        }
    }
}

/// Result type alias for client operations
pub type ApiResult<T> = Result<T, AmazonPayError>;

#[cfg(test)]
mod tests {
    use super::*;
    use http::{HeaderMap, StatusCode};

    fn raw(status: u16) -> RawResponse {
        RawResponse::new(
            StatusCode::from_u16(status).unwrap(),
            HeaderMap::new(),
            "not json".into(),
        )
    }

    #[test]
    fn test_retryable_errors() {
        assert!(AmazonPayError::transport("connection refused").is_retryable());
        assert!(AmazonPayError::Timeout.is_retryable());
        assert!(!AmazonPayError::Canceled.is_retryable());
        assert!(!AmazonPayError::Encoding("bad".into()).is_retryable());
        assert!(!AmazonPayError::Decode {
            message: "eof".into(),
            raw: Box::new(raw(200)),
        }
        .is_retryable());
    }

    #[test]
    fn test_fatal_errors() {
        assert!(AmazonPayError::KeyParse("not pem".into()).is_fatal());
        assert!(AmazonPayError::Signing("bad key".into()).is_fatal());
        assert!(!AmazonPayError::Timeout.is_fatal());
    }

    #[test]
    fn test_raw_response_exposed() {
        let err = AmazonPayError::Decode {
            message: "expected value".into(),
            raw: Box::new(raw(502)),
        };
        assert_eq!(err.raw_response().unwrap().status, StatusCode::BAD_GATEWAY);
        assert!(err.to_string().contains("502"));

        assert!(AmazonPayError::transport("dns").raw_response().is_none());
        assert!(AmazonPayError::Canceled.raw_response().is_none());
    }
}
