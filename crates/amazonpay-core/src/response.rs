//! # Response Types
//!
//! The raw HTTP response surfaced alongside every decoded result, and the
//! error envelope shared by every Amazon Pay response body.

use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use serde::{Deserialize, Serialize};

/// The raw HTTP response as received from the API.
///
/// Returned with both successful and failed calls so callers can log the
/// status, the `x-amz-pay-request-id` header and the body.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl RawResponse {
    pub fn new(status: StatusCode, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Server-assigned request id, useful when contacting support
    pub fn request_id(&self) -> Option<&str> {
        self.headers
            .get("x-amz-pay-request-id")
            .and_then(|v| v.to_str().ok())
    }

    /// Body as lossy UTF-8 (for logging)
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Error fields embedded in every response body.
///
/// Both fields are empty strings on success. Use the HTTP status
/// (see [`ApiResponse::is_success`]) to decide success, not these fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    #[serde(
        default,
        skip_serializing_if = "String::is_empty",
        deserialize_with = "crate::de::null_as_default"
    )]
    pub reason_code: String,
    #[serde(
        default,
        skip_serializing_if = "String::is_empty",
        deserialize_with = "crate::de::null_as_default"
    )]
    pub message: String,
}

impl ErrorResponse {
    /// True when the server populated a reason code
    pub fn is_populated(&self) -> bool {
        !self.reason_code.is_empty()
    }
}

/// A decoded response body paired with the raw HTTP response.
#[derive(Debug, Clone)]
pub struct ApiResponse<T> {
    pub data: T,
    pub raw: RawResponse,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T, raw: RawResponse) -> Self {
        Self { data, raw }
    }

    pub fn status(&self) -> StatusCode {
        self.raw.status
    }

    /// True for any 2xx status
    pub fn is_success(&self) -> bool {
        self.raw.status.is_success()
    }

    /// True for any non-2xx status, regardless of the error fields
    pub fn has_error(&self) -> bool {
        !self.is_success()
    }

    pub fn into_data(self) -> T {
        self.data
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ApiResponse<U> {
        ApiResponse {
            data: f(self.data),
            raw: self.raw,
        }
    }
}

/// Implemented by every response type that embeds [`ErrorResponse`].
pub trait HasErrorFields {
    fn error_fields(&self) -> &ErrorResponse;
}

impl<T: HasErrorFields> ApiResponse<T> {
    /// The business error (reason code + message), present only on non-2xx
    /// responses. Zero-valued fields on a 2xx are ignored.
    pub fn business_error(&self) -> Option<&ErrorResponse> {
        if self.has_error() {
            Some(self.data.error_fields())
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, Deserialize)]
    struct Thing {
        #[serde(flatten)]
        error: ErrorResponse,
        #[serde(default)]
        id: String,
    }

    impl HasErrorFields for Thing {
        fn error_fields(&self) -> &ErrorResponse {
            &self.error
        }
    }

    fn response(status: u16, body: &'static str) -> ApiResponse<Thing> {
        let data = serde_json::from_str(body).unwrap();
        let raw = RawResponse::new(
            StatusCode::from_u16(status).unwrap(),
            HeaderMap::new(),
            Bytes::from_static(body.as_bytes()),
        );
        ApiResponse::new(data, raw)
    }

    #[test]
    fn test_success_ignores_error_fields() {
        let resp = response(200, r#"{"id":"S01-123","reasonCode":"","message":""}"#);
        assert!(resp.is_success());
        assert!(!resp.has_error());
        assert!(resp.business_error().is_none());
        assert_eq!(resp.data.id, "S01-123");
    }

    #[test]
    fn test_error_fields_absent_decode_as_empty() {
        let resp = response(201, r#"{"id":"S01-123"}"#);
        assert_eq!(resp.data.error, ErrorResponse::default());
        assert!(!resp.data.error.is_populated());
    }

    #[test]
    fn test_null_error_fields_decode_as_empty() {
        let resp = response(200, r#"{"id":"S01-123","reasonCode":null,"message":null}"#);
        assert_eq!(resp.data.error, ErrorResponse::default());
        assert_eq!(resp.data.id, "S01-123");
    }

    #[test]
    fn test_business_error_on_non_2xx() {
        let resp = response(
            422,
            r#"{"reasonCode":"InvalidChargePermissionStatus","message":"closed"}"#,
        );
        assert!(resp.has_error());
        let err = resp.business_error().unwrap();
        assert_eq!(err.reason_code, "InvalidChargePermissionStatus");
        assert_eq!(err.message, "closed");
    }

    #[test]
    fn test_request_id_header() {
        let mut headers = HeaderMap::new();
        headers.insert("x-amz-pay-request-id", "req-1".parse().unwrap());
        let raw = RawResponse::new(StatusCode::OK, headers, Bytes::new());
        assert_eq!(raw.request_id(), Some("req-1"));
        assert_eq!(raw.body_text(), "");
    }
}
