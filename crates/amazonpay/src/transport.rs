//! # Transport
//!
//! Sends a [`SignedRequest`] and decodes the JSON body into the caller's
//! response type.
//!
//! - Any HTTP status decodes normally. A 4xx/5xx is returned as `Ok` and the
//!   caller inspects `ApiResponse::status()` and the embedded error fields.
//! - `Transport` errors are network failures; `Decode` errors carry the raw
//!   response so status and headers can still be logged.
//! - The caller's deadline and cancellation token race the round trip. An
//!   already-expired context fails before any I/O.
//! - Nothing is retried here.

use crate::request::SignedRequest;
use amazonpay_core::{AmazonPayError, ApiResponse, ApiResult, RawResponse};
use async_trait::async_trait;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};
use uuid::Uuid;

/// The HTTP capability injected into a [`Client`](crate::Client).
///
/// Connection pooling, proxies and TLS are the implementation's concern.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: reqwest::Request) -> Result<reqwest::Response, reqwest::Error>;
}

#[async_trait]
impl HttpTransport for reqwest::Client {
    async fn send(&self, request: reqwest::Request) -> Result<reqwest::Response, reqwest::Error> {
        self.execute(request).await
    }
}

/// Per-call deadline, cancellation and idempotency key.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    deadline: Option<Instant>,
    cancel: Option<CancellationToken>,
    idempotency_key: Option<String>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail with `Timeout` if the call has not completed by `deadline`
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Deadline relative to now
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Fail with `Canceled` once `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Sent (and signed) as `x-amz-pay-idempotency-key`. Reuse the same key
    /// when retrying a create call.
    pub fn with_idempotency_key(mut self, key: impl Into<String>) -> Self {
        self.idempotency_key = Some(key.into());
        self
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn idempotency_key(&self) -> Option<&str> {
        self.idempotency_key.as_deref()
    }

    /// The caller's key, or a fresh v4 UUID for endpoints that require one.
    /// A blank key counts as unset.
    pub(crate) fn idempotency_key_or_generate(&self) -> String {
        match self.idempotency_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => key.to_string(),
            _ => {
                let key = Uuid::new_v4().to_string();
                debug!(idempotency_key = %key, "Generated idempotency key");
                key
            }
        }
    }

    /// Fails fast when the context is already cancelled or expired
    pub fn check(&self) -> ApiResult<()> {
        if self.cancel.as_ref().is_some_and(|t| t.is_cancelled()) {
            return Err(AmazonPayError::Canceled);
        }
        if self.deadline.is_some_and(|d| d <= Instant::now()) {
            return Err(AmazonPayError::Timeout);
        }
        Ok(())
    }

    /// Run `fut` until it completes, the token fires, or the deadline passes.
    /// The losing branch is dropped.
    pub(crate) async fn run<F, T>(&self, fut: F) -> ApiResult<T>
    where
        F: Future<Output = ApiResult<T>>,
    {
        let cancelled = async {
            match &self.cancel {
                Some(token) => token.cancelled().await,
                None => std::future::pending().await,
            }
        };
        let expired = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            result = fut => result,
            _ = cancelled => Err(AmazonPayError::Canceled),
            _ = expired => Err(AmazonPayError::Timeout),
        }
    }
}

/// Send `request` and decode the response body as `T`
pub async fn execute<T: DeserializeOwned>(
    transport: &dyn HttpTransport,
    ctx: &RequestContext,
    request: SignedRequest,
) -> ApiResult<ApiResponse<T>> {
    ctx.check()?;

    let method = request.method().clone();
    let path = request.path().to_string();
    debug!(method = %method, path = %path, "Sending request");

    let raw = ctx.run(round_trip(transport, request)).await?;

    if !raw.status.is_success() {
        warn!(
            method = %method,
            path = %path,
            status = raw.status.as_u16(),
            request_id = raw.request_id().unwrap_or("-"),
            "Amazon Pay returned non-success status"
        );
    } else {
        debug!(method = %method, path = %path, status = raw.status.as_u16(), "Received response");
    }

    decode(raw)
}

async fn round_trip(transport: &dyn HttpTransport, request: SignedRequest) -> ApiResult<RawResponse> {
    let response = transport
        .send(request.into_reqwest())
        .await
        .map_err(|e| AmazonPayError::transport(error_chain(&e)))?;

    let status = response.status();
    let headers = response.headers().clone();

    match response.bytes().await {
        Ok(body) => Ok(RawResponse::new(status, headers, body)),
        Err(e) => Err(AmazonPayError::Transport {
            message: format!("failed to read response body: {}", error_chain(&e)),
            raw: Some(Box::new(RawResponse::new(status, headers, Bytes::new()))),
        }),
    }
}

/// Decode a raw response. An empty body decodes as `{}`.
pub fn decode<T: DeserializeOwned>(raw: RawResponse) -> ApiResult<ApiResponse<T>> {
    let body: &[u8] = if raw.body.iter().all(u8::is_ascii_whitespace) {
        b"{}"
    } else {
        &raw.body
    };

    match serde_json::from_slice::<T>(body) {
        Ok(data) => Ok(ApiResponse::new(data, raw)),
        Err(e) => {
            error!(
                status = raw.status.as_u16(),
                request_id = raw.request_id().unwrap_or("-"),
                "Failed to decode Amazon Pay response: {}",
                e
            );
            Err(AmazonPayError::Decode {
                message: e.to_string(),
                raw: Box::new(raw),
            })
        }
    }
}

/// reqwest hides the interesting part (DNS, TLS, refused) in the source chain
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
