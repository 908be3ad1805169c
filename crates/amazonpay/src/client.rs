//! # Amazon Pay Client
//!
//! Immutable after construction. Clone it (an `Arc` bump) and share it
//! across tasks; no locking happens on the request path.

use crate::config::ClientConfig;
use crate::request::{RequestBuilder, SignedRequest};
use crate::signer::Signer;
use crate::transport::{self, HttpTransport, RequestContext};
use amazonpay_core::{AmazonPayError, ApiResponse, ApiResult, Environment, Region};
use http::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};
use url::Url;

/// Signed-request client for the Amazon Pay API v2
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    public_key_id: String,
    signer: Signer,
    region: Region,
    environment: Environment,
    base_url: Url,
    transport: Arc<dyn HttpTransport>,
}

impl Client {
    /// Create a client using a reqwest transport with the configured timeout
    pub fn new(config: ClientConfig) -> ApiResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                AmazonPayError::Configuration(format!("failed to create HTTP client: {e}"))
            })?;
        Self::with_transport(config, Arc::new(http))
    }

    /// Create a client with a caller-supplied HTTP transport
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn HttpTransport>) -> ApiResult<Self> {
        config.validate()?;
        let base_url = config.base_url()?;
        let signer = Signer::from_pem(&config.private_key)?;

        info!(
            public_key_id = %config.public_key_id,
            region = %config.region,
            environment = %config.environment,
            base_url = %base_url,
            "Amazon Pay client ready"
        );

        Ok(Self {
            inner: Arc::new(ClientInner {
                public_key_id: config.public_key_id,
                signer,
                region: config.region,
                environment: config.environment,
                base_url,
                transport,
            }),
        })
    }

    /// Create from environment variables
    pub fn from_env() -> ApiResult<Self> {
        let config = ClientConfig::from_env()?;
        Self::new(config)
    }

    pub fn public_key_id(&self) -> &str {
        &self.inner.public_key_id
    }

    pub fn region(&self) -> Region {
        self.inner.region
    }

    pub fn environment(&self) -> Environment {
        self.inner.environment
    }

    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    pub(crate) fn signer(&self) -> &Signer {
        &self.inner.signer
    }

    fn request_builder(&self) -> RequestBuilder<'_> {
        RequestBuilder::new(
            &self.inner.signer,
            &self.inner.public_key_id,
            &self.inner.base_url,
            self.inner.region,
        )
    }

    /// Build and sign a request. `path` is relative to the base URL,
    /// e.g. `v2/charges/{id}`.
    pub fn build_request<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        idempotency_key: Option<&str>,
    ) -> ApiResult<SignedRequest> {
        self.request_builder()
            .build(method, path, body, idempotency_key)
    }

    /// Send a signed request and decode the body as `T`
    pub async fn execute<T: DeserializeOwned>(
        &self,
        ctx: &RequestContext,
        request: SignedRequest,
    ) -> ApiResult<ApiResponse<T>> {
        transport::execute(self.inner.transport.as_ref(), ctx, request).await
    }

    /// Build, sign and send in one step, using the context's idempotency key
    pub async fn call<B, T>(
        &self,
        ctx: &RequestContext,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> ApiResult<ApiResponse<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.call_with_key(ctx, method, path, body, ctx.idempotency_key())
            .await
    }

    pub(crate) async fn call_with_key<B, T>(
        &self,
        ctx: &RequestContext,
        method: Method,
        path: &str,
        body: Option<&B>,
        idempotency_key: Option<&str>,
    ) -> ApiResult<ApiResponse<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        // Skip signing entirely for a dead context
        ctx.check()?;
        let request = self.build_request(method, path, body, idempotency_key)?;
        debug!(path = request.path(), "Dispatching signed request");
        self.execute(ctx, request).await
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("public_key_id", &self.inner.public_key_id)
            .field("region", &self.inner.region)
            .field("environment", &self.inner.environment)
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}
