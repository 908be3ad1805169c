//! # Client Configuration
//!
//! Explicit configuration passed to [`Client::new`](crate::Client::new).
//! The client never reads the environment on its own; `from_env` is an
//! opt-in helper for binaries.

use amazonpay_core::{AmazonPayError, ApiResult, Environment, Region};
use base64::{engine::general_purpose::STANDARD, Engine};
use std::env;
use std::time::Duration;
use url::Url;

/// Versioned path prefix for every API call
pub const API_VERSION: &str = "v2";

/// Default per-request timeout applied by the built-in reqwest transport
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Amazon Pay API configuration
#[derive(Clone)]
pub struct ClientConfig {
    /// Public key id registered in Seller Central (may carry a `SANDBOX-`/`LIVE-` prefix)
    pub public_key_id: String,

    /// RSA private key, PEM encoded (PKCS#8 or PKCS#1)
    pub private_key: Vec<u8>,

    /// Marketplace region
    pub region: Region,

    /// Sandbox or live
    pub environment: Environment,

    /// API base URL override (for testing/mocking or an egress proxy)
    pub api_base_url: Option<String>,

    /// Timeout for the built-in transport
    pub timeout: Duration,
}

impl ClientConfig {
    /// Create config with explicit values
    pub fn new(
        public_key_id: impl Into<String>,
        private_key: impl Into<Vec<u8>>,
        region: Region,
        environment: Environment,
    ) -> Self {
        Self {
            public_key_id: public_key_id.into(),
            private_key: private_key.into(),
            region,
            environment,
            api_base_url: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `AMAZON_PAY_PUBLIC_KEY_ID`
    /// - `AMAZON_PAY_PRIVATE_KEY_PATH` (PEM file) or `AMAZON_PAY_PRIVATE_KEY` (base64 of the PEM)
    /// - `AMAZON_PAY_REGION` (`na`, `us`, `eu`, `de`, `uk`, `jp`, `fe`)
    ///
    /// Optional:
    /// - `AMAZON_PAY_SANDBOX` (`true`/`false`, default `true`)
    /// - `AMAZON_PAY_API_BASE_URL`
    pub fn from_env() -> ApiResult<Self> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let public_key_id = env::var("AMAZON_PAY_PUBLIC_KEY_ID").map_err(|_| {
            AmazonPayError::Configuration("AMAZON_PAY_PUBLIC_KEY_ID not set".to_string())
        })?;

        let private_key = match env::var("AMAZON_PAY_PRIVATE_KEY_PATH") {
            Ok(path) => std::fs::read(&path).map_err(|e| {
                AmazonPayError::Configuration(format!("failed to read private key {path}: {e}"))
            })?,
            Err(_) => {
                let encoded = env::var("AMAZON_PAY_PRIVATE_KEY").map_err(|_| {
                    AmazonPayError::Configuration(
                        "AMAZON_PAY_PRIVATE_KEY_PATH or AMAZON_PAY_PRIVATE_KEY must be set"
                            .to_string(),
                    )
                })?;
                STANDARD.decode(encoded.trim()).map_err(|e| {
                    AmazonPayError::Configuration(format!(
                        "AMAZON_PAY_PRIVATE_KEY is not valid base64: {e}"
                    ))
                })?
            }
        };

        let region: Region = env::var("AMAZON_PAY_REGION")
            .map_err(|_| AmazonPayError::Configuration("AMAZON_PAY_REGION not set".to_string()))?
            .parse()?;

        let sandbox = match env::var("AMAZON_PAY_SANDBOX") {
            Ok(v) => parse_bool(&v).ok_or_else(|| {
                AmazonPayError::Configuration(format!(
                    "AMAZON_PAY_SANDBOX must be true or false, got {v:?}"
                ))
            })?,
            // Unset: follow the key prefix, sandbox otherwise
            Err(_) => key_environment(&public_key_id) != Some(Environment::Live),
        };

        let mut config = Self::new(
            public_key_id,
            private_key,
            region,
            Environment::from_sandbox_flag(sandbox),
        );
        if let Ok(url) = env::var("AMAZON_PAY_API_BASE_URL") {
            config = config.with_api_base_url(url);
        }
        Ok(config)
    }

    /// Builder: set custom API base URL (for testing)
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = Some(url.into());
        self
    }

    /// Builder: set the built-in transport's timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// True when the public key id itself names the environment
    /// (`SANDBOX-...` / `LIVE-...`); the URL then carries no environment segment.
    pub fn is_environment_scoped_key(&self) -> bool {
        key_environment(&self.public_key_id).is_some()
    }

    /// Base URL every API path is joined onto. Always ends with `/`.
    ///
    /// `https://pay-api.amazon.{com|eu|jp}/{sandbox|live}/` unless overridden.
    pub fn base_url(&self) -> ApiResult<Url> {
        let raw = match &self.api_base_url {
            Some(url) => url.clone(),
            None if self.is_environment_scoped_key() => {
                format!("https://{}/", self.region.api_host())
            }
            None => format!(
                "https://{}/{}/",
                self.region.api_host(),
                self.environment.as_str()
            ),
        };

        let mut url = Url::parse(&raw).map_err(|e| {
            AmazonPayError::Configuration(format!("invalid API base URL {raw:?}: {e}"))
        })?;
        if url.host_str().is_none() {
            return Err(AmazonPayError::Configuration(format!(
                "API base URL {raw:?} has no host"
            )));
        }
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(url)
    }

    pub(crate) fn validate(&self) -> ApiResult<()> {
        if self.public_key_id.trim().is_empty() {
            return Err(AmazonPayError::Configuration(
                "public key id must not be empty".to_string(),
            ));
        }
        if let Some(scoped) = key_environment(&self.public_key_id) {
            if scoped != self.environment {
                return Err(AmazonPayError::Configuration(format!(
                    "public key id is a {scoped} key but the environment is {}",
                    self.environment
                )));
            }
        }
        Ok(())
    }
}

/// Environment named by a `SANDBOX-`/`LIVE-` key prefix
fn key_environment(public_key_id: &str) -> Option<Environment> {
    if public_key_id.starts_with("SANDBOX-") {
        Some(Environment::Sandbox)
    } else if public_key_id.starts_with("LIVE-") {
        Some(Environment::Live)
    } else {
        None
    }
}

// The private key never appears in logs.
impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("public_key_id", &self.public_key_id)
            .field("private_key", &"<redacted>")
            .field("region", &self.region)
            .field("environment", &self.environment)
            .field("api_base_url", &self.api_base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}
