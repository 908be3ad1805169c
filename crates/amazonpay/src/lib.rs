//! # amazonpay
//!
//! Signed-request client for the Amazon Pay API v2.
//!
//! Every request is signed with the merchant's RSA key (RSASSA-PSS over
//! SHA-256) before it leaves the process:
//!
//! 1. **Canonicalizer** - request bodies serialize to deterministic JSON
//!    (sorted keys, no whitespace), so the signed bytes are the sent bytes
//! 2. **Signer** - parses the PEM key once and signs string-to-sign values
//! 3. **RequestBuilder** - assembles the `x-amz-pay-*` headers, canonical
//!    request and `Authorization` header
//! 4. **Transport** - sends through an injectable [`HttpTransport`], races
//!    the caller's deadline and cancellation token, and decodes the body
//!
//! Non-2xx responses are *not* errors. They decode into the same response
//! type and the caller checks [`ApiResponse::status`] or
//! [`ApiResponse::business_error`].
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use amazonpay::{Client, ClientConfig, RequestContext, CreateChargeRequest};
//! use amazonpay_core::Price;
//! use std::time::Duration;
//!
//! // AMAZON_PAY_PUBLIC_KEY_ID, AMAZON_PAY_PRIVATE_KEY_PATH, AMAZON_PAY_REGION
//! let client = Client::from_env()?;
//!
//! let ctx = RequestContext::new().with_timeout(Duration::from_secs(10));
//! let resp = client
//!     .create_charge(
//!         &ctx,
//!         &CreateChargeRequest {
//!             charge_permission_id: "P01-0000000-0000000".into(),
//!             charge_amount: Some(Price::new("1000", "JPY")),
//!             capture_now: Some(true),
//!             ..Default::default()
//!         },
//!     )
//!     .await?;
//!
//! match resp.business_error() {
//!     Some(err) => eprintln!("declined: {}", err.reason_code),
//!     None => println!("charge {} is {}", resp.data.charge_id, resp.data.state()),
//! }
//! ```
//!
//! ## Checkout Button
//!
//! ```rust,ignore
//! let button = client.sign_checkout_button(&CreateCheckoutSessionRequest {
//!     store_id: "amzn1.application-oa2-client.xxxx".into(),
//!     ..Default::default()
//! })?;
//! // Embed button.payload, button.signature and button.public_key_id in the page
//! ```

pub mod button;
pub mod canonical;
pub mod charge;
pub mod charge_permission;
pub mod checkout_session;
pub mod client;
pub mod config;
pub mod request;
pub mod signer;
pub mod transport;

// Re-exports
pub use amazonpay_core::{AmazonPayError, ApiResponse, ApiResult, Environment, RawResponse, Region};
pub use button::{sign_payload, ButtonSignature};
pub use canonical::canonicalize;
pub use charge::{CancelChargeRequest, CaptureChargeRequest, Charge, CreateChargeRequest};
pub use charge_permission::{
    ChargePermission, CloseChargePermissionRequest, UpdateChargePermissionRequest,
};
pub use checkout_session::{
    CheckoutSession, CompleteCheckoutSessionRequest, Constraint, CreateCheckoutSessionRequest,
    PaymentDetails, UpdateCheckoutSessionRequest, WebCheckoutDetails,
};
pub use client::Client;
pub use config::ClientConfig;
pub use request::{RequestBuilder, SignedRequest};
pub use signer::Signer;
pub use transport::{HttpTransport, RequestContext};
