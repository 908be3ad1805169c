//! # amazonpay-core
//!
//! Core types for the amazonpay-rs client.
//!
//! This crate provides:
//! - `AmazonPayError` and `ApiResult` for typed error handling
//! - `RawResponse`, `ApiResponse` and the shared `ErrorResponse` envelope
//! - `Region` and `Environment` for endpoint selection
//! - Value types shared by every resource (`Price`, `MerchantMetadata`, ...)
//! - `de::null_as_default` for response fields the API may send as `null`
//!
//! ## Example
//!
//! ```rust,ignore
//! use amazonpay_core::{ApiResponse, HasErrorFields};
//!
//! let resp = client.get_charge(&ctx, "S03-0000000-0000000-C000000").await?;
//! if let Some(err) = resp.business_error() {
//!     // Non-2xx: branch on the reason code
//!     eprintln!("{} | {}", err.reason_code, err.message);
//! }
//! ```

pub mod de;
pub mod error;
pub mod region;
pub mod response;
pub mod types;

// Re-exports for convenience
pub use error::{AmazonPayError, ApiResult};
pub use region::{Environment, Region};
pub use response::{ApiResponse, ErrorResponse, HasErrorFields, RawResponse};
pub use types::{
    Address, Buyer, Frequency, Limits, MerchantMetadata, PaymentPreference, Price,
    ProviderMetadata, RecurringMetadata, StatusDetails,
};
