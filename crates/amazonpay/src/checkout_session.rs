//! # Checkout Sessions
//!
//! A checkout session tracks the buyer from the Amazon Pay button to a
//! completed charge (or a charge permission for recurring billing).
//!
//! ```rust,ignore
//! let req = CreateCheckoutSessionRequest {
//!     web_checkout_details: Some(WebCheckoutDetails {
//!         checkout_review_return_url: Some("https://shop.example/review".into()),
//!         ..Default::default()
//!     }),
//!     store_id: store_id.into(),
//!     scopes: Some(vec!["name".into(), "email".into()]),
//!     ..Default::default()
//! };
//!
//! // Render the button with these three values
//! let button = client.sign_checkout_button(&req)?;
//! ```

use crate::canonical;
use crate::config::API_VERSION;
use crate::request::resource_path;
use crate::transport::RequestContext;
use crate::Client;
use amazonpay_core::{
    Address, ApiResponse, ApiResult, Buyer, ErrorResponse, HasErrorFields, MerchantMetadata,
    PaymentPreference, Price, ProviderMetadata, RecurringMetadata, StatusDetails,
};
use http::Method;
use serde::{Deserialize, Serialize};
use tracing::instrument;

const COLLECTION: &str = "checkoutSessions";

/// Buyer redirect URLs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebCheckoutDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkout_review_return_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkout_result_return_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkout_cancel_url: Option<String>,
    /// Set by the API after an update; redirect the buyer here
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amazon_pay_redirect_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkout_mode: Option<String>,
}

/// How and how much to charge when the session completes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDetails {
    /// `Confirm`, `Authorize` or `AuthorizeWithCapture`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_intent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_handle_pending_authorization: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub charge_amount: Option<Price>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_order_amount: Option<Price>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soft_descriptor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presentment_currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_overcharge: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extend_expiration: Option<bool>,
}

/// Checkout constraint that blocks completion until resolved
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Constraint {
    #[serde(deserialize_with = "amazonpay_core::de::null_as_default")]
    pub constraint_id: String,
    #[serde(deserialize_with = "amazonpay_core::de::null_as_default")]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCheckoutSessionRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_checkout_details: Option<WebCheckoutDetails>,
    pub store_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scopes: Option<Vec<String>>,
    /// `OneTime` or `Recurring`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub charge_permission_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurring_metadata: Option<RecurringMetadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_details: Option<PaymentDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant_metadata: Option<MerchantMetadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_metadata: Option<ProviderMetadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform_id: Option<String>,
}

impl CreateCheckoutSessionRequest {
    /// Canonical JSON for the checkout button's `payloadJSON`
    pub fn to_payload(&self) -> ApiResult<String> {
        canonical::to_canonical_string(self)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCheckoutSessionRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_checkout_details: Option<WebCheckoutDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurring_metadata: Option<RecurringMetadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_details: Option<PaymentDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant_metadata: Option<MerchantMetadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_metadata: Option<ProviderMetadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteCheckoutSessionRequest {
    pub charge_amount: Price,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_order_amount: Option<Price>,
}

/// Checkout session resource
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CheckoutSession {
    #[serde(flatten)]
    pub error: ErrorResponse,
    #[serde(deserialize_with = "amazonpay_core::de::null_as_default")]
    pub checkout_session_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub web_checkout_details: Option<WebCheckoutDetails>,
    #[serde(deserialize_with = "amazonpay_core::de::null_as_default")]
    pub product_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_details: Option<PaymentDetails>,
    #[serde(deserialize_with = "amazonpay_core::de::null_as_default")]
    pub charge_permission_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurring_metadata: Option<RecurringMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merchant_metadata: Option<MerchantMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_metadata: Option<ProviderMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buyer: Option<Buyer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_address: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<Address>,
    #[serde(deserialize_with = "amazonpay_core::de::null_as_default")]
    pub payment_preferences: Vec<PaymentPreference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_details: Option<StatusDetails>,
    #[serde(deserialize_with = "amazonpay_core::de::null_as_default")]
    pub constraints: Vec<Constraint>,
    #[serde(deserialize_with = "amazonpay_core::de::null_as_default")]
    pub platform_id: String,
    #[serde(deserialize_with = "amazonpay_core::de::null_as_default")]
    pub charge_permission_id: String,
    #[serde(deserialize_with = "amazonpay_core::de::null_as_default")]
    pub charge_id: String,
    #[serde(deserialize_with = "amazonpay_core::de::null_as_default")]
    pub store_id: String,
    #[serde(deserialize_with = "amazonpay_core::de::null_as_default")]
    pub creation_timestamp: String,
    #[serde(deserialize_with = "amazonpay_core::de::null_as_default")]
    pub expiration_timestamp: String,
    #[serde(deserialize_with = "amazonpay_core::de::null_as_default")]
    pub release_environment: String,
}

impl HasErrorFields for CheckoutSession {
    fn error_fields(&self) -> &ErrorResponse {
        &self.error
    }
}

impl CheckoutSession {
    /// `statusDetails.state`, empty when absent
    pub fn state(&self) -> &str {
        self.status_details
            .as_ref()
            .map(|s| s.state.as_str())
            .unwrap_or_default()
    }

    /// Where to send the buyer after `update_checkout_session`
    pub fn amazon_pay_redirect_url(&self) -> Option<&str> {
        self.web_checkout_details
            .as_ref()
            .and_then(|d| d.amazon_pay_redirect_url.as_deref())
    }

    /// Descriptor of the buyer's first payment preference (e.g. "Visa ****1111")
    pub fn payment_descriptor(&self) -> Option<&str> {
        self.payment_preferences
            .first()
            .map(|p| p.payment_descriptor.as_str())
    }
}

impl Client {
    /// `POST /v2/checkoutSessions`. Sends the context's idempotency key, or a fresh one.
    #[instrument(skip(self, ctx, req))]
    pub async fn create_checkout_session(
        &self,
        ctx: &RequestContext,
        req: &CreateCheckoutSessionRequest,
    ) -> ApiResult<ApiResponse<CheckoutSession>> {
        let path = format!("{API_VERSION}/{COLLECTION}");
        let key = ctx.idempotency_key_or_generate();
        self.call_with_key(ctx, Method::POST, &path, Some(req), Some(key.as_str()))
            .await
    }

    /// `GET /v2/checkoutSessions/{checkoutSessionId}`
    #[instrument(skip(self, ctx))]
    pub async fn get_checkout_session(
        &self,
        ctx: &RequestContext,
        checkout_session_id: &str,
    ) -> ApiResult<ApiResponse<CheckoutSession>> {
        let path = resource_path(COLLECTION, checkout_session_id, None)?;
        self.call::<(), _>(ctx, Method::GET, &path, None).await
    }

    /// `PATCH /v2/checkoutSessions/{checkoutSessionId}`
    #[instrument(skip(self, ctx, req))]
    pub async fn update_checkout_session(
        &self,
        ctx: &RequestContext,
        checkout_session_id: &str,
        req: &UpdateCheckoutSessionRequest,
    ) -> ApiResult<ApiResponse<CheckoutSession>> {
        let path = resource_path(COLLECTION, checkout_session_id, None)?;
        self.call(ctx, Method::PATCH, &path, Some(req)).await
    }

    /// `POST /v2/checkoutSessions/{checkoutSessionId}/complete`
    #[instrument(skip(self, ctx, req))]
    pub async fn complete_checkout_session(
        &self,
        ctx: &RequestContext,
        checkout_session_id: &str,
        req: &CompleteCheckoutSessionRequest,
    ) -> ApiResult<ApiResponse<CheckoutSession>> {
        let path = resource_path(COLLECTION, checkout_session_id, Some("complete"))?;
        self.call(ctx, Method::POST, &path, Some(req)).await
    }
}
