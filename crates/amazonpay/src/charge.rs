//! # Charges
//!
//! Create, read, capture and cancel charges against a charge permission.

use crate::config::API_VERSION;
use crate::request::resource_path;
use crate::transport::RequestContext;
use crate::Client;
use amazonpay_core::{
    ApiResponse, ApiResult, ErrorResponse, HasErrorFields, MerchantMetadata, Price,
    ProviderMetadata, StatusDetails,
};
use http::Method;
use serde::{Deserialize, Serialize};
use tracing::instrument;

const COLLECTION: &str = "charges";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateChargeRequest {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub charge_permission_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub charge_amount: Option<Price>,
    /// Capture immediately. `Some(false)` is sent, `None` is omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capture_now: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soft_descriptor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_handle_pending_authorization: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant_metadata: Option<MerchantMetadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_metadata: Option<ProviderMetadata>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureChargeRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capture_amount: Option<Price>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soft_descriptor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant_metadata: Option<MerchantMetadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_metadata: Option<ProviderMetadata>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelChargeRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancellation_reason: Option<String>,
}

/// Charge resource, returned by every charge operation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Charge {
    #[serde(flatten)]
    pub error: ErrorResponse,
    #[serde(deserialize_with = "amazonpay_core::de::null_as_default")]
    pub charge_id: String,
    #[serde(deserialize_with = "amazonpay_core::de::null_as_default")]
    pub charge_permission_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub charge_amount: Option<Price>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capture_amount: Option<Price>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refunded_amount: Option<Price>,
    #[serde(deserialize_with = "amazonpay_core::de::null_as_default")]
    pub converted_amount: String,
    #[serde(deserialize_with = "amazonpay_core::de::null_as_default")]
    pub conversion_rate: String,
    #[serde(deserialize_with = "amazonpay_core::de::null_as_default")]
    pub soft_descriptor: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merchant_metadata: Option<MerchantMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_metadata: Option<ProviderMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_details: Option<StatusDetails>,
    #[serde(deserialize_with = "amazonpay_core::de::null_as_default")]
    pub creation_timestamp: String,
    #[serde(deserialize_with = "amazonpay_core::de::null_as_default")]
    pub expiration_timestamp: String,
    #[serde(deserialize_with = "amazonpay_core::de::null_as_default")]
    pub release_environment: String,
}

impl HasErrorFields for Charge {
    fn error_fields(&self) -> &ErrorResponse {
        &self.error
    }
}

impl Charge {
    /// `statusDetails.state`, empty when absent
    pub fn state(&self) -> &str {
        self.status_details
            .as_ref()
            .map(|s| s.state.as_str())
            .unwrap_or_default()
    }
}

impl Client {
    /// `POST /v2/charges`. Sends the context's idempotency key, or a fresh one.
    #[instrument(skip(self, ctx, req))]
    pub async fn create_charge(
        &self,
        ctx: &RequestContext,
        req: &CreateChargeRequest,
    ) -> ApiResult<ApiResponse<Charge>> {
        let path = format!("{API_VERSION}/{COLLECTION}");
        let key = ctx.idempotency_key_or_generate();
        self.call_with_key(ctx, Method::POST, &path, Some(req), Some(key.as_str()))
            .await
    }

    /// `GET /v2/charges/{chargeId}`
    #[instrument(skip(self, ctx))]
    pub async fn get_charge(
        &self,
        ctx: &RequestContext,
        charge_id: &str,
    ) -> ApiResult<ApiResponse<Charge>> {
        let path = resource_path(COLLECTION, charge_id, None)?;
        self.call::<(), _>(ctx, Method::GET, &path, None).await
    }

    /// `POST /v2/charges/{chargeId}/capture`
    #[instrument(skip(self, ctx, req))]
    pub async fn capture_charge(
        &self,
        ctx: &RequestContext,
        charge_id: &str,
        req: &CaptureChargeRequest,
    ) -> ApiResult<ApiResponse<Charge>> {
        let path = resource_path(COLLECTION, charge_id, Some("capture"))?;
        let key = ctx.idempotency_key_or_generate();
        self.call_with_key(ctx, Method::POST, &path, Some(req), Some(key.as_str()))
            .await
    }

    /// `DELETE /v2/charges/{chargeId}/cancel`
    #[instrument(skip(self, ctx, req))]
    pub async fn cancel_charge(
        &self,
        ctx: &RequestContext,
        charge_id: &str,
        req: &CancelChargeRequest,
    ) -> ApiResult<ApiResponse<Charge>> {
        let path = resource_path(COLLECTION, charge_id, Some("cancel"))?;
        self.call(ctx, Method::DELETE, &path, Some(req)).await
    }
}
