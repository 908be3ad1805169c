//! # Charge Permissions
//!
//! A charge permission is the buyer's consent to be charged, created when
//! a checkout session completes. Recurring flows charge against it later.

use crate::request::resource_path;
use crate::transport::RequestContext;
use crate::Client;
use amazonpay_core::{
    Address, ApiResponse, ApiResult, Buyer, ErrorResponse, HasErrorFields, Limits,
    MerchantMetadata, PaymentPreference, RecurringMetadata, StatusDetails,
};
use http::Method;
use serde::{Deserialize, Serialize};
use tracing::instrument;

const COLLECTION: &str = "chargePermissions";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateChargePermissionRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant_metadata: Option<MerchantMetadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurring_metadata: Option<RecurringMetadata>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloseChargePermissionRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closure_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancel_pending_charges: Option<bool>,
}

/// Charge permission resource
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChargePermission {
    #[serde(flatten)]
    pub error: ErrorResponse,
    #[serde(deserialize_with = "amazonpay_core::de::null_as_default")]
    pub charge_permission_id: String,
    #[serde(deserialize_with = "amazonpay_core::de::null_as_default")]
    pub charge_permission_reference_id: String,
    #[serde(deserialize_with = "amazonpay_core::de::null_as_default")]
    pub charge_permission_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buyer: Option<Buyer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_address: Option<Address>,
    #[serde(deserialize_with = "amazonpay_core::de::null_as_default")]
    pub payment_preferences: Vec<PaymentPreference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_details: Option<StatusDetails>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limits: Option<Limits>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merchant_metadata: Option<MerchantMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurring_metadata: Option<RecurringMetadata>,
    #[serde(deserialize_with = "amazonpay_core::de::null_as_default")]
    pub platform_id: String,
    #[serde(deserialize_with = "amazonpay_core::de::null_as_default")]
    pub presentment_currency: String,
    #[serde(deserialize_with = "amazonpay_core::de::null_as_default")]
    pub creation_timestamp: String,
    #[serde(deserialize_with = "amazonpay_core::de::null_as_default")]
    pub expiration_timestamp: String,
    #[serde(deserialize_with = "amazonpay_core::de::null_as_default")]
    pub release_environment: String,
}

impl HasErrorFields for ChargePermission {
    fn error_fields(&self) -> &ErrorResponse {
        &self.error
    }
}

impl ChargePermission {
    /// `statusDetails.state` (`Chargeable`, `NonChargeable`, `Closed`), empty when absent
    pub fn state(&self) -> &str {
        self.status_details
            .as_ref()
            .map(|s| s.state.as_str())
            .unwrap_or_default()
    }

    pub fn is_chargeable(&self) -> bool {
        self.state() == "Chargeable"
    }
}

impl Client {
    /// `GET /v2/chargePermissions/{chargePermissionId}`
    #[instrument(skip(self, ctx))]
    pub async fn get_charge_permission(
        &self,
        ctx: &RequestContext,
        charge_permission_id: &str,
    ) -> ApiResult<ApiResponse<ChargePermission>> {
        let path = resource_path(COLLECTION, charge_permission_id, None)?;
        self.call::<(), _>(ctx, Method::GET, &path, None).await
    }

    /// `PATCH /v2/chargePermissions/{chargePermissionId}`
    #[instrument(skip(self, ctx, req))]
    pub async fn update_charge_permission(
        &self,
        ctx: &RequestContext,
        charge_permission_id: &str,
        req: &UpdateChargePermissionRequest,
    ) -> ApiResult<ApiResponse<ChargePermission>> {
        let path = resource_path(COLLECTION, charge_permission_id, None)?;
        self.call(ctx, Method::PATCH, &path, Some(req)).await
    }

    /// `DELETE /v2/chargePermissions/{chargePermissionId}/close`
    #[instrument(skip(self, ctx, req))]
    pub async fn close_charge_permission(
        &self,
        ctx: &RequestContext,
        charge_permission_id: &str,
        req: &CloseChargePermissionRequest,
    ) -> ApiResult<ApiResponse<ChargePermission>> {
        let path = resource_path(COLLECTION, charge_permission_id, Some("close"))?;
        self.call(ctx, Method::DELETE, &path, Some(req)).await
    }
}
