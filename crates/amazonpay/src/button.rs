//! # Checkout Button Signatures
//!
//! The Amazon Pay button is rendered client-side with a JSON payload and a
//! signature over it. The payload is signed once on the server and embedded
//! in markup; no HTTP request is made.

use crate::checkout_session::CreateCheckoutSessionRequest;
use crate::signer::{self, Signer};
use crate::Client;
use amazonpay_core::ApiResult;
use serde::Serialize;
use tracing::debug;

/// Everything the front-end button needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ButtonSignature {
    /// JSON payload, exactly as signed
    pub payload: String,
    /// Base64 signature of the payload
    pub signature: String,
    pub public_key_id: String,
}

/// Sign a pre-serialized payload: `AMZN-PAY-RSASSA-PSS \n hex(sha256(payload))`
pub fn sign_payload(signer: &Signer, payload: &[u8]) -> ApiResult<String> {
    signer.sign_base64(signer::string_to_sign(payload).as_bytes())
}

impl Client {
    /// Sign a payload the caller already serialized. The same bytes must be
    /// embedded in the page unchanged.
    pub fn generate_button_signature(&self, payload: impl AsRef<[u8]>) -> ApiResult<String> {
        let payload = payload.as_ref();
        debug!(payload_len = payload.len(), "Signing button payload");
        sign_payload(self.signer(), payload)
    }

    /// Serialize a checkout session request canonically and sign it
    pub fn sign_checkout_button(
        &self,
        request: &CreateCheckoutSessionRequest,
    ) -> ApiResult<ButtonSignature> {
        let payload = request.to_payload()?;
        let signature = self.generate_button_signature(&payload)?;
        Ok(ButtonSignature {
            payload,
            signature,
            public_key_id: self.public_key_id().to_string(),
        })
    }
}
