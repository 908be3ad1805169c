//! # amazonpay
//!
//! Operator CLI for the Amazon Pay API v2: sign checkout button payloads,
//! inspect signed requests and look up resources.
//!
//! ## Usage
//!
//! ```bash
//! # Credentials
//! export AMAZON_PAY_PUBLIC_KEY_ID=SANDBOX-AGENT123...
//! export AMAZON_PAY_PRIVATE_KEY_PATH=./private.pem
//! export AMAZON_PAY_REGION=jp
//!
//! amazonpay button-signature payload.json
//! amazonpay charge get S03-0000000-0000000-C000000
//! ```
//!
//! Responses print to stdout as JSON; logs go to stderr (`RUST_LOG`).

mod cli;

use amazonpay::{
    canonical, ApiResponse, CancelChargeRequest, CaptureChargeRequest, Client,
    CloseChargePermissionRequest, RequestContext,
};
use amazonpay_core::Price;
use anyhow::{bail, Context};
use clap::Parser;
use cli::{ChargeCommands, ChargePermissionCommands, CheckoutSessionCommands, Cli, Commands};
use http::Method;
use serde::Serialize;
use serde_json::{json, Value};
use std::io::Read;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // stdout carries the JSON output, so logs go to stderr
    tracing_subscriber::registry()
        .with(
            cli.log_json
                .then(|| fmt::layer().json().with_writer(std::io::stderr)),
        )
        .with((!cli.log_json).then(|| fmt::layer().with_writer(std::io::stderr)))
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let client = Client::from_env().context("failed to configure Amazon Pay client")?;

    let mut ctx = RequestContext::new().with_timeout(Duration::from_secs(cli.timeout_secs));
    if let Some(key) = &cli.idempotency_key {
        ctx = ctx.with_idempotency_key(key.as_str());
    }

    match cli.command {
        Commands::ButtonSignature {
            payload,
            canonical,
            signature_only,
        } => button_signature(&client, &payload, canonical, signature_only),
        Commands::SignRequest { method, path, body } => {
            sign_request(&client, &method, &path, body.as_deref(), cli.idempotency_key.as_deref())
        }
        Commands::Charge { command } => match command {
            ChargeCommands::Get { charge_id } => {
                print_response(&client.get_charge(&ctx, &charge_id).await?)
            }
            ChargeCommands::Capture {
                charge_id,
                amount,
                currency,
            } => {
                let req = CaptureChargeRequest {
                    capture_amount: Some(Price::new(amount, currency)),
                    ..Default::default()
                };
                print_response(&client.capture_charge(&ctx, &charge_id, &req).await?)
            }
            ChargeCommands::Cancel { charge_id, reason } => {
                let req = CancelChargeRequest {
                    cancellation_reason: reason,
                };
                print_response(&client.cancel_charge(&ctx, &charge_id, &req).await?)
            }
        },
        Commands::CheckoutSession { command } => match command {
            CheckoutSessionCommands::Get {
                checkout_session_id,
            } => print_response(
                &client
                    .get_checkout_session(&ctx, &checkout_session_id)
                    .await?,
            ),
        },
        Commands::ChargePermission { command } => match command {
            ChargePermissionCommands::Get {
                charge_permission_id,
            } => print_response(
                &client
                    .get_charge_permission(&ctx, &charge_permission_id)
                    .await?,
            ),
            ChargePermissionCommands::Close {
                charge_permission_id,
                reason,
                cancel_pending_charges,
            } => {
                let req = CloseChargePermissionRequest {
                    closure_reason: reason,
                    cancel_pending_charges: Some(cancel_pending_charges),
                };
                print_response(
                    &client
                        .close_charge_permission(&ctx, &charge_permission_id, &req)
                        .await?,
                )
            }
        },
    }
}

fn button_signature(
    client: &Client,
    payload: &Path,
    canonical: bool,
    signature_only: bool,
) -> anyhow::Result<()> {
    let bytes = read_input(payload)?;
    let payload = if canonical {
        let value: Value = serde_json::from_slice(&bytes).context("payload is not valid JSON")?;
        canonical::to_canonical_string(&value)?
    } else {
        String::from_utf8(bytes).context("payload is not UTF-8")?
    };

    let signature = client.generate_button_signature(&payload)?;
    if signature_only {
        println!("{signature}");
        return Ok(());
    }

    let out = json!({
        "payloadJSON": payload,
        "signature": signature,
        "publicKeyId": client.public_key_id(),
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

fn sign_request(
    client: &Client,
    method: &str,
    path: &str,
    body: Option<&Path>,
    idempotency_key: Option<&str>,
) -> anyhow::Result<()> {
    let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes())
        .with_context(|| format!("invalid HTTP method {method:?}"))?;
    let body: Option<Value> = match body {
        Some(path) => Some(
            serde_json::from_slice(&read_input(path)?).context("request body is not valid JSON")?,
        ),
        None => None,
    };

    let request = client.build_request(method, path, body.as_ref(), idempotency_key)?;
    debug!(signed_headers = request.signed_headers(), "Signed request");

    let headers: serde_json::Map<String, Value> = request
        .headers()
        .iter()
        .map(|(name, value)| {
            (
                name.to_string(),
                Value::String(String::from_utf8_lossy(value.as_bytes()).into_owned()),
            )
        })
        .collect();
    let out = json!({
        "method": request.method().as_str(),
        "url": request.url().as_str(),
        "headers": headers,
        "body": request.body().map(|b| String::from_utf8_lossy(b).into_owned()),
        "canonicalRequest": request.canonical_request(),
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

fn print_response<T: Serialize>(resp: &ApiResponse<T>) -> anyhow::Result<()> {
    let out = json!({
        "status": resp.status().as_u16(),
        "requestId": resp.raw.request_id(),
        "body": serde_json::to_value(&resp.data)?,
    });
    println!("{}", serde_json::to_string_pretty(&out)?);

    if resp.has_error() {
        bail!("Amazon Pay returned HTTP {}", resp.status());
    }
    Ok(())
}

fn read_input(path: &Path) -> anyhow::Result<Vec<u8>> {
    if path == Path::new("-") {
        let mut buf = Vec::new();
        std::io::stdin()
            .read_to_end(&mut buf)
            .context("failed to read stdin")?;
        Ok(buf)
    } else {
        std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))
    }
}
