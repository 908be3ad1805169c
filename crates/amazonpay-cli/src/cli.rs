use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "amazonpay")]
#[command(about = "Sign and inspect Amazon Pay API v2 requests", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Per-call deadline in seconds
    #[arg(long, env = "AMAZON_PAY_TIMEOUT_SECS", default_value_t = 30, global = true)]
    pub timeout_secs: u64,

    /// Idempotency key for create/capture calls (generated when omitted)
    #[arg(long, global = true)]
    pub idempotency_key: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, env = "AMAZON_PAY_LOG_JSON", global = true)]
    pub log_json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sign a checkout button payload
    #[command(after_help = "\
Examples:
  amazonpay button-signature payload.json     # Sign the file's exact bytes
  echo '{\"storeId\":\"amzn1...\"}' | amazonpay button-signature -
  amazonpay button-signature --canonical payload.json")]
    ButtonSignature {
        /// Payload file, `-` for stdin
        #[arg(value_name = "FILE", default_value = "-")]
        payload: PathBuf,

        /// Re-serialize the payload as canonical JSON before signing
        #[arg(long)]
        canonical: bool,

        /// Print only the base64 signature
        #[arg(long)]
        signature_only: bool,
    },

    /// Build and sign a request without sending it
    SignRequest {
        #[arg(long, default_value = "GET")]
        method: String,

        /// Path relative to the API base URL (e.g. `v2/charges/S03-...`)
        #[arg(long)]
        path: String,

        /// JSON body file, `-` for stdin
        #[arg(long, value_name = "FILE")]
        body: Option<PathBuf>,
    },

    /// Charge operations
    Charge {
        #[command(subcommand)]
        command: ChargeCommands,
    },

    /// Checkout session operations
    CheckoutSession {
        #[command(subcommand)]
        command: CheckoutSessionCommands,
    },

    /// Charge permission operations
    ChargePermission {
        #[command(subcommand)]
        command: ChargePermissionCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum ChargeCommands {
    /// Fetch a charge
    Get { charge_id: String },

    /// Capture an authorized charge
    Capture {
        charge_id: String,
        #[arg(long)]
        amount: String,
        #[arg(long)]
        currency: String,
    },

    /// Cancel a charge
    Cancel {
        charge_id: String,
        #[arg(long)]
        reason: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum CheckoutSessionCommands {
    /// Fetch a checkout session
    Get { checkout_session_id: String },
}

#[derive(Subcommand, Debug)]
pub enum ChargePermissionCommands {
    /// Fetch a charge permission
    Get { charge_permission_id: String },

    /// Close a charge permission
    Close {
        charge_permission_id: String,
        #[arg(long)]
        reason: Option<String>,
        /// Also cancel charges still pending on the permission
        #[arg(long)]
        cancel_pending_charges: bool,
    },
}
