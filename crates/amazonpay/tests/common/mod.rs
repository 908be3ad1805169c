//! Shared fixtures for the integration tests: a client pointed at a mock
//! server, and a server-side check of the request signature.

#![allow(dead_code)]

use amazonpay::{Client, ClientConfig, Environment, Region};
use base64::{engine::general_purpose::STANDARD, Engine};
use rsa::pkcs8::DecodePublicKey;
use rsa::pss::{Signature, VerifyingKey};
use rsa::signature::Verifier;
use rsa::RsaPublicKey;
use sha2::{Digest, Sha256};
use wiremock::Request;

pub const PRIVATE_KEY: &[u8] = include_bytes!("../fixtures/private_key.pem");
pub const PUBLIC_KEY: &str = include_str!("../fixtures/public_key.pem");
pub const PUBLIC_KEY_ID: &str = "AGENT123TESTKEY";

pub fn config_for(base_url: &str) -> ClientConfig {
    ClientConfig::new(PUBLIC_KEY_ID, PRIVATE_KEY.to_vec(), Region::Jp, Environment::Sandbox)
        .with_api_base_url(base_url)
}

pub fn client_for(base_url: &str) -> Client {
    Client::new(config_for(base_url)).unwrap()
}

pub fn verifying_key() -> VerifyingKey<Sha256> {
    let public = RsaPublicKey::from_public_key_pem(PUBLIC_KEY).unwrap();
    VerifyingKey::new_with_salt_len(public, 20)
}

pub fn string_to_sign(data: &[u8]) -> String {
    format!("AMZN-PAY-RSASSA-PSS\n{}", hex::encode(Sha256::digest(data)))
}

/// Verify a base64 signature against the fixture public key
pub fn verify(message: &[u8], signature: &str) -> bool {
    let Ok(raw) = STANDARD.decode(signature) else {
        return false;
    };
    let Ok(signature) = Signature::try_from(raw.as_slice()) else {
        return false;
    };
    verifying_key().verify(message, &signature).is_ok()
}

pub struct Authorization {
    pub public_key_id: String,
    pub signed_headers: String,
    pub signature: String,
}

pub fn parse_authorization(value: &str) -> Authorization {
    let rest = value
        .strip_prefix("AMZN-PAY-RSASSA-PSS ")
        .expect("authorization scheme");
    let mut auth = Authorization {
        public_key_id: String::new(),
        signed_headers: String::new(),
        signature: String::new(),
    };
    for part in rest.split(", ") {
        let (key, value) = part.split_once('=').expect("key=value");
        match key {
            "PublicKeyId" => auth.public_key_id = value.to_string(),
            "SignedHeaders" => auth.signed_headers = value.to_string(),
            "Signature" => auth.signature = value.to_string(),
            other => panic!("unexpected authorization field {other}"),
        }
    }
    auth
}

pub fn header<'a>(request: &'a Request, name: &str) -> &'a str {
    request
        .headers
        .get(name)
        .unwrap_or_else(|| panic!("missing header {name}"))
        .to_str()
        .unwrap()
}

/// Rebuild the canonical request from what actually arrived on the wire
pub fn canonical_request(request: &Request, signed_headers: &str) -> String {
    let mut out = format!(
        "{}\n{}\n{}\n",
        request.method,
        request.url.path(),
        request.url.query().unwrap_or_default()
    );
    for name in signed_headers.split(';') {
        out.push_str(&format!("{name}:{}\n", header(request, name)));
    }
    out.push('\n');
    out.push_str(signed_headers);
    out.push('\n');
    out.push_str(&hex::encode(Sha256::digest(&request.body)));
    out
}

/// What the API does on receipt: recompute and verify
pub fn verify_request(request: &Request) -> bool {
    let auth = parse_authorization(header(request, "authorization"));
    let canonical = canonical_request(request, &auth.signed_headers);
    verify(string_to_sign(canonical.as_bytes()).as_bytes(), &auth.signature)
}
