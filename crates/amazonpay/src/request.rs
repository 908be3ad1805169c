//! # Signed Request Builder
//!
//! Turns `(method, path, body)` into a fully addressed request carrying
//! the Amazon Pay authentication headers.
//!
//! ```text
//! canonical request = METHOD \n
//!                     canonical URI \n
//!                     canonical query \n
//!                     name:value \n   (one line per signed header, sorted)
//!                     \n
//!                     signed header names joined by ';' \n
//!                     hex(sha256(body))
//!
//! string to sign    = AMZN-PAY-RSASSA-PSS \n hex(sha256(canonical request))
//!
//! authorization     = AMZN-PAY-RSASSA-PSS PublicKeyId=<id>, SignedHeaders=<names>, Signature=<base64>
//! ```
//!
//! A request is signed once, at build time, over the exact bytes that are
//! later sent. Retrying means building again (new timestamp, new signature).

use crate::canonical;
use crate::config::API_VERSION;
use crate::signer::{self, Signer, ALGORITHM};
use amazonpay_core::{AmazonPayError, ApiResult, Region};
use chrono::{DateTime, Utc};
use http::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, USER_AGENT};
use http::Method;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;
use url::Url;

pub const HEADER_DATE: &str = "x-amz-pay-date";
pub const HEADER_HOST: &str = "x-amz-pay-host";
pub const HEADER_REGION: &str = "x-amz-pay-region";
pub const HEADER_IDEMPOTENCY_KEY: &str = "x-amz-pay-idempotency-key";

const JSON: &str = "application/json";

/// `x-amz-pay-date` format
pub const TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// RFC 3986 unreserved characters pass through, everything else is escaped
const RFC3986: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// A request with its signature attached. Built fresh for every call.
#[derive(Debug, Clone)]
pub struct SignedRequest {
    method: Method,
    url: Url,
    headers: HeaderMap,
    body: Option<Vec<u8>>,
    timestamp: DateTime<Utc>,
    signed_headers: String,
    signature: String,
    canonical_request: String,
}

impl SignedRequest {
    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn path(&self) -> &str {
        self.url.path()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Canonical body bytes, `None` when the request has no body
    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// `;`-joined list of signed header names
    pub fn signed_headers(&self) -> &str {
        &self.signed_headers
    }

    /// Base64 signature
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// The canonical request the signature covers (for diagnosing
    /// `InvalidRequestSignature` responses; contains no secrets)
    pub fn canonical_request(&self) -> &str {
        &self.canonical_request
    }

    pub fn into_reqwest(self) -> reqwest::Request {
        let mut request = reqwest::Request::new(self.method, self.url);
        *request.headers_mut() = self.headers;
        if let Some(body) = self.body {
            *request.body_mut() = Some(body.into());
        }
        request
    }
}

/// Borrowed view of the client state needed to sign a request.
///
/// Holds no mutable state; concurrent `build` calls never interact.
#[derive(Debug, Clone, Copy)]
pub struct RequestBuilder<'a> {
    signer: &'a Signer,
    public_key_id: &'a str,
    base_url: &'a Url,
    region: Region,
}

impl<'a> RequestBuilder<'a> {
    pub fn new(signer: &'a Signer, public_key_id: &'a str, base_url: &'a Url, region: Region) -> Self {
        Self {
            signer,
            public_key_id,
            base_url,
            region,
        }
    }

    /// Build and sign a request timestamped now
    pub fn build<T: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&T>,
        idempotency_key: Option<&str>,
    ) -> ApiResult<SignedRequest> {
        self.build_at(method, path, body, idempotency_key, Utc::now())
    }

    /// Build and sign a request with an explicit timestamp
    pub fn build_at<T: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&T>,
        idempotency_key: Option<&str>,
        timestamp: DateTime<Utc>,
    ) -> ApiResult<SignedRequest> {
        let url = self.resolve(path)?;
        let host = host_header(&url)?;

        let body = match body {
            Some(body) => Some(canonical::to_canonical_vec(body)?),
            None => None,
        };
        let payload: &[u8] = body.as_deref().unwrap_or_default();

        // BTreeMap keeps signed headers sorted by name
        let mut signed: BTreeMap<&'static str, String> = BTreeMap::new();
        signed.insert("accept", JSON.to_string());
        if body.is_some() {
            signed.insert("content-type", JSON.to_string());
        }
        signed.insert(HEADER_DATE, timestamp.format(TIMESTAMP_FORMAT).to_string());
        signed.insert(HEADER_HOST, host);
        signed.insert(HEADER_REGION, self.region.as_str().to_string());
        if let Some(key) = idempotency_key.map(str::trim).filter(|k| !k.is_empty()) {
            signed.insert(HEADER_IDEMPOTENCY_KEY, key.to_string());
        }

        let signed_headers = signed.keys().copied().collect::<Vec<_>>().join(";");
        let canonical_request = canonical_request(&method, &url, &signed, &signed_headers, payload);
        let signature = self
            .signer
            .sign_base64(signer::string_to_sign(canonical_request.as_bytes()).as_bytes())?;

        let mut headers = HeaderMap::with_capacity(signed.len() + 2);
        for (name, value) in &signed {
            headers.insert(HeaderName::from_static(*name), header_value(name, value)?);
        }
        let authorization = format!(
            "{} PublicKeyId={}, SignedHeaders={}, Signature={}",
            ALGORITHM, self.public_key_id, signed_headers, signature
        );
        headers.insert(AUTHORIZATION, header_value("authorization", &authorization)?);
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("amazonpay-rs/", env!("CARGO_PKG_VERSION"))),
        );

        debug!(
            method = %method,
            path = url.path(),
            signed_headers = %signed_headers,
            body_len = payload.len(),
            "Built signed request"
        );

        Ok(SignedRequest {
            method,
            url,
            headers,
            body,
            timestamp,
            signed_headers,
            signature,
            canonical_request,
        })
    }

    fn resolve(&self, path: &str) -> ApiResult<Url> {
        let relative = path.trim_start_matches('/');
        if relative.is_empty() {
            return Err(AmazonPayError::InvalidRequest("empty request path".to_string()));
        }
        self.base_url
            .join(relative)
            .map_err(|e| AmazonPayError::InvalidRequest(format!("invalid path {path:?}: {e}")))
    }
}

/// Assemble the canonical request string
fn canonical_request(
    method: &Method,
    url: &Url,
    signed: &BTreeMap<&'static str, String>,
    signed_headers: &str,
    payload: &[u8],
) -> String {
    let mut out = String::with_capacity(256);
    out.push_str(method.as_str());
    out.push('\n');
    out.push_str(url.path());
    out.push('\n');
    out.push_str(&canonical_query(url));
    out.push('\n');
    for (name, value) in signed {
        out.push_str(name);
        out.push(':');
        out.push_str(value);
        out.push('\n');
    }
    out.push('\n');
    out.push_str(signed_headers);
    out.push('\n');
    out.push_str(&signer::hex_sha256(payload));
    out
}

/// Query pairs sorted by key then value, RFC 3986 encoded.
///
/// Works on the raw query so `+` stays a literal plus (`%2B`) as sent.
fn canonical_query(url: &Url) -> String {
    let encode = |s: &str| {
        let decoded = percent_decode_str(s).decode_utf8_lossy();
        utf8_percent_encode(&decoded, RFC3986).to_string()
    };
    let mut pairs: Vec<(String, String)> = url
        .query()
        .unwrap_or_default()
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
            (encode(k), encode(v))
        })
        .collect();
    pairs.sort();
    pairs
        .into_iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

fn host_header(url: &Url) -> ApiResult<String> {
    let host = url
        .host_str()
        .ok_or_else(|| AmazonPayError::Configuration("API base URL has no host".to_string()))?;
    Ok(match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    })
}

fn header_value(name: &str, value: &str) -> ApiResult<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|_| AmazonPayError::InvalidRequest(format!("invalid value for header {name}")))
}

/// Percent-encode one path segment (resource ids)
pub fn encode_path_segment(segment: &str) -> String {
    utf8_percent_encode(segment, RFC3986).to_string()
}

/// `v2/{collection}/{id}[/{action}]` with the id encoded as a single segment
pub(crate) fn resource_path(collection: &str, id: &str, action: Option<&str>) -> ApiResult<String> {
    let id = id.trim();
    if id.is_empty() || id == "." || id == ".." {
        return Err(AmazonPayError::InvalidRequest(format!(
            "invalid {collection} id: {id:?}"
        )));
    }
    let mut path = format!("{}/{}/{}", API_VERSION, collection, encode_path_segment(id));
    if let Some(action) = action {
        path.push('/');
        path.push_str(action);
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use http::header::CONTENT_TYPE;
    use serde_json::json;

    const PKCS8: &[u8] = include_bytes!("../tests/fixtures/private_key.pem");

    fn fixture() -> (Signer, Url) {
        (
            Signer::from_pem(PKCS8).unwrap(),
            Url::parse("https://pay-api.amazon.jp/sandbox/").unwrap(),
        )
    }

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 45).unwrap()
    }

    #[test]
    fn test_get_without_body() {
        let (signer, base) = fixture();
        let builder = RequestBuilder::new(&signer, "AGENT123", &base, Region::Jp);
        let req = builder
            .build_at::<()>(Method::GET, "/v2/charges/S03-1", None, None, at())
            .unwrap();

        assert!(req.body().is_none());
        assert_eq!(req.url().as_str(), "https://pay-api.amazon.jp/sandbox/v2/charges/S03-1");
        assert!(req.headers().get(CONTENT_TYPE).is_none());
        assert_eq!(req.headers()[HEADER_DATE], "20240301T123045Z");
        assert_eq!(req.headers()[HEADER_HOST], "pay-api.amazon.jp");
        assert_eq!(req.headers()[HEADER_REGION], "jp");
        assert_eq!(
            req.signed_headers(),
            "accept;x-amz-pay-date;x-amz-pay-host;x-amz-pay-region"
        );
        assert!(!req.signature().is_empty());
    }

    #[test]
    fn test_canonical_request_layout() {
        let (signer, base) = fixture();
        let builder = RequestBuilder::new(&signer, "AGENT123", &base, Region::Jp);
        let req = builder
            .build_at(
                Method::POST,
                "v2/charges",
                Some(&json!({"captureNow": true})),
                Some("idem-1"),
                at(),
            )
            .unwrap();

        let expected = format!(
            "POST\n/sandbox/v2/charges\n\naccept:application/json\ncontent-type:application/json\n\
             x-amz-pay-date:20240301T123045Z\nx-amz-pay-host:pay-api.amazon.jp\n\
             x-amz-pay-idempotency-key:idem-1\nx-amz-pay-region:jp\n\n\
             accept;content-type;x-amz-pay-date;x-amz-pay-host;x-amz-pay-idempotency-key;x-amz-pay-region\n{}",
            signer::hex_sha256(br#"{"captureNow":true}"#)
        );
        assert_eq!(req.canonical_request(), expected);
        assert_eq!(req.body().unwrap(), br#"{"captureNow":true}"#);
    }

    #[test]
    fn test_authorization_header() {
        let (signer, base) = fixture();
        let builder = RequestBuilder::new(&signer, "AGENT123", &base, Region::Jp);
        let req = builder
            .build_at::<()>(Method::DELETE, "v2/charges/S03-1/cancel", None, None, at())
            .unwrap();

        let auth = req.headers()[AUTHORIZATION].to_str().unwrap();
        assert_eq!(
            auth,
            format!(
                "AMZN-PAY-RSASSA-PSS PublicKeyId=AGENT123, SignedHeaders={}, Signature={}",
                req.signed_headers(),
                req.signature()
            )
        );
    }

    #[test]
    fn test_query_is_sorted_and_encoded() {
        let url = Url::parse("https://h/p?b=2&a=x y&a=1").unwrap();
        assert_eq!(canonical_query(&url), "a=1&a=x%20y&b=2");
        let url = Url::parse("https://h/p").unwrap();
        assert_eq!(canonical_query(&url), "");
    }

    #[test]
    fn test_query_plus_is_literal() {
        let url = Url::parse("https://h/p?a=b+c&flag&d=%7e&&e=x%2By").unwrap();
        assert_eq!(canonical_query(&url), "a=b%2Bc&d=~&e=x%2By&flag=");

        let (signer, base) = fixture();
        let builder = RequestBuilder::new(&signer, "AGENT123", &base, Region::Jp);
        let req = builder
            .build_at::<()>(Method::GET, "v2/x?a=b+c", None, None, at())
            .unwrap();
        assert_eq!(req.url().query(), Some("a=b+c"));
        assert!(req
            .canonical_request()
            .starts_with("GET\n/sandbox/v2/x\na=b%2Bc\n"));
    }

    #[test]
    fn test_blank_idempotency_key_is_not_sent() {
        let (signer, base) = fixture();
        let builder = RequestBuilder::new(&signer, "AGENT123", &base, Region::Jp);
        let req = builder
            .build_at(Method::POST, "v2/charges", Some(&json!({})), Some("   "), at())
            .unwrap();

        assert!(req.headers().get(HEADER_IDEMPOTENCY_KEY).is_none());
        assert_eq!(
            req.signed_headers(),
            "accept;content-type;x-amz-pay-date;x-amz-pay-host;x-amz-pay-region"
        );
        assert!(!req.canonical_request().contains("idempotency"));
    }

    #[test]
    fn test_host_header_keeps_port() {
        let url = Url::parse("http://127.0.0.1:4010/").unwrap();
        assert_eq!(host_header(&url).unwrap(), "127.0.0.1:4010");
    }

    #[test]
    fn test_empty_path_rejected() {
        let (signer, base) = fixture();
        let builder = RequestBuilder::new(&signer, "AGENT123", &base, Region::Jp);
        let err = builder.build::<()>(Method::GET, "/", None, None).unwrap_err();
        assert!(matches!(err, AmazonPayError::InvalidRequest(_)));
    }

    #[test]
    fn test_bad_public_key_id_fails_without_panicking() {
        let (signer, base) = fixture();
        let builder = RequestBuilder::new(&signer, "AGENT\n123", &base, Region::Jp);
        let err = builder
            .build::<()>(Method::GET, "v2/charges/x", None, None)
            .unwrap_err();
        assert!(matches!(err, AmazonPayError::InvalidRequest(_)));
    }

    #[test]
    fn test_path_segment_encoding() {
        assert_eq!(encode_path_segment("S03-1"), "S03-1");
        assert_eq!(encode_path_segment("../x"), "..%2Fx");
        assert_eq!(encode_path_segment("a b"), "a%20b");
    }

    #[test]
    fn test_resource_path() {
        assert_eq!(
            resource_path("charges", "S03-1", Some("capture")).unwrap(),
            "v2/charges/S03-1/capture"
        );
        assert_eq!(
            resource_path("checkoutSessions", "a/b", None).unwrap(),
            "v2/checkoutSessions/a%2Fb"
        );
        assert!(resource_path("charges", "", None).is_err());
        assert!(resource_path("charges", "..", None).is_err());
    }
}
