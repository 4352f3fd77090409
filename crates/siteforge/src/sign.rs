//! AWS Signature Version 4 request signing for S3-compatible storage.
//!
//! The storage client talks to DigitalOcean Spaces, which speaks the S3
//! protocol and accepts standard SigV4-signed requests. Only the subset the
//! publisher needs is implemented: header-based signing of HEAD/PUT requests
//! with a known payload hash.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "AWS4-HMAC-SHA256";
const SERVICE: &str = "s3";

/// A request about to be signed. `path` must start with `/`; `headers` are
/// the extra headers to include in the signature (lowercase names).
pub struct RequestToSign<'a> {
    pub method: &'a str,
    pub host: &'a str,
    pub path: &'a str,
    pub headers: Vec<(String, String)>,
    pub payload_hash: String,
}

/// Hex-encoded SHA-256 of a payload.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Percent-encode a key for use as a canonical URI, keeping `/` separators
/// and RFC 3986 unreserved characters.
pub fn uri_encode_path(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for byte in path.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' | b'/' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

/// Sign a request, returning the full header set to attach: the caller's
/// extra headers plus `x-amz-date`, `x-amz-content-sha256`, and
/// `authorization`. (`host` is set by the HTTP client itself.)
pub fn sign(
    req: &RequestToSign<'_>,
    access_key: &str,
    secret_key: &str,
    region: &str,
    now: DateTime<Utc>,
) -> Vec<(String, String)> {
    let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
    let date = now.format("%Y%m%d").to_string();

    let mut signed: Vec<(String, String)> = req
        .headers
        .iter()
        .map(|(k, v)| (k.to_lowercase(), v.trim().to_string()))
        .collect();
    signed.push(("host".to_string(), req.host.to_string()));
    signed.push(("x-amz-content-sha256".to_string(), req.payload_hash.clone()));
    signed.push(("x-amz-date".to_string(), amz_date.clone()));
    signed.sort_by(|a, b| a.0.cmp(&b.0));

    let canonical_headers: String = signed
        .iter()
        .map(|(k, v)| format!("{k}:{v}\n"))
        .collect();
    let signed_header_names = signed
        .iter()
        .map(|(k, _)| k.as_str())
        .collect::<Vec<_>>()
        .join(";");

    let canonical_request = format!(
        "{}\n{}\n{}\n{}\n{}\n{}",
        req.method,
        uri_encode_path(req.path),
        "", // no query string in any publisher request
        canonical_headers,
        signed_header_names,
        req.payload_hash
    );

    let scope = format!("{date}/{region}/{SERVICE}/aws4_request");
    let string_to_sign = format!(
        "{ALGORITHM}\n{amz_date}\n{scope}\n{}",
        sha256_hex(canonical_request.as_bytes())
    );

    let k_date = hmac_sha256(format!("AWS4{secret_key}").as_bytes(), date.as_bytes());
    let k_region = hmac_sha256(&k_date, region.as_bytes());
    let k_service = hmac_sha256(&k_region, SERVICE.as_bytes());
    let k_signing = hmac_sha256(&k_service, b"aws4_request");
    let signature = hex::encode(hmac_sha256(&k_signing, string_to_sign.as_bytes()));

    let authorization = format!(
        "{ALGORITHM} Credential={access_key}/{scope}, SignedHeaders={signed_header_names}, Signature={signature}"
    );

    let mut headers = req.headers.clone();
    headers.push(("x-amz-date".to_string(), amz_date));
    headers.push(("x-amz-content-sha256".to_string(), req.payload_hash.clone()));
    headers.push(("authorization".to_string(), authorization));
    headers
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts any key length");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn request() -> RequestToSign<'static> {
        RequestToSign {
            method: "PUT",
            host: "demo.nyc3.digitaloceanspaces.com",
            path: "/index.html",
            headers: vec![("content-type".to_string(), "text/html".to_string())],
            payload_hash: sha256_hex(b"<html></html>"),
        }
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 24, 12, 0, 0).unwrap()
    }

    #[test]
    fn signing_is_deterministic() {
        let a = sign(&request(), "AK", "SK", "nyc3", fixed_now());
        let b = sign(&request(), "AK", "SK", "nyc3", fixed_now());
        assert_eq!(a, b);
    }

    #[test]
    fn authorization_header_shape() {
        let headers = sign(&request(), "AKIDEXAMPLE", "secret", "nyc3", fixed_now());
        let auth = &headers
            .iter()
            .find(|(k, _)| k == "authorization")
            .unwrap()
            .1;
        assert!(auth.starts_with("AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20260824/nyc3/s3/aws4_request"));
        assert!(auth.contains("SignedHeaders=content-type;host;x-amz-content-sha256;x-amz-date"));
        let sig = auth.rsplit("Signature=").next().unwrap();
        assert_eq!(sig.len(), 64);
        assert!(sig.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn different_secrets_differ() {
        let a = sign(&request(), "AK", "one", "nyc3", fixed_now());
        let b = sign(&request(), "AK", "two", "nyc3", fixed_now());
        assert_ne!(a, b);
    }

    #[test]
    fn path_encoding_preserves_separators() {
        assert_eq!(uri_encode_path("/a/b.html"), "/a/b.html");
        assert_eq!(uri_encode_path("/a b"), "/a%20b");
        assert_eq!(uri_encode_path("/caf\u{e9}"), "/caf%C3%A9");
    }
}
