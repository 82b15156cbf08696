//! Webhook signature verification.
//!
//! LINE signs every webhook body with HMAC-SHA256 keyed by the channel secret and
//! sends the base64-encoded digest in the `x-line-signature` header. Verification
//! happens before the body is parsed.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the body signature (lowercase, as delivered through HTTP/2 and API gateways).
pub const SIGNATURE_HEADER: &str = "x-line-signature";

/// Computes the raw HMAC-SHA256 digest of `body` keyed by `secret`.
pub fn compute_signature(body: &[u8], secret: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC can take key of any size");
    mac.update(body);
    mac.finalize().into_bytes().to_vec()
}

/// Returns the header value LINE would send for `body`: base64 of the digest.
pub fn sign_body(body: &[u8], secret: &[u8]) -> String {
    BASE64.encode(compute_signature(body, secret))
}

/// Verifies `signature` (the header value) against `body` and `secret`.
///
/// Malformed base64 returns `false`. The digest comparison is constant-time.
pub fn verify_signature(body: &[u8], secret: &[u8], signature: &str) -> bool {
    let expected = match BASE64.decode(signature.as_bytes()) {
        Ok(bytes) => bytes,
        Err(_) => return false,
    };
    let mut mac = match HmacSha256::new_from_slice(secret) {
        Ok(mac) => mac,
        Err(_) => return false,
    };
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}
