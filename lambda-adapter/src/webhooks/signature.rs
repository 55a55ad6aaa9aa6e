//! GitHub webhook signature helpers.
//!
//! GitHub signs every delivery with HMAC-SHA256 over the raw request body and
//! sends the digest in the `X-Hub-Signature-256` header as `sha256=<hex>`.
//! Reference: https://docs.github.com/en/webhooks/using-webhooks/validating-webhook-deliveries

use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::warn;

type HmacSha256 = Hmac<Sha256>;

/// Algorithm prefix GitHub puts in front of the hex digest.
pub const SIGNATURE_PREFIX: &str = "sha256=";

/// Sign a payload, returning the header value GitHub would send for it.
pub fn sign(secret: &str, payload: &str) -> String {
    // HMAC accepts keys of any length, including empty ones.
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .unwrap_or_else(|_| unreachable!("hmac accepts keys of any length"));
    mac.update(payload.as_bytes());

    format!("{}{}", SIGNATURE_PREFIX, hex::encode(mac.finalize().into_bytes()))
}

/// Verify a `X-Hub-Signature-256` header value against a payload.
///
/// # Arguments
///
/// * `secret` - The webhook secret configured on the GitHub App or repository
/// * `payload` - The raw request body, exactly as received
/// * `signature` - The header value, including the `sha256=` prefix
///
/// # Returns
///
/// `true` if the signature matches, `false` otherwise.
pub fn verify(secret: &str, payload: &str, signature: &str) -> bool {
    if secret.is_empty() || signature.is_empty() {
        warn!(
            has_secret = !secret.is_empty(),
            has_signature = !signature.is_empty(),
            "webhook_signature_missing_fields"
        );
        return false;
    }

    if !signature.starts_with(SIGNATURE_PREFIX) {
        warn!(signature_length = signature.len(), "webhook_signature_unknown_algorithm");
        return false;
    }

    let expected = sign(secret, payload);
    let valid = constant_time_compare(&expected, signature);

    if !valid {
        warn!(
            expected_length = expected.len(),
            actual_length = signature.len(),
            "webhook_signature_mismatch"
        );
    }

    valid
}

/// Constant-time string comparison to prevent timing attacks.
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}
