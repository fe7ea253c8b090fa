//! Webhook signature verification
//!
//! Webhook endpoints authenticate by HMAC-SHA256 over the raw request
//! body instead of session tokens. Comparison goes through the MAC
//! verifier, which is constant-time.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Hex-encoded HMAC-SHA256 of a payload
pub fn hmac_sha256_hex(secret: &str, payload: &str) -> String {
    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(e) => {
            tracing::error!("Failed to create HMAC: {}", e);
            return String::new();
        }
    };
    mac.update(payload.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

fn verify_hex(secret: &str, payload: &str, signature_hex: &str) -> bool {
    let Ok(expected) = hex::decode(signature_hex) else {
        return false;
    };

    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(payload.as_bytes());
    mac.verify_slice(&expected).is_ok()
}

/// Verify a Retell webhook delivery
///
/// Retell signs the raw JSON body and sends the hex digest in the
/// `X-Retell-Signature` header.
pub fn verify_retell_signature(body: &str, signature: &str, secret: &str) -> bool {
    if signature.is_empty() || secret.is_empty() {
        return false;
    }
    verify_hex(secret, body, signature)
}

/// Verify a Stripe webhook delivery (v1 scheme)
///
/// The `Stripe-Signature` header carries `t=<unix>,v1=<hex>[,...]`; the
/// signed payload is `<t>.<body>`. Deliveries older than
/// `tolerance_secs` are rejected to stop replays.
pub fn verify_stripe_signature(
    header: &str,
    body: &str,
    secret: &str,
    tolerance_secs: i64,
    now_unix: i64,
) -> bool {
    if secret.is_empty() {
        return false;
    }

    let mut timestamp: Option<i64> = None;
    let mut candidates: Vec<&str> = Vec::new();

    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => timestamp = value.parse().ok(),
            Some(("v1", value)) => candidates.push(value),
            _ => {}
        }
    }

    let Some(ts) = timestamp else {
        return false;
    };
    if candidates.is_empty() {
        return false;
    }

    if (now_unix - ts).abs() > tolerance_secs {
        tracing::warn!("Stripe signature timestamp out of tolerance");
        return false;
    }

    let signed_payload = format!("{}.{}", ts, body);
    candidates
        .iter()
        .any(|candidate| verify_hex(secret, &signed_payload, candidate))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test_secret";

    #[test]
    fn test_retell_signature_roundtrip() {
        let body = r#"{"event":"call_ended","call":{"call_id":"c1"}}"#;
        let signature = hmac_sha256_hex(SECRET, body);

        assert!(verify_retell_signature(body, &signature, SECRET));
        assert!(!verify_retell_signature(body, &signature, "other_secret"));
        assert!(!verify_retell_signature("tampered", &signature, SECRET));
        assert!(!verify_retell_signature(body, "", SECRET));
        assert!(!verify_retell_signature(body, "zz-not-hex", SECRET));
    }

    #[test]
    fn test_stripe_signature_accepts_valid() {
        let body = r#"{"type":"customer.subscription.updated"}"#;
        let now = 1_700_000_000;
        let signed_payload = format!("{}.{}", now, body);
        let digest = hmac_sha256_hex(SECRET, &signed_payload);
        let header = format!("t={},v1={}", now, digest);

        assert!(verify_stripe_signature(&header, body, SECRET, 300, now));
        assert!(verify_stripe_signature(&header, body, SECRET, 300, now + 200));
    }

    #[test]
    fn test_stripe_signature_rejects_stale() {
        let body = "{}";
        let ts = 1_700_000_000;
        let digest = hmac_sha256_hex(SECRET, &format!("{}.{}", ts, body));
        let header = format!("t={},v1={}", ts, digest);

        assert!(!verify_stripe_signature(&header, body, SECRET, 300, ts + 301));
    }

    #[test]
    fn test_stripe_signature_rejects_malformed_header() {
        assert!(!verify_stripe_signature("", "{}", SECRET, 300, 0));
        assert!(!verify_stripe_signature("t=abc,v1=00", "{}", SECRET, 300, 0));
        assert!(!verify_stripe_signature("v1=00", "{}", SECRET, 300, 0));
        assert!(!verify_stripe_signature("t=100", "{}", SECRET, 300, 100));
    }

    #[test]
    fn test_stripe_signature_multiple_candidates() {
        let body = "{}";
        let ts = 42;
        let digest = hmac_sha256_hex(SECRET, &format!("{}.{}", ts, body));
        let header = format!("t={},v1=deadbeef,v1={}", ts, digest);

        assert!(verify_stripe_signature(&header, body, SECRET, 300, ts));
    }
}
