// Integration tests for the session token service
// Tests JWT token encoding, decoding, and caching

use base64::{Engine as _, engine::general_purpose::STANDARD};
use greenline_auth::service::token::{
    decode_session_token, decode_session_token_cached, encode_session_token, invalidate_token,
};

// Generate a valid base64 secret key for testing
fn test_secret_key() -> String {
    STANDARD.encode("test-secret-key-that-is-long-enough-for-hs256-algorithm")
}

#[test]
fn test_encode_decode_session_token() {
    let secret = test_secret_key();
    let username = "test_user";
    let expire_seconds = 3600;

    let token = encode_session_token(username, &secret, expire_seconds);
    assert!(token.is_ok());
    let token = token.unwrap();

    let decoded = decode_session_token(&token, &secret);
    assert!(decoded.is_ok());
    let decoded = decoded.unwrap();

    assert_eq!(decoded.claims.sub, username);
}

#[test]
fn test_token_expiration() {
    let secret = test_secret_key();
    let username = "test_user";

    // Create token that expired 120 seconds ago (2 minutes in the past)
    // This exceeds the default JWT validation leeway of 60 seconds
    let token = encode_session_token(username, &secret, -120).unwrap();

    let decoded = decode_session_token(&token, &secret);
    assert!(
        decoded.is_err(),
        "Token expired beyond leeway should fail validation"
    );
}

#[test]
fn test_invalid_secret_key() {
    let secret1 = test_secret_key();
    let secret2 = STANDARD.encode("different-secret-key-for-testing-purposes-here");
    let username = "test_user";

    let token = encode_session_token(username, &secret1, 3600).unwrap();

    let decoded = decode_session_token(&token, &secret2);
    assert!(decoded.is_err());
}

#[test]
fn test_cached_token_validation() {
    let secret = test_secret_key();
    let username = "cached_user";

    let token = encode_session_token(username, &secret, 3600).unwrap();

    // First call - cache miss, performs validation
    let result1 = decode_session_token_cached(&token, &secret);
    assert!(result1.is_ok());
    assert_eq!(result1.unwrap().claims.sub, username);

    // Second call - should hit cache
    let result2 = decode_session_token_cached(&token, &secret);
    assert!(result2.is_ok());
    assert_eq!(result2.unwrap().claims.sub, username);
}

#[test]
fn test_invalidate_token() {
    let secret = test_secret_key();
    let username = "invalidate_user";

    let token = encode_session_token(username, &secret, 3600).unwrap();

    let result = decode_session_token_cached(&token, &secret);
    assert!(result.is_ok());

    invalidate_token(&token);

    // Still decodes after invalidation, just without the cache
    let result = decode_session_token_cached(&token, &secret);
    assert!(result.is_ok());
    assert_eq!(result.unwrap().claims.sub, username);
}

#[test]
fn test_tampered_token_rejected() {
    let secret = test_secret_key();
    let token = encode_session_token("victim", &secret, 3600).unwrap();

    // Flip a character in the signature segment
    let mut tampered = token.clone();
    let last = tampered.pop().unwrap();
    tampered.push(if last == 'A' { 'B' } else { 'A' });

    assert!(decode_session_token(&tampered, &secret).is_err());
}
