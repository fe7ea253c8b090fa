//! JWT session token service

use std::sync::LazyLock;
use std::time::Duration;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use moka::sync::Cache;

use crate::model::SessionJwtPayload;

/// Cached token data containing the full payload
#[derive(Clone)]
struct CachedTokenData {
    claims: SessionJwtPayload,
}

/// JWT token cache to avoid repeated validation of the same token
static TOKEN_CACHE: LazyLock<Cache<String, CachedTokenData>> = LazyLock::new(|| {
    Cache::builder()
        .max_capacity(10_000)
        .time_to_live(Duration::from_secs(300)) // 5 minutes TTL
        .build()
});

/// Decode and validate a session token with caching
pub fn decode_session_token_cached(
    token: &str,
    secret_key: &str,
) -> jsonwebtoken::errors::Result<jsonwebtoken::TokenData<SessionJwtPayload>> {
    if let Some(cached) = TOKEN_CACHE.get(token) {
        let now = chrono::Utc::now().timestamp();
        if cached.claims.exp > now {
            return Ok(jsonwebtoken::TokenData {
                header: jsonwebtoken::Header::default(),
                claims: cached.claims,
            });
        }
        // Token expired in cache, invalidate it
        TOKEN_CACHE.invalidate(token);
    }

    let result = decode_session_token(token, secret_key)?;

    TOKEN_CACHE.insert(
        token.to_string(),
        CachedTokenData {
            claims: result.claims.clone(),
        },
    );

    Ok(result)
}

/// Decode and validate a session token without caching
pub fn decode_session_token(
    token: &str,
    secret_key: &str,
) -> jsonwebtoken::errors::Result<jsonwebtoken::TokenData<SessionJwtPayload>> {
    let decoding_key = DecodingKey::from_base64_secret(secret_key)?;
    decode::<SessionJwtPayload>(token, &decoding_key, &Validation::default())
}

/// Invalidate a token from the cache
pub fn invalidate_token(token: &str) {
    TOKEN_CACHE.invalidate(token);
}

/// Clear the entire token cache
#[allow(dead_code)]
pub fn clear_token_cache() {
    TOKEN_CACHE.invalidate_all();
}

/// Encode a session token
pub fn encode_session_token(
    sub: &str,
    secret_key: &str,
    expire_seconds: i64,
) -> jsonwebtoken::errors::Result<String> {
    let exp = chrono::Utc::now()
        .checked_add_signed(chrono::Duration::seconds(expire_seconds))
        .unwrap_or_else(chrono::Utc::now)
        .timestamp();

    let payload = SessionJwtPayload {
        sub: sub.to_string(),
        exp,
    };

    let header = Header {
        typ: None,
        alg: Algorithm::HS256,
        ..Default::default()
    };

    let encoding_key = EncodingKey::from_base64_secret(secret_key)?;
    encode(&header, &payload, &encoding_key)
}
