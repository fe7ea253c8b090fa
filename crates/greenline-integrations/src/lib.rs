//! GreenLine Integrations - Third-party service clients
//!
//! One typed reqwest client per vendor:
//! - `llm`: OpenRouter chat completions
//! - `sms`: Twilio messages
//! - `email`: SendGrid v3 send
//! - `weather`: OpenWeather current conditions
//! - `voice`: Retell webhook payloads
//! - `signature`: HMAC verification for webhook endpoints
//!
//! Errors are mapped to `IntegrationError` and never retried here;
//! callers decide how upstream failures surface.

use std::time::Duration;

pub mod email;
pub mod llm;
pub mod signature;
pub mod sms;
pub mod stripe;
pub mod voice;
pub mod weather;

/// Errors returned by integration clients
#[derive(thiserror::Error, Debug)]
pub enum IntegrationError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("api error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Default timeout applied to every vendor call
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Build the shared HTTP client used by all integration clients
pub fn http_client(timeout_secs: u64) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(5))
        .build()
        .unwrap_or_default()
}
