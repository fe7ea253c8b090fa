//! Twilio SMS client
//!
//! Used by call-log nudges. Form-encoded POST with basic auth, per the
//! Twilio messages API contract.

use serde::Deserialize;

use crate::IntegrationError;

pub const DEFAULT_BASE_URL: &str = "https://api.twilio.com";

#[derive(Debug, Deserialize)]
struct MessageResponse {
    sid: String,
    status: Option<String>,
}

/// Twilio API client
#[derive(Clone)]
pub struct SmsClient {
    http: reqwest::Client,
    base_url: String,
    account_sid: String,
    auth_token: String,
    from_number: String,
}

impl SmsClient {
    pub fn new(
        http: reqwest::Client,
        base_url: &str,
        account_sid: &str,
        auth_token: &str,
        from_number: &str,
    ) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            account_sid: account_sid.to_string(),
            auth_token: auth_token.to_string(),
            from_number: from_number.to_string(),
        }
    }

    /// Send one SMS, returning the provider message sid
    pub async fn send(&self, to: &str, body: &str) -> Result<String, IntegrationError> {
        let url = format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.base_url, self.account_sid
        );

        let params = [("To", to), ("From", self.from_number.as_str()), ("Body", body)];

        let response = self
            .http
            .post(url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(IntegrationError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let message: MessageResponse = response.json().await?;
        tracing::debug!(
            sid = %message.sid,
            status = ?message.status,
            "SMS accepted by Twilio"
        );

        Ok(message.sid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_response_deserialization() {
        let json = r#"{"sid":"SM123","status":"queued","num_segments":"1"}"#;
        let response: MessageResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.sid, "SM123");
        assert_eq!(response.status.as_deref(), Some("queued"));
    }
}
