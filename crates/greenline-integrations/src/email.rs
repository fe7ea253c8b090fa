//! SendGrid email client
//!
//! Lead notifications and weather digests go out through the v3 send
//! API. Failures are reported to the caller, which logs and moves on;
//! email is never allowed to fail a request.

use serde::Serialize;

use crate::IntegrationError;

pub const DEFAULT_BASE_URL: &str = "https://api.sendgrid.com";

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    personalizations: Vec<Personalization<'a>>,
    from: Address<'a>,
    subject: &'a str,
    content: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Personalization<'a> {
    to: Vec<Address<'a>>,
}

#[derive(Debug, Serialize)]
struct Address<'a> {
    email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    r#type: &'a str,
    value: &'a str,
}

/// SendGrid API client
#[derive(Clone)]
pub struct EmailClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    from_email: String,
    from_name: String,
}

impl EmailClient {
    pub fn new(
        http: reqwest::Client,
        base_url: &str,
        api_key: &str,
        from_email: &str,
        from_name: &str,
    ) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            from_email: from_email.to_string(),
            from_name: from_name.to_string(),
        }
    }

    /// Send one plain-text email
    pub async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), IntegrationError> {
        let request = SendRequest {
            personalizations: vec![Personalization {
                to: vec![Address { email: to, name: None }],
            }],
            from: Address {
                email: &self.from_email,
                name: Some(&self.from_name),
            },
            subject,
            content: vec![Content {
                r#type: "text/plain",
                value: body,
            }],
        };

        let response = self
            .http
            .post(format!("{}/v3/mail/send", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        // SendGrid answers 202 Accepted on success
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(IntegrationError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_request_shape() {
        let request = SendRequest {
            personalizations: vec![Personalization {
                to: vec![Address {
                    email: "owner@example.com",
                    name: None,
                }],
            }],
            from: Address {
                email: "noreply@greenline365.com",
                name: Some("GreenLine365"),
            },
            subject: "New lead",
            content: vec![Content {
                r#type: "text/plain",
                value: "A lead arrived",
            }],
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json["personalizations"][0]["to"][0]["email"],
            "owner@example.com"
        );
        assert_eq!(json["from"]["name"], "GreenLine365");
        assert_eq!(json["content"][0]["type"], "text/plain");
        // to-address name is omitted entirely when unset
        assert!(json["personalizations"][0]["to"][0].get("name").is_none());
    }
}
