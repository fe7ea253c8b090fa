//! Retell voice AI webhook payloads
//!
//! Request/response shapes mirror Retell's own API contract; only the
//! fields the call-log flow reads are modeled.

use serde::{Deserialize, Serialize};

/// Webhook event names the call-log flow reacts to
pub mod event {
    pub const CALL_STARTED: &str = "call_started";
    pub const CALL_ENDED: &str = "call_ended";
    pub const CALL_ANALYZED: &str = "call_analyzed";
}

/// Top-level webhook envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetellWebhookEvent {
    pub event: String,
    pub call: RetellCall,
}

/// Call payload carried by every event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetellCall {
    pub call_id: String,
    #[serde(default)]
    pub from_number: Option<String>,
    #[serde(default)]
    pub to_number: Option<String>,
    /// Milliseconds, present once the call has ended
    #[serde(default)]
    pub duration_ms: Option<i64>,
    #[serde(default)]
    pub transcript: Option<String>,
    #[serde(default)]
    pub call_analysis: Option<RetellCallAnalysis>,
    /// Business routing metadata set when the agent was configured
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

/// Post-call analysis produced by Retell
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetellCallAnalysis {
    #[serde(default)]
    pub call_summary: Option<String>,
}

impl RetellCall {
    /// Business id the call belongs to, read from agent metadata
    pub fn business_id(&self) -> Option<String> {
        self.metadata
            .as_ref()
            .and_then(|m| m.get("business_id"))
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
    }

    pub fn duration_seconds(&self) -> Option<i32> {
        self.duration_ms.map(|ms| (ms / 1000) as i32)
    }

    pub fn summary(&self) -> Option<&str> {
        self.call_analysis
            .as_ref()
            .and_then(|a| a.call_summary.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_webhook_event_deserialization() {
        let json = r#"{
            "event": "call_analyzed",
            "call": {
                "call_id": "call_abc123",
                "from_number": "+15558675309",
                "to_number": "+15550001111",
                "duration_ms": 95500,
                "transcript": "Agent: Hello...",
                "call_analysis": {"call_summary": "Caller booked an appointment."},
                "metadata": {"business_id": "biz-42"}
            }
        }"#;

        let event: RetellWebhookEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.event, event::CALL_ANALYZED);
        assert_eq!(event.call.call_id, "call_abc123");
        assert_eq!(event.call.business_id().as_deref(), Some("biz-42"));
        assert_eq!(event.call.duration_seconds(), Some(95));
        assert_eq!(event.call.summary(), Some("Caller booked an appointment."));
    }

    #[test]
    fn test_minimal_event_deserialization() {
        let json = r#"{"event": "call_started", "call": {"call_id": "c1"}}"#;
        let event: RetellWebhookEvent = serde_json::from_str(json).unwrap();
        assert!(event.call.business_id().is_none());
        assert!(event.call.duration_seconds().is_none());
        assert!(event.call.summary().is_none());
    }
}
