//! Stripe webhook payloads
//!
//! Only the subscription-lifecycle events the tier sync consumes are
//! modeled; shapes mirror Stripe's API contract.

use serde::{Deserialize, Serialize};

/// Event types the tier sync reacts to
pub mod event_type {
    pub const SUBSCRIPTION_UPDATED: &str = "customer.subscription.updated";
    pub const SUBSCRIPTION_DELETED: &str = "customer.subscription.deleted";
}

/// Top-level webhook envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StripeWebhookEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: StripeEventData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StripeEventData {
    pub object: StripeSubscription,
}

/// Subscription object carried by subscription.* events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StripeSubscription {
    pub customer: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub items: Option<StripeSubscriptionItems>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StripeSubscriptionItems {
    #[serde(default)]
    pub data: Vec<StripeSubscriptionItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StripeSubscriptionItem {
    pub price: StripePrice,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StripePrice {
    pub id: String,
}

impl StripeSubscription {
    /// Price id of the first subscription item, if any
    pub fn price_id(&self) -> Option<&str> {
        self.items
            .as_ref()
            .and_then(|items| items.data.first())
            .map(|item| item.price.id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscription_event_deserialization() {
        let json = r#"{
            "id": "evt_1",
            "type": "customer.subscription.updated",
            "data": {
                "object": {
                    "customer": "cus_123",
                    "status": "active",
                    "items": {"data": [{"price": {"id": "price_t2"}}]}
                }
            }
        }"#;

        let event: StripeWebhookEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.event_type, event_type::SUBSCRIPTION_UPDATED);
        assert_eq!(event.data.object.customer, "cus_123");
        assert_eq!(event.data.object.price_id(), Some("price_t2"));
    }

    #[test]
    fn test_subscription_without_items() {
        let json = r#"{
            "id": "evt_2",
            "type": "customer.subscription.deleted",
            "data": {"object": {"customer": "cus_456"}}
        }"#;

        let event: StripeWebhookEvent = serde_json::from_str(json).unwrap();
        assert!(event.data.object.price_id().is_none());
    }
}
