//! Vendor webhook endpoints
//!
//! Webhooks authenticate by HMAC signature over the raw body, never by
//! session token. Unknown event types are acknowledged and ignored so
//! vendors do not retry them.

use actix_web::{HttpRequest, HttpResponse, Responder, post, web};

use greenline_core::service::{audit, business, calls, events as event_service};
use greenline_integrations::signature;
use greenline_integrations::stripe as stripe_api;
use greenline_integrations::stripe::StripeWebhookEvent;
use greenline_integrations::voice::{self, RetellWebhookEvent};
use greenline_persistence::entity::platform_events;

use crate::model::common::{self, AppState};
use crate::model::constants::{
    RETELL_SIGNATURE_HEADER, STRIPE_SIGNATURE_HEADER, STRIPE_SIGNATURE_TOLERANCE_SECS,
};
use crate::model::response::handle_service_error;

fn header_value(req: &HttpRequest, name: &str) -> String {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

#[post("/webhooks/retell")]
async fn retell(req: HttpRequest, data: web::Data<AppState>, body: web::Bytes) -> impl Responder {
    let raw_body = String::from_utf8_lossy(&body).to_string();
    let provided = header_value(&req, RETELL_SIGNATURE_HEADER);
    let secret = data.configuration.retell_webhook_secret();

    if !signature::verify_retell_signature(&raw_body, &provided, &secret) {
        tracing::warn!("Rejected Retell webhook with bad signature");
        return HttpResponse::Unauthorized().json(serde_json::json!({
            "code": 401,
            "message": "webhook signature invalid",
            "data": null
        }));
    }

    let event: RetellWebhookEvent = match serde_json::from_str(&raw_body) {
        Ok(event) => event,
        Err(e) => {
            return common::ConsoleException::handle_illegal_argument_exception(format!(
                "malformed webhook payload: {}",
                e
            ));
        }
    };

    // Only end-of-call events carry data the call log needs
    if event.event != voice::event::CALL_ENDED && event.event != voice::event::CALL_ANALYZED {
        return common::Result::<String>::http_success("ignored");
    }

    let Some(business_id) = event.call.business_id() else {
        tracing::warn!(call_id = %event.call.call_id, "Retell call without business metadata");
        return common::Result::<String>::http_success("ignored");
    };

    if business::find_by_id(data.db(), &business_id)
        .await
        .ok()
        .flatten()
        .is_none()
    {
        tracing::warn!(call_id = %event.call.call_id, %business_id, "Retell call for unknown business");
        return common::Result::<String>::http_success("ignored");
    }

    match calls::upsert_from_webhook(data.db(), &business_id, &event.call).await {
        Ok((log, upserted)) => {
            if upserted == calls::UpsertOutcome::Inserted {
                event_service::record_best_effort(
                    data.db(),
                    platform_events::event_type::CALL_LOGGED,
                    Some(business_id.as_str()),
                    "retell-webhook",
                    Some(&serde_json::json!({
                        "callId": log.provider_call_id,
                        "outcome": log.outcome,
                    })),
                )
                .await;
            }
            audit::log_operation_best_effort(
                data.db(),
                audit::AuditLogEntry::builder()
                    .operation(audit::operation::WEBHOOK)
                    .resource_type(audit::resource::CALL)
                    .resource_id(log.provider_call_id.clone())
                    .business_id(&business_id)
                    .operator("retell-webhook")
                    .details(format!("event={} outcome={}", event.event, log.outcome))
                    .success()
                    .build(),
            )
            .await;
            common::Result::<()>::http_success(log)
        }
        Err(e) => handle_service_error(req.path(), e),
    }
}

#[post("/webhooks/stripe")]
async fn stripe(req: HttpRequest, data: web::Data<AppState>, body: web::Bytes) -> impl Responder {
    let raw_body = String::from_utf8_lossy(&body).to_string();
    let provided = header_value(&req, STRIPE_SIGNATURE_HEADER);
    let secret = data.configuration.stripe_webhook_secret();
    let now = chrono::Utc::now().timestamp();

    if !signature::verify_stripe_signature(
        &provided,
        &raw_body,
        &secret,
        STRIPE_SIGNATURE_TOLERANCE_SECS,
        now,
    ) {
        tracing::warn!("Rejected Stripe webhook with bad signature");
        return HttpResponse::Unauthorized().json(serde_json::json!({
            "code": 401,
            "message": "webhook signature invalid",
            "data": null
        }));
    }

    let event: StripeWebhookEvent = match serde_json::from_str(&raw_body) {
        Ok(event) => event,
        Err(e) => {
            return common::ConsoleException::handle_illegal_argument_exception(format!(
                "malformed webhook payload: {}",
                e
            ));
        }
    };

    let new_tier = match event.event_type.as_str() {
        stripe_api::event_type::SUBSCRIPTION_UPDATED => data
            .configuration
            .stripe_price_tier(event.data.object.price_id().unwrap_or_default()),
        stripe_api::event_type::SUBSCRIPTION_DELETED => greenline_common::Tier::Tier1,
        _ => {
            // Not a tier sync event
            return common::Result::<String>::http_success("ignored");
        }
    };

    let customer = &event.data.object.customer;
    let found = match business::find_by_stripe_customer(data.db(), customer).await {
        Ok(b) => b,
        Err(e) => return handle_service_error(req.path(), e),
    };

    let Some(biz) = found else {
        tracing::warn!(%customer, "Stripe event for unknown customer");
        return common::Result::<String>::http_success("ignored");
    };

    if biz.tier == new_tier.as_str() {
        return common::Result::<String>::http_success("unchanged");
    }

    match business::set_tier(data.db(), &biz.id, new_tier).await {
        Ok(()) => {
            event_service::record_best_effort(
                data.db(),
                platform_events::event_type::TIER_CHANGED,
                Some(biz.id.as_str()),
                "stripe-webhook",
                Some(&serde_json::json!({"tier": new_tier.as_str(), "source": "stripe"})),
            )
            .await;
            audit::log_operation_best_effort(
                data.db(),
                audit::AuditLogEntry::builder()
                    .operation(audit::operation::TIER_CHANGE)
                    .resource_type(audit::resource::BUSINESS)
                    .resource_id(&biz.id)
                    .business_id(&biz.id)
                    .operator("stripe-webhook")
                    .details(format!("event={} tier={}", event.id, new_tier))
                    .success()
                    .build(),
            )
            .await;
            common::Result::<String>::http_success("tier updated")
        }
        Err(e) => handle_service_error(req.path(), e),
    }
}
