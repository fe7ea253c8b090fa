//! Public endpoints: no session required
//!
//! The marketing site and directory pages consume these.

use actix_web::{HttpRequest, Responder, get, post, web};
use serde::Deserialize;

use greenline_core::service::{business, crm, directory, events as event_service, polls};
use greenline_persistence::entity::platform_events;

use crate::model::common::{self, AppState};
use crate::model::constants::clamp_page_size;
use crate::model::response::handle_service_error;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DirectorySearchParam {
    category: Option<String>,
    city: Option<String>,
    page_no: Option<u64>,
    page_size: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VoteFormData {
    option_id: String,
}

/// Published directory listings, photo-gated by the owning tier
#[get("/public/directory")]
async fn directory_search(
    req: HttpRequest,
    data: web::Data<AppState>,
    params: web::Query<DirectorySearchParam>,
) -> impl Responder {
    let result = directory::public_search(
        data.db(),
        params.category.as_deref(),
        params.city.as_deref(),
        params.page_no.unwrap_or(1).max(1),
        clamp_page_size(params.page_size),
    )
    .await;

    match result {
        Ok(page) => common::Result::<()>::http_success(page),
        Err(e) => handle_service_error(req.path(), e),
    }
}

/// Lead capture from the public site
///
/// Writes the lead, records a platform event, and notifies the business
/// by email when a contact address is configured. Email failures never
/// fail the capture.
#[post("/public/businesses/{business_id}/leads")]
async fn capture_lead(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<String>,
    params: web::Json<crm::CreateLead>,
) -> impl Responder {
    let business_id = path.into_inner();

    let biz = match business::find_by_id(data.db(), &business_id).await {
        Ok(Some(b)) => b,
        Ok(None) => {
            return common::ConsoleException::handle_not_found_exception(format!(
                "business '{}'",
                business_id
            ));
        }
        Err(e) => return handle_service_error(req.path(), e),
    };

    let mut lead = params.into_inner();
    lead.source = Some("web_form".to_string());

    let created = match crm::create(data.db(), &business_id, lead).await {
        Ok(l) => l,
        Err(e) => return handle_service_error(req.path(), e),
    };

    event_service::record_best_effort(
        data.db(),
        platform_events::event_type::LEAD_CAPTURED,
        Some(business_id.as_str()),
        "public-site",
        Some(&serde_json::json!({"leadId": created.id, "source": "web_form"})),
    )
    .await;

    if let Some(ref to) = biz.contact_email
        && let Err(e) = data
            .email
            .send(
                to,
                &format!("New lead for {}", biz.name),
                &format!(
                    "{} just reached out through your GreenLine365 page.\n\nName: {}\nEmail: {}\nPhone: {}",
                    created.name,
                    created.name,
                    created.email.as_deref().unwrap_or("-"),
                    created.phone.as_deref().unwrap_or("-"),
                ),
            )
            .await
    {
        tracing::warn!(%business_id, "Lead notification email failed: {}", e);
    }

    common::Result::<()>::http_success(created)
}

/// Public poll vote
#[post("/public/polls/{poll_id}/vote")]
async fn vote(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<String>,
    params: web::Form<VoteFormData>,
) -> impl Responder {
    let poll_id = path.into_inner();

    match polls::vote(data.db(), &poll_id, &params.option_id).await {
        Ok(poll) => {
            event_service::record_best_effort(
                data.db(),
                platform_events::event_type::POLL_VOTED,
                Some(poll.business_id.as_str()),
                "public-site",
                Some(&serde_json::json!({"pollId": poll.id, "optionId": params.option_id})),
            )
            .await;
            common::Result::<()>::http_success(poll)
        }
        Err(e) => handle_service_error(req.path(), e),
    }
}
