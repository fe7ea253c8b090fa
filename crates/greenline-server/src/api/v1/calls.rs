use actix_web::{HttpRequest, Responder, get, post, web};
use serde::Deserialize;

use greenline_auth::model::Role;
use greenline_core::service::{audit, calls};

use crate::model::common::{self, AppState};
use crate::model::constants::clamp_page_size;
use crate::model::response::handle_service_error;
use crate::secured::{current_username, source_ip};
use crate::{ActionTypes, ApiType, Secured, Tier, secured};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchPageParam {
    outcome: Option<String>,
    page_no: Option<u64>,
    page_size: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NudgeFormData {
    message: Option<String>,
}

#[get("/businesses/{business_id}/calls")]
async fn search_page(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<String>,
    params: web::Query<SearchPageParam>,
) -> impl Responder {
    let business_id = path.into_inner();
    secured!(
        Secured::builder(&req, &data, "calls")
            .action(ActionTypes::Read)
            .api_type(ApiType::BusinessApi)
            .business_id(&business_id)
            .min_role(Role::Member)
            .min_tier(Tier::Tier3)
            .build()
    );

    let result = calls::search_page(
        data.db(),
        &business_id,
        params.outcome.as_deref(),
        params.page_no.unwrap_or(1).max(1),
        clamp_page_size(params.page_size),
    )
    .await;

    match result {
        Ok(page) => common::Result::<()>::http_success(page),
        Err(e) => handle_service_error(req.path(), e),
    }
}

#[get("/businesses/{business_id}/calls/{call_log_id}")]
async fn get(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<(String, u64)>,
) -> impl Responder {
    let (business_id, call_log_id) = path.into_inner();
    secured!(
        Secured::builder(&req, &data, "calls")
            .action(ActionTypes::Read)
            .api_type(ApiType::BusinessApi)
            .business_id(&business_id)
            .min_role(Role::Member)
            .min_tier(Tier::Tier3)
            .build()
    );

    match calls::get(data.db(), &business_id, call_log_id).await {
        Ok(log) => common::Result::<()>::http_success(log),
        Err(e) => handle_service_error(req.path(), e),
    }
}

/// SMS follow-up for a callback-requested call
#[post("/businesses/{business_id}/calls/{call_log_id}/nudge")]
async fn nudge(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<(String, u64)>,
    params: web::Form<NudgeFormData>,
) -> impl Responder {
    let (business_id, call_log_id) = path.into_inner();
    secured!(
        Secured::builder(&req, &data, "calls")
            .action(ActionTypes::Write)
            .api_type(ApiType::BusinessApi)
            .business_id(&business_id)
            .min_role(Role::Admin)
            .min_tier(Tier::Tier3)
            .build()
    );

    let message = params
        .message
        .clone()
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| {
            "Thanks for calling! You asked us to follow up - reply here or call us back anytime."
                .to_string()
        });

    let result = calls::nudge(data.db(), &data.sms, &business_id, call_log_id, &message).await;

    match result {
        Ok(log) => {
            audit::log_operation_best_effort(
                data.db(),
                audit::AuditLogEntry::builder()
                    .operation(audit::operation::NUDGE)
                    .resource_type(audit::resource::CALL)
                    .resource_id(log.provider_call_id.clone())
                    .business_id(&business_id)
                    .operator(current_username(&req))
                    .source_ip(source_ip(&req).unwrap_or_default())
                    .details(format!("nudgeCount={}", log.nudge_count))
                    .success()
                    .build(),
            )
            .await;
            common::Result::<()>::http_success(log)
        }
        Err(e) => handle_service_error(req.path(), e),
    }
}
