use actix_web::{HttpRequest, Responder, get, post, put, web};
use serde::Deserialize;

use greenline_core::service::{audit, business, events as event_service, metrics as metrics_service};
use greenline_persistence::entity::platform_events;

use crate::model::common::{self, AppState};
use crate::model::constants::clamp_page_size;
use crate::model::response::handle_service_error;
use crate::secured::{current_username, source_ip};
use crate::{ActionTypes, ApiType, Secured, Tier, secured};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuditSearchParam {
    operation: Option<String>,
    resource_type: Option<String>,
    business_id: Option<String>,
    operator: Option<String>,
    result: Option<String>,
    page_no: Option<u32>,
    page_size: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BusinessSearchParam {
    keyword: Option<String>,
    page_no: Option<u64>,
    page_size: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TierFormData {
    tier: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatusFormData {
    status: String,
}

#[get("/console/metrics")]
async fn metrics(req: HttpRequest, data: web::Data<AppState>) -> impl Responder {
    secured!(
        Secured::builder(&req, &data, "console/metrics")
            .action(ActionTypes::Read)
            .api_type(ApiType::ConsoleApi)
            .build()
    );

    match metrics_service::gather(data.db()).await {
        Ok(snapshot) => common::Result::<()>::http_success(snapshot),
        Err(e) => handle_service_error(req.path(), e),
    }
}

#[get("/console/audit")]
async fn audit_search(
    req: HttpRequest,
    data: web::Data<AppState>,
    params: web::Query<AuditSearchParam>,
) -> impl Responder {
    secured!(
        Secured::builder(&req, &data, "console/audit")
            .action(ActionTypes::Read)
            .api_type(ApiType::ConsoleApi)
            .build()
    );

    let search = audit::AuditLogSearch {
        operation: params.operation.clone(),
        resource_type: params.resource_type.clone(),
        business_id: params.business_id.clone(),
        operator: params.operator.clone(),
        result: params.result.clone(),
        ..Default::default()
    };

    let result = audit::search_logs(
        data.db(),
        &search,
        params.page_no.unwrap_or(1).max(1),
        clamp_page_size(params.page_size) as u32,
    )
    .await;

    match result {
        Ok(page) => common::Result::<()>::http_success(page),
        Err(e) => handle_service_error(req.path(), e),
    }
}

/// Apply the configured audit retention policy
#[post("/console/audit/cleanup")]
async fn audit_cleanup(req: HttpRequest, data: web::Data<AppState>) -> impl Responder {
    secured!(
        Secured::builder(&req, &data, "console/audit")
            .action(ActionTypes::Write)
            .api_type(ApiType::ConsoleApi)
            .build()
    );

    let retention_days = data.configuration.audit_retention_days();

    match audit::cleanup_old_logs(data.db(), retention_days).await {
        Ok(deleted) => {
            tracing::info!(deleted, retention_days, "Audit log cleanup complete");
            common::Result::<()>::http_success(serde_json::json!({ "deleted": deleted }))
        }
        Err(e) => handle_service_error(req.path(), e),
    }
}

#[get("/console/businesses")]
async fn list_businesses(
    req: HttpRequest,
    data: web::Data<AppState>,
    params: web::Query<BusinessSearchParam>,
) -> impl Responder {
    secured!(
        Secured::builder(&req, &data, "console/businesses")
            .action(ActionTypes::Read)
            .api_type(ApiType::ConsoleApi)
            .build()
    );

    let result = business::search_page(
        data.db(),
        params.keyword.as_deref().unwrap_or_default(),
        params.page_no.unwrap_or(1).max(1),
        clamp_page_size(params.page_size),
    )
    .await;

    match result {
        Ok(page) => common::Result::<()>::http_success(page),
        Err(e) => handle_service_error(req.path(), e),
    }
}

/// Manual tier override by a platform operator
#[put("/console/businesses/{business_id}/tier")]
async fn set_tier(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<String>,
    params: web::Form<TierFormData>,
) -> impl Responder {
    let business_id = path.into_inner();
    secured!(
        Secured::builder(&req, &data, "console/businesses")
            .action(ActionTypes::Write)
            .api_type(ApiType::ConsoleApi)
            .build()
    );

    let tier: Tier = match params.tier.parse() {
        Ok(t) => t,
        Err(e) => return common::ConsoleException::handle_illegal_argument_exception(e),
    };

    match business::set_tier(data.db(), &business_id, tier).await {
        Ok(()) => {
            event_service::record_best_effort(
                data.db(),
                platform_events::event_type::TIER_CHANGED,
                Some(business_id.as_str()),
                &current_username(&req),
                Some(&serde_json::json!({"tier": tier.as_str(), "source": "console"})),
            )
            .await;
            audit::log_operation_best_effort(
                data.db(),
                audit::AuditLogEntry::builder()
                    .operation(audit::operation::TIER_CHANGE)
                    .resource_type(audit::resource::BUSINESS)
                    .resource_id(&business_id)
                    .business_id(&business_id)
                    .operator(current_username(&req))
                    .source_ip(source_ip(&req).unwrap_or_default())
                    .details(format!("tier={}", tier))
                    .success()
                    .build(),
            )
            .await;
            common::Result::<String>::http_success("update tier ok!")
        }
        Err(e) => handle_service_error(req.path(), e),
    }
}

#[put("/console/businesses/{business_id}/status")]
async fn set_status(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<String>,
    params: web::Form<StatusFormData>,
) -> impl Responder {
    let business_id = path.into_inner();
    secured!(
        Secured::builder(&req, &data, "console/businesses")
            .action(ActionTypes::Write)
            .api_type(ApiType::ConsoleApi)
            .build()
    );

    match business::set_status(data.db(), &business_id, &params.status).await {
        Ok(()) => {
            audit::log_operation_best_effort(
                data.db(),
                audit::AuditLogEntry::builder()
                    .operation(audit::operation::UPDATE)
                    .resource_type(audit::resource::BUSINESS)
                    .resource_id(&business_id)
                    .business_id(&business_id)
                    .operator(current_username(&req))
                    .source_ip(source_ip(&req).unwrap_or_default())
                    .details(format!("status={}", params.status))
                    .success()
                    .build(),
            )
            .await;
            common::Result::<String>::http_success("update status ok!")
        }
        Err(e) => handle_service_error(req.path(), e),
    }
}
