use actix_web::{HttpRequest, Responder, delete, get, post, put, web};
use serde::Deserialize;

use greenline_auth::model::Role;
use greenline_core::service::{audit, crm};

use crate::model::common::{self, AppState};
use crate::model::constants::clamp_page_size;
use crate::model::response::handle_service_error;
use crate::secured::{current_username, source_ip};
use crate::{ActionTypes, ApiType, Secured, secured};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchPageParam {
    status: Option<String>,
    keyword: Option<String>,
    page_no: Option<u64>,
    page_size: Option<u64>,
}

#[get("/businesses/{business_id}/leads")]
async fn search_page(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<String>,
    params: web::Query<SearchPageParam>,
) -> impl Responder {
    let business_id = path.into_inner();
    secured!(
        Secured::builder(&req, &data, "crm")
            .action(ActionTypes::Read)
            .api_type(ApiType::BusinessApi)
            .business_id(&business_id)
            .min_role(Role::Member)
            .build()
    );

    let search = crm::LeadSearch {
        status: params.status.clone(),
        keyword: params.keyword.clone(),
    };

    let result = crm::search_page(
        data.db(),
        &business_id,
        &search,
        params.page_no.unwrap_or(1).max(1),
        clamp_page_size(params.page_size),
    )
    .await;

    match result {
        Ok(page) => common::Result::<()>::http_success(page),
        Err(e) => handle_service_error(req.path(), e),
    }
}

#[post("/businesses/{business_id}/leads")]
async fn create(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<String>,
    params: web::Json<crm::CreateLead>,
) -> impl Responder {
    let business_id = path.into_inner();
    secured!(
        Secured::builder(&req, &data, "crm")
            .action(ActionTypes::Write)
            .api_type(ApiType::BusinessApi)
            .business_id(&business_id)
            .min_role(Role::Member)
            .build()
    );

    let mut lead = params.into_inner();
    if lead.source.is_none() {
        lead.source = Some("manual".to_string());
    }

    match crm::create(data.db(), &business_id, lead).await {
        Ok(created) => {
            audit::log_operation_best_effort(
                data.db(),
                audit::AuditLogEntry::builder()
                    .operation(audit::operation::CREATE)
                    .resource_type(audit::resource::LEAD)
                    .resource_id(&created.id)
                    .business_id(&business_id)
                    .operator(current_username(&req))
                    .source_ip(source_ip(&req).unwrap_or_default())
                    .success()
                    .build(),
            )
            .await;
            common::Result::<()>::http_success(created)
        }
        Err(e) => handle_service_error(req.path(), e),
    }
}

#[get("/businesses/{business_id}/leads/{lead_id}")]
async fn get(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> impl Responder {
    let (business_id, lead_id) = path.into_inner();
    secured!(
        Secured::builder(&req, &data, "crm")
            .action(ActionTypes::Read)
            .api_type(ApiType::BusinessApi)
            .business_id(&business_id)
            .min_role(Role::Member)
            .build()
    );

    match crm::get(data.db(), &business_id, &lead_id).await {
        Ok(lead) => common::Result::<()>::http_success(lead),
        Err(e) => handle_service_error(req.path(), e),
    }
}

#[put("/businesses/{business_id}/leads/{lead_id}")]
async fn update(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<(String, String)>,
    params: web::Json<crm::UpdateLead>,
) -> impl Responder {
    let (business_id, lead_id) = path.into_inner();
    secured!(
        Secured::builder(&req, &data, "crm")
            .action(ActionTypes::Write)
            .api_type(ApiType::BusinessApi)
            .business_id(&business_id)
            .min_role(Role::Member)
            .build()
    );

    match crm::update(data.db(), &business_id, &lead_id, params.into_inner()).await {
        Ok(updated) => {
            audit::log_operation_best_effort(
                data.db(),
                audit::AuditLogEntry::builder()
                    .operation(audit::operation::UPDATE)
                    .resource_type(audit::resource::LEAD)
                    .resource_id(&lead_id)
                    .business_id(&business_id)
                    .operator(current_username(&req))
                    .source_ip(source_ip(&req).unwrap_or_default())
                    .success()
                    .build(),
            )
            .await;
            common::Result::<()>::http_success(updated)
        }
        Err(e) => handle_service_error(req.path(), e),
    }
}

#[delete("/businesses/{business_id}/leads/{lead_id}")]
async fn delete(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> impl Responder {
    let (business_id, lead_id) = path.into_inner();
    secured!(
        Secured::builder(&req, &data, "crm")
            .action(ActionTypes::Write)
            .api_type(ApiType::BusinessApi)
            .business_id(&business_id)
            .min_role(Role::Admin)
            .build()
    );

    match crm::delete(data.db(), &business_id, &lead_id).await {
        Ok(()) => {
            audit::log_operation_best_effort(
                data.db(),
                audit::AuditLogEntry::builder()
                    .operation(audit::operation::DELETE)
                    .resource_type(audit::resource::LEAD)
                    .resource_id(&lead_id)
                    .business_id(&business_id)
                    .operator(current_username(&req))
                    .source_ip(source_ip(&req).unwrap_or_default())
                    .success()
                    .build(),
            )
            .await;
            common::Result::<String>::http_success("delete lead ok!")
        }
        Err(e) => handle_service_error(req.path(), e),
    }
}
