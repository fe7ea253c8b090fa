use actix_web::{HttpRequest, Responder, get, post, put, web};
use serde::Deserialize;

use greenline_auth::model::Role;
use greenline_core::service::{audit, polls};

use crate::model::common::{self, AppState};
use crate::model::response::handle_service_error;
use crate::secured::{current_username, source_ip};
use crate::{ActionTypes, ApiType, Secured, secured};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatePollRequest {
    question: String,
    options: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatusFormData {
    status: String,
}

#[get("/businesses/{business_id}/polls")]
async fn list(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> impl Responder {
    let business_id = path.into_inner();
    secured!(
        Secured::builder(&req, &data, "polls")
            .action(ActionTypes::Read)
            .api_type(ApiType::BusinessApi)
            .business_id(&business_id)
            .min_role(Role::Member)
            .build()
    );

    match polls::list_by_business(data.db(), &business_id).await {
        Ok(list) => common::Result::<()>::http_success(list),
        Err(e) => handle_service_error(req.path(), e),
    }
}

#[post("/businesses/{business_id}/polls")]
async fn create(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<String>,
    params: web::Json<CreatePollRequest>,
) -> impl Responder {
    let business_id = path.into_inner();
    secured!(
        Secured::builder(&req, &data, "polls")
            .action(ActionTypes::Write)
            .api_type(ApiType::BusinessApi)
            .business_id(&business_id)
            .min_role(Role::Admin)
            .build()
    );

    let params = params.into_inner();
    match polls::create(data.db(), &business_id, &params.question, params.options).await {
        Ok(poll) => {
            audit::log_operation_best_effort(
                data.db(),
                audit::AuditLogEntry::builder()
                    .operation(audit::operation::CREATE)
                    .resource_type(audit::resource::POLL)
                    .resource_id(&poll.id)
                    .business_id(&business_id)
                    .operator(current_username(&req))
                    .source_ip(source_ip(&req).unwrap_or_default())
                    .success()
                    .build(),
            )
            .await;
            common::Result::<()>::http_success(poll)
        }
        Err(e) => handle_service_error(req.path(), e),
    }
}

#[get("/businesses/{business_id}/polls/{poll_id}")]
async fn get(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> impl Responder {
    let (business_id, poll_id) = path.into_inner();
    secured!(
        Secured::builder(&req, &data, "polls")
            .action(ActionTypes::Read)
            .api_type(ApiType::BusinessApi)
            .business_id(&business_id)
            .min_role(Role::Member)
            .build()
    );

    match polls::get(data.db(), &business_id, &poll_id).await {
        Ok(poll) => common::Result::<()>::http_success(poll),
        Err(e) => handle_service_error(req.path(), e),
    }
}

#[put("/businesses/{business_id}/polls/{poll_id}/status")]
async fn set_status(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<(String, String)>,
    params: web::Form<StatusFormData>,
) -> impl Responder {
    let (business_id, poll_id) = path.into_inner();
    secured!(
        Secured::builder(&req, &data, "polls")
            .action(ActionTypes::Write)
            .api_type(ApiType::BusinessApi)
            .business_id(&business_id)
            .min_role(Role::Admin)
            .build()
    );

    match polls::set_status(data.db(), &business_id, &poll_id, &params.status).await {
        Ok(()) => common::Result::<String>::http_success("update poll ok!"),
        Err(e) => handle_service_error(req.path(), e),
    }
}
