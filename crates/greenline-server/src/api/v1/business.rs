use actix_web::{HttpRequest, Responder, delete, get, post, put, web};
use serde::Deserialize;

use greenline_auth::model::{ONLY_IDENTITY, Role};
use greenline_auth::service::membership;
use greenline_core::service::{audit, business, events as event_service, metrics as metrics_service};

use crate::model::common::{self, AppState};
use crate::model::response::handle_service_error;
use crate::secured::{current_username, source_ip};
use crate::{ActionTypes, ApiType, Secured, secured};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MemberFormData {
    username: String,
    role: Role,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RoleFormData {
    role: Role,
}

/// Self-serve signup: any authenticated user may create a business and
/// becomes its owner.
#[post("/businesses")]
async fn create(
    req: HttpRequest,
    data: web::Data<AppState>,
    params: web::Json<business::CreateBusiness>,
) -> impl Responder {
    secured!(
        Secured::builder(&req, &data, "businesses")
            .action(ActionTypes::Write)
            .api_type(ApiType::BusinessApi)
            .tags(vec![ONLY_IDENTITY.to_string()])
            .build()
    );

    let operator = current_username(&req);

    let created = match business::create(data.db(), params.into_inner()).await {
        Ok(b) => b,
        Err(e) => return handle_service_error(req.path(), e),
    };

    if let Err(e) = membership::add(data.db(), &operator, &created.id, Role::Owner).await {
        tracing::error!(business_id = %created.id, "Failed to add owner membership: {}", e);
        return handle_service_error(req.path(), e);
    }

    audit::log_operation_best_effort(
        data.db(),
        audit::AuditLogEntry::builder()
            .operation(audit::operation::CREATE)
            .resource_type(audit::resource::BUSINESS)
            .resource_id(&created.id)
            .business_id(&created.id)
            .operator(&operator)
            .source_ip(source_ip(&req).unwrap_or_default())
            .success()
            .build(),
    )
    .await;

    common::Result::<()>::http_success(created)
}

#[get("/businesses/{business_id}")]
async fn get(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> impl Responder {
    let business_id = path.into_inner();
    secured!(
        Secured::builder(&req, &data, "business")
            .action(ActionTypes::Read)
            .api_type(ApiType::BusinessApi)
            .business_id(&business_id)
            .min_role(Role::Member)
            .build()
    );

    match business::get(data.db(), &business_id).await {
        Ok(b) => common::Result::<()>::http_success(b),
        Err(e) => handle_service_error(req.path(), e),
    }
}

#[put("/businesses/{business_id}")]
async fn update(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<String>,
    params: web::Json<business::UpdateBusiness>,
) -> impl Responder {
    let business_id = path.into_inner();
    secured!(
        Secured::builder(&req, &data, "business")
            .action(ActionTypes::Write)
            .api_type(ApiType::BusinessApi)
            .business_id(&business_id)
            .min_role(Role::Admin)
            .build()
    );

    let result = business::update(data.db(), &business_id, params.into_inner()).await;

    match result {
        Ok(updated) => {
            audit::log_operation_best_effort(
                data.db(),
                audit::AuditLogEntry::builder()
                    .operation(audit::operation::UPDATE)
                    .resource_type(audit::resource::BUSINESS)
                    .resource_id(&business_id)
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

#[get("/businesses/{business_id}/members")]
async fn list_members(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> impl Responder {
    let business_id = path.into_inner();
    secured!(
        Secured::builder(&req, &data, "members")
            .action(ActionTypes::Read)
            .api_type(ApiType::BusinessApi)
            .business_id(&business_id)
            .min_role(Role::Member)
            .build()
    );

    match membership::find_by_business(data.db(), &business_id).await {
        Ok(members) => common::Result::<()>::http_success(members),
        Err(e) => handle_service_error(req.path(), e),
    }
}

#[post("/businesses/{business_id}/members")]
async fn add_member(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<String>,
    params: web::Form<MemberFormData>,
) -> impl Responder {
    let business_id = path.into_inner();
    secured!(
        Secured::builder(&req, &data, "members")
            .action(ActionTypes::Write)
            .api_type(ApiType::BusinessApi)
            .business_id(&business_id)
            .min_role(Role::Owner)
            .build()
    );

    match membership::add(data.db(), &params.username, &business_id, params.role).await {
        Ok(()) => {
            audit::log_operation_best_effort(
                data.db(),
                audit::AuditLogEntry::builder()
                    .operation(audit::operation::CREATE)
                    .resource_type(audit::resource::MEMBERSHIP)
                    .resource_id(&params.username)
                    .business_id(&business_id)
                    .operator(current_username(&req))
                    .source_ip(source_ip(&req).unwrap_or_default())
                    .success()
                    .build(),
            )
            .await;
            common::Result::<String>::http_success("add member ok!")
        }
        Err(e) => handle_service_error(req.path(), e),
    }
}

#[put("/businesses/{business_id}/members/{username}")]
async fn change_member_role(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<(String, String)>,
    params: web::Form<RoleFormData>,
) -> impl Responder {
    let (business_id, username) = path.into_inner();
    secured!(
        Secured::builder(&req, &data, "members")
            .action(ActionTypes::Write)
            .api_type(ApiType::BusinessApi)
            .business_id(&business_id)
            .min_role(Role::Owner)
            .build()
    );

    match membership::change_role(data.db(), &username, &business_id, params.role).await {
        Ok(()) => common::Result::<String>::http_success("update member ok!"),
        Err(e) => handle_service_error(req.path(), e),
    }
}

#[delete("/businesses/{business_id}/members/{username}")]
async fn remove_member(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> impl Responder {
    let (business_id, username) = path.into_inner();
    secured!(
        Secured::builder(&req, &data, "members")
            .action(ActionTypes::Write)
            .api_type(ApiType::BusinessApi)
            .business_id(&business_id)
            .min_role(Role::Owner)
            .build()
    );

    match membership::remove(data.db(), &username, &business_id).await {
        Ok(()) => {
            audit::log_operation_best_effort(
                data.db(),
                audit::AuditLogEntry::builder()
                    .operation(audit::operation::DELETE)
                    .resource_type(audit::resource::MEMBERSHIP)
                    .resource_id(&username)
                    .business_id(&business_id)
                    .operator(current_username(&req))
                    .source_ip(source_ip(&req).unwrap_or_default())
                    .success()
                    .build(),
            )
            .await;
            common::Result::<String>::http_success("remove member ok!")
        }
        Err(e) => handle_service_error(req.path(), e),
    }
}

#[get("/businesses/{business_id}/metrics")]
async fn metrics(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> impl Responder {
    let business_id = path.into_inner();
    secured!(
        Secured::builder(&req, &data, "metrics")
            .action(ActionTypes::Read)
            .api_type(ApiType::BusinessApi)
            .business_id(&business_id)
            .min_role(Role::Member)
            .build()
    );

    match metrics_service::gather_for_business(data.db(), &business_id).await {
        Ok(snapshot) => common::Result::<()>::http_success(snapshot),
        Err(e) => handle_service_error(req.path(), e),
    }
}

#[get("/businesses/{business_id}/events")]
async fn events(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> impl Responder {
    let business_id = path.into_inner();
    secured!(
        Secured::builder(&req, &data, "events")
            .action(ActionTypes::Read)
            .api_type(ApiType::BusinessApi)
            .business_id(&business_id)
            .min_role(Role::Member)
            .build()
    );

    match event_service::recent(data.db(), &business_id, 50).await {
        Ok(rows) => common::Result::<()>::http_success(rows),
        Err(e) => handle_service_error(req.path(), e),
    }
}
