use actix_web::{HttpRequest, Responder, delete, get, post, put, web};
use serde::Deserialize;

use greenline_auth::model::Role;
use greenline_core::service::memory;

use crate::model::common::{self, AppState};
use crate::model::response::handle_service_error;
use crate::{ActionTypes, ApiType, Secured, secured};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FactFormData {
    content: String,
    priority: Option<i32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PreferenceFormData {
    key: String,
    value: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PreferenceParam {
    key: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InsightFormData {
    content: String,
    score: Option<f64>,
}

/// Preview the context string exactly as the chat flow will see it
#[get("/businesses/{business_id}/memory/context")]
async fn context(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> impl Responder {
    let business_id = path.into_inner();
    secured!(
        Secured::builder(&req, &data, "memory")
            .action(ActionTypes::Read)
            .api_type(ApiType::BusinessApi)
            .business_id(&business_id)
            .min_role(Role::Member)
            .build()
    );

    match memory::assemble_context(data.db(), &business_id, memory::DEFAULT_BUDGET_CHARS).await {
        Ok(prompt) => common::Result::<()>::http_success(prompt),
        Err(e) => handle_service_error(req.path(), e),
    }
}

#[get("/businesses/{business_id}/memory/facts")]
async fn list_facts(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> impl Responder {
    let business_id = path.into_inner();
    secured!(
        Secured::builder(&req, &data, "memory")
            .action(ActionTypes::Read)
            .api_type(ApiType::BusinessApi)
            .business_id(&business_id)
            .min_role(Role::Member)
            .build()
    );

    match memory::list_facts(data.db(), &business_id).await {
        Ok(facts) => common::Result::<()>::http_success(facts),
        Err(e) => handle_service_error(req.path(), e),
    }
}

#[post("/businesses/{business_id}/memory/facts")]
async fn add_fact(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<String>,
    params: web::Form<FactFormData>,
) -> impl Responder {
    let business_id = path.into_inner();
    secured!(
        Secured::builder(&req, &data, "memory")
            .action(ActionTypes::Write)
            .api_type(ApiType::BusinessApi)
            .business_id(&business_id)
            .min_role(Role::Member)
            .build()
    );

    match memory::add_fact(
        data.db(),
        &business_id,
        &params.content,
        params.priority.unwrap_or(0),
    )
    .await
    {
        Ok(fact) => common::Result::<()>::http_success(fact),
        Err(e) => handle_service_error(req.path(), e),
    }
}

#[delete("/businesses/{business_id}/memory/facts/{fact_id}")]
async fn delete_fact(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<(String, u64)>,
) -> impl Responder {
    let (business_id, fact_id) = path.into_inner();
    secured!(
        Secured::builder(&req, &data, "memory")
            .action(ActionTypes::Write)
            .api_type(ApiType::BusinessApi)
            .business_id(&business_id)
            .min_role(Role::Member)
            .build()
    );

    match memory::delete_fact(data.db(), &business_id, fact_id).await {
        Ok(()) => common::Result::<String>::http_success("delete fact ok!"),
        Err(e) => handle_service_error(req.path(), e),
    }
}

/// Store an AI-derived observation
///
/// Called by the content tools after analysis runs; higher scores rank
/// earlier during context assembly.
#[post("/businesses/{business_id}/memory/insights")]
async fn add_insight(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<String>,
    params: web::Form<InsightFormData>,
) -> impl Responder {
    let business_id = path.into_inner();
    secured!(
        Secured::builder(&req, &data, "memory")
            .action(ActionTypes::Write)
            .api_type(ApiType::BusinessApi)
            .business_id(&business_id)
            .min_role(Role::Member)
            .build()
    );

    if params.content.trim().is_empty() {
        return common::ConsoleException::handle_illegal_argument_exception(
            "insight content cannot be empty".to_string(),
        );
    }

    match memory::add_insight(
        data.db(),
        &business_id,
        params.content.trim(),
        params.score.unwrap_or(1.0),
    )
    .await
    {
        Ok(()) => common::Result::<String>::http_success("add insight ok!"),
        Err(e) => handle_service_error(req.path(), e),
    }
}

#[get("/businesses/{business_id}/memory/preferences")]
async fn list_preferences(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> impl Responder {
    let business_id = path.into_inner();
    secured!(
        Secured::builder(&req, &data, "memory")
            .action(ActionTypes::Read)
            .api_type(ApiType::BusinessApi)
            .business_id(&business_id)
            .min_role(Role::Member)
            .build()
    );

    match memory::list_preferences(data.db(), &business_id).await {
        Ok(preferences) => common::Result::<()>::http_success(preferences),
        Err(e) => handle_service_error(req.path(), e),
    }
}

#[put("/businesses/{business_id}/memory/preferences")]
async fn set_preference(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<String>,
    params: web::Form<PreferenceFormData>,
) -> impl Responder {
    let business_id = path.into_inner();
    secured!(
        Secured::builder(&req, &data, "memory")
            .action(ActionTypes::Write)
            .api_type(ApiType::BusinessApi)
            .business_id(&business_id)
            .min_role(Role::Member)
            .build()
    );

    match memory::set_preference(data.db(), &business_id, &params.key, &params.value).await {
        Ok(()) => common::Result::<String>::http_success("set preference ok!"),
        Err(e) => handle_service_error(req.path(), e),
    }
}

#[delete("/businesses/{business_id}/memory/preferences")]
async fn delete_preference(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<String>,
    params: web::Query<PreferenceParam>,
) -> impl Responder {
    let business_id = path.into_inner();
    secured!(
        Secured::builder(&req, &data, "memory")
            .action(ActionTypes::Write)
            .api_type(ApiType::BusinessApi)
            .business_id(&business_id)
            .min_role(Role::Member)
            .build()
    );

    match memory::delete_preference(data.db(), &business_id, &params.key).await {
        Ok(()) => common::Result::<String>::http_success("delete preference ok!"),
        Err(e) => handle_service_error(req.path(), e),
    }
}
