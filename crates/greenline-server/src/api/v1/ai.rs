use actix_web::{HttpRequest, Responder, get, post, web};
use serde::Deserialize;

use greenline_auth::model::{ONLY_IDENTITY, Role};
use greenline_core::service::chat as chat_service;

use crate::model::common::{self, AppState};
use crate::model::response::handle_service_error;
use crate::secured::current_username;
use crate::{ActionTypes, ApiType, Secured, Tier, secured};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChatRequest {
    message: String,
    skill: Option<String>,
}

/// AI chat with memory-bucket context, tier2+
#[post("/businesses/{business_id}/ai/chat")]
async fn chat(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<String>,
    params: web::Json<ChatRequest>,
) -> impl Responder {
    let business_id = path.into_inner();
    secured!(
        Secured::builder(&req, &data, "ai")
            .action(ActionTypes::Write)
            .api_type(ApiType::BusinessApi)
            .business_id(&business_id)
            .min_role(Role::Member)
            .min_tier(Tier::Tier2)
            .build()
    );

    let result = chat_service::run_chat(
        data.db(),
        &data.llm,
        &data.skills,
        &business_id,
        &current_username(&req),
        params.skill.as_deref(),
        &params.message,
    )
    .await;

    match result {
        Ok(reply) => common::Result::<()>::http_success(reply),
        Err(e) => handle_service_error(req.path(), e),
    }
}

/// Available marketing skill names
#[get("/ai/skills")]
async fn list_skills(req: HttpRequest, data: web::Data<AppState>) -> impl Responder {
    secured!(
        Secured::builder(&req, &data, "ai/skills")
            .action(ActionTypes::Read)
            .api_type(ApiType::BusinessApi)
            .tags(vec![ONLY_IDENTITY.to_string()])
            .build()
    );

    common::Result::<()>::http_success(data.skills.names())
}
