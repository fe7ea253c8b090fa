use actix_web::{HttpRequest, HttpResponse, Responder, post, web};
use serde::{Deserialize, Serialize};

use greenline_auth::model::USER_NOT_FOUND_MESSAGE;
use greenline_auth::service::{token, user};
use greenline_core::service::audit;

use crate::model::common::AppState;
use crate::secured::source_ip;

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginResult {
    access_token: String,
    token_ttl: i64,
    global_admin: bool,
    username: String,
}

#[derive(Deserialize)]
struct LoginData {
    username: Option<String>,
    password: Option<String>,
}

#[post("/auth/login")]
async fn login(
    req: HttpRequest,
    data: web::Data<AppState>,
    form: Option<web::Form<LoginData>>,
    query: Option<web::Query<LoginData>>,
) -> impl Responder {
    let mut username: String = "".to_string();
    let mut password: String = "".to_string();

    // Web clients post a form; service clients may use query params.
    // Form values win when both are present.
    if let Some(query_data) = &query {
        if let Some(v) = &query_data.username {
            username = v.to_string();
        }
        if let Some(v) = &query_data.password {
            password = v.to_string();
        }
    }
    if let Some(form_data) = &form {
        if let Some(v) = &form_data.username
            && !v.is_empty()
        {
            username = v.to_string();
        }
        if let Some(v) = &form_data.password
            && !v.is_empty()
        {
            password = v.to_string();
        }
    }

    if username.is_empty() || password.is_empty() {
        return HttpResponse::Forbidden().body(USER_NOT_FOUND_MESSAGE);
    }

    let authenticated = match user::authenticate(data.db(), &username, &password).await {
        Ok(u) => u,
        Err(e) => {
            tracing::error!("Failed to authenticate '{}': {}", username, e);
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "code": 500,
                "message": "Failed to check credentials",
                "data": null
            }));
        }
    };

    let Some(account) = authenticated else {
        audit::log_operation_best_effort(
            data.db(),
            audit::AuditLogEntry::builder()
                .operation(audit::operation::LOGIN)
                .resource_type(audit::resource::USER)
                .resource_id(&username)
                .operator(&username)
                .source_ip(source_ip(&req).unwrap_or_default())
                .failure("bad credentials")
                .build(),
        )
        .await;
        return HttpResponse::Forbidden().body(USER_NOT_FOUND_MESSAGE);
    };

    let secret_key = data.configuration.token_secret_key();
    let token_ttl = data.configuration.token_expire_seconds();

    let access_token = match token::encode_session_token(&account.username, &secret_key, token_ttl)
    {
        Ok(t) => t,
        Err(e) => {
            tracing::error!("Failed to encode session token: {}", e);
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "code": 500,
                "message": "Failed to issue session token",
                "data": null
            }));
        }
    };

    audit::log_operation_best_effort(
        data.db(),
        audit::AuditLogEntry::builder()
            .operation(audit::operation::LOGIN)
            .resource_type(audit::resource::USER)
            .resource_id(&account.username)
            .operator(&account.username)
            .source_ip(source_ip(&req).unwrap_or_default())
            .success()
            .build(),
    )
    .await;

    HttpResponse::Ok().json(LoginResult {
        access_token,
        token_ttl,
        global_admin: account.global_admin,
        username: account.username,
    })
}
