use actix_web::{HttpRequest, HttpResponse, Responder, delete, get, post, put, web};
use serde::Deserialize;

use greenline_auth::model::{ONLY_IDENTITY, UPDATE_PASSWORD_ENTRY_POINT, User};
use greenline_auth::service::user;
use greenline_common::error::GreenLineError;
use greenline_persistence::Page;

use crate::model::common::{self, AppState};
use crate::secured::current_username;
use crate::{ActionTypes, ApiType, Secured, secured};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchPageParam {
    search: Option<String>,
    username: Option<String>,
    page_no: u64,
    page_size: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserParam {
    username: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateFormData {
    username: String,
    email: String,
    password: String,
    display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdatePasswordFormData {
    username: String,
    new_password: String,
}

#[get("/auth/user/list")]
async fn search_page(
    req: HttpRequest,
    data: web::Data<AppState>,
    params: web::Query<SearchPageParam>,
) -> impl Responder {
    secured!(
        Secured::builder(&req, &data, "console/users")
            .action(ActionTypes::Read)
            .api_type(ApiType::ConsoleApi)
            .build()
    );

    let accurate = params.search.clone().unwrap_or_default() == "accurate";
    let mut username = params.username.clone().unwrap_or_default();

    if let Some(stripped) = username.strip_prefix("*") {
        username = stripped.to_string();
    }
    if let Some(stripped) = username.strip_suffix("*") {
        username = stripped.to_string();
    }

    let result = match user::search_page(
        data.db(),
        &username,
        params.page_no,
        params.page_size,
        accurate,
    )
    .await
    {
        Ok(page) => page,
        Err(e) => {
            tracing::error!("Failed to search users: {}", e);
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "code": 500,
                "message": "Failed to search users from database",
                "data": null
            }));
        }
    };

    common::Result::<Page<User>>::http_success(result)
}

#[post("/auth/user")]
async fn create(
    req: HttpRequest,
    data: web::Data<AppState>,
    params: web::Form<CreateFormData>,
) -> impl Responder {
    secured!(
        Secured::builder(&req, &data, "console/users")
            .action(ActionTypes::Write)
            .api_type(ApiType::ConsoleApi)
            .build()
    );

    if params.username.is_empty() || params.password.is_empty() || params.email.is_empty() {
        return common::ConsoleException::handle_illegal_argument_exception(
            "username, email and password cann't be empty".to_string(),
        );
    }

    let existing = match user::find_by_username(data.db(), &params.username).await {
        Ok(u) => u,
        Err(e) => {
            tracing::error!("Failed to check if user '{}' exists: {}", params.username, e);
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "code": 500,
                "message": "Failed to check user existence in database",
                "data": null
            }));
        }
    };

    if existing.is_some() {
        return common::ConsoleException::handle_illegal_argument_exception(format!(
            "user '{}' already exist!",
            params.username
        ));
    }

    let result = user::create(
        data.db(),
        &params.username,
        &params.email,
        &params.password,
        params.display_name.clone(),
    )
    .await;

    match result {
        Ok(()) => common::Result::<String>::http_success("create user ok!"),
        Err(err) => common::ConsoleException::handle_exception(
            req.uri().path().to_string(),
            err.to_string(),
        ),
    }
}

#[put("/auth/user/password")]
async fn update_password(
    req: HttpRequest,
    data: web::Data<AppState>,
    params: web::Form<UpdatePasswordFormData>,
) -> impl Responder {
    secured!(
        Secured::builder(&req, &data, UPDATE_PASSWORD_ENTRY_POINT)
            .action(ActionTypes::Write)
            .api_type(ApiType::ConsoleApi)
            .tags(vec![ONLY_IDENTITY.to_string()])
            .build()
    );

    // Non-admins may only change their own password
    let operator = current_username(&req);
    if operator != params.username {
        let is_admin = user::find_by_username(data.db(), &operator)
            .await
            .ok()
            .flatten()
            .map(|p| p.global_admin != 0)
            .unwrap_or(false);
        if !is_admin {
            return common::ConsoleException::handle_access_exception(
                "cannot change another user's password".to_string(),
            );
        }
    }

    let result = user::update_password(data.db(), &params.username, &params.new_password).await;

    match result {
        Ok(()) => common::Result::<String>::http_success("update user ok!"),
        Err(err) => {
            let code = match err.downcast_ref() {
                Some(GreenLineError::UserNotExist(_)) => 400,
                _ => 500,
            };

            HttpResponse::InternalServerError().json(common::Result::<String> {
                code,
                message: err.to_string(),
                data: err.to_string(),
            })
        }
    }
}

#[delete("/auth/user")]
async fn delete(
    req: HttpRequest,
    data: web::Data<AppState>,
    params: web::Query<UserParam>,
) -> impl Responder {
    secured!(
        Secured::builder(&req, &data, "console/users")
            .action(ActionTypes::Write)
            .api_type(ApiType::ConsoleApi)
            .build()
    );

    let target_is_admin = user::find_by_username(data.db(), &params.username)
        .await
        .ok()
        .flatten()
        .map(|p| p.global_admin != 0)
        .unwrap_or(false);

    if target_is_admin {
        return HttpResponse::BadRequest().json(common::Result::<String> {
            code: 400,
            message: format!("cannot delete admin: {}", &params.username),
            data: format!("cannot delete admin: {}", &params.username),
        });
    }

    let result = user::delete(data.db(), &params.username).await;

    match result {
        Ok(()) => common::Result::<String>::http_success("delete user ok!"),
        Err(err) => {
            let code = match err.downcast_ref() {
                Some(GreenLineError::UserNotExist(_)) => 400,
                _ => 500,
            };

            HttpResponse::InternalServerError().json(common::Result::<String> {
                code,
                message: err.to_string(),
                data: err.to_string(),
            })
        }
    }
}
