use actix_web::{HttpRequest, Responder, get, post, put, web};

use greenline_auth::model::Role;
use greenline_core::service::{audit, business, coupons, events as event_service};
use greenline_persistence::entity::platform_events;

use crate::model::common::{self, AppState};
use crate::model::response::handle_service_error;
use crate::secured::{current_username, source_ip};
use crate::{ActionTypes, ApiType, Secured, secured};

#[get("/businesses/{business_id}/coupons")]
async fn list(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> impl Responder {
    let business_id = path.into_inner();
    secured!(
        Secured::builder(&req, &data, "coupons")
            .action(ActionTypes::Read)
            .api_type(ApiType::BusinessApi)
            .business_id(&business_id)
            .min_role(Role::Member)
            .build()
    );

    match coupons::list_by_business(data.db(), &business_id).await {
        Ok(list) => common::Result::<()>::http_success(list),
        Err(e) => handle_service_error(req.path(), e),
    }
}

#[post("/businesses/{business_id}/coupons")]
async fn create(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<String>,
    params: web::Json<coupons::CreateCoupon>,
) -> impl Responder {
    let business_id = path.into_inner();
    secured!(
        Secured::builder(&req, &data, "coupons")
            .action(ActionTypes::Write)
            .api_type(ApiType::BusinessApi)
            .business_id(&business_id)
            .min_role(Role::Admin)
            .build()
    );

    match coupons::create(data.db(), &business_id, params.into_inner()).await {
        Ok(coupon) => {
            audit::log_operation_best_effort(
                data.db(),
                audit::AuditLogEntry::builder()
                    .operation(audit::operation::CREATE)
                    .resource_type(audit::resource::COUPON)
                    .resource_id(&coupon.id)
                    .business_id(&business_id)
                    .operator(current_username(&req))
                    .source_ip(source_ip(&req).unwrap_or_default())
                    .success()
                    .build(),
            )
            .await;
            common::Result::<()>::http_success(coupon)
        }
        Err(e) => handle_service_error(req.path(), e),
    }
}

#[get("/businesses/{business_id}/coupons/{coupon_id}")]
async fn get(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> impl Responder {
    let (business_id, coupon_id) = path.into_inner();
    secured!(
        Secured::builder(&req, &data, "coupons")
            .action(ActionTypes::Read)
            .api_type(ApiType::BusinessApi)
            .business_id(&business_id)
            .min_role(Role::Member)
            .build()
    );

    match coupons::get(data.db(), &business_id, &coupon_id).await {
        Ok(coupon) => common::Result::<()>::http_success(coupon),
        Err(e) => handle_service_error(req.path(), e),
    }
}

#[put("/businesses/{business_id}/coupons/{coupon_id}")]
async fn update(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<(String, String)>,
    params: web::Json<coupons::UpdateCoupon>,
) -> impl Responder {
    let (business_id, coupon_id) = path.into_inner();
    secured!(
        Secured::builder(&req, &data, "coupons")
            .action(ActionTypes::Write)
            .api_type(ApiType::BusinessApi)
            .business_id(&business_id)
            .min_role(Role::Admin)
            .build()
    );

    match coupons::update(data.db(), &business_id, &coupon_id, params.into_inner()).await {
        Ok(coupon) => {
            audit::log_operation_best_effort(
                data.db(),
                audit::AuditLogEntry::builder()
                    .operation(audit::operation::UPDATE)
                    .resource_type(audit::resource::COUPON)
                    .resource_id(&coupon_id)
                    .business_id(&business_id)
                    .operator(current_username(&req))
                    .source_ip(source_ip(&req).unwrap_or_default())
                    .success()
                    .build(),
            )
            .await;
            common::Result::<()>::http_success(coupon)
        }
        Err(e) => handle_service_error(req.path(), e),
    }
}

/// Activation is limited by the tier's active-coupon cap
#[put("/businesses/{business_id}/coupons/{coupon_id}/activate")]
async fn activate(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> impl Responder {
    let (business_id, coupon_id) = path.into_inner();
    secured!(
        Secured::builder(&req, &data, "coupons")
            .action(ActionTypes::Write)
            .api_type(ApiType::BusinessApi)
            .business_id(&business_id)
            .min_role(Role::Admin)
            .build()
    );

    let tier = match business::find_tier(data.db(), &business_id).await {
        Ok(t) => t,
        Err(e) => return handle_service_error(req.path(), e),
    };

    match coupons::activate(data.db(), &business_id, &coupon_id, tier).await {
        Ok(coupon) => {
            event_service::record_best_effort(
                data.db(),
                platform_events::event_type::COUPON_ACTIVATED,
                Some(business_id.as_str()),
                &current_username(&req),
                Some(&serde_json::json!({"couponId": coupon.id, "code": coupon.code})),
            )
            .await;
            audit::log_operation_best_effort(
                data.db(),
                audit::AuditLogEntry::builder()
                    .operation(audit::operation::ACTIVATE)
                    .resource_type(audit::resource::COUPON)
                    .resource_id(&coupon.id)
                    .business_id(&business_id)
                    .operator(current_username(&req))
                    .source_ip(source_ip(&req).unwrap_or_default())
                    .success()
                    .build(),
            )
            .await;
            common::Result::<()>::http_success(coupon)
        }
        Err(e) => handle_service_error(req.path(), e),
    }
}

#[put("/businesses/{business_id}/coupons/{coupon_id}/archive")]
async fn archive(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> impl Responder {
    let (business_id, coupon_id) = path.into_inner();
    secured!(
        Secured::builder(&req, &data, "coupons")
            .action(ActionTypes::Write)
            .api_type(ApiType::BusinessApi)
            .business_id(&business_id)
            .min_role(Role::Admin)
            .build()
    );

    match coupons::archive(data.db(), &business_id, &coupon_id).await {
        Ok(()) => common::Result::<String>::http_success("archive coupon ok!"),
        Err(e) => handle_service_error(req.path(), e),
    }
}
