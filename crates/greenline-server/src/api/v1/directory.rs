use actix_web::{HttpRequest, Responder, delete, get, post, put, web};
use serde::Deserialize;

use greenline_auth::model::Role;
use greenline_core::service::{audit, business, directory, storage};

use crate::model::common::{self, AppState};
use crate::model::response::handle_service_error;
use crate::secured::{current_username, source_ip};
use crate::{ActionTypes, ApiType, Secured, secured};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FlagFormData {
    value: bool,
}

/// Photo additions are charged against the storage quota before the
/// listing write goes through.
async fn check_photo_quota(
    data: &web::Data<AppState>,
    business_id: &str,
    tier: greenline_common::Tier,
    new_photo_count: usize,
    old_photo_count: usize,
) -> anyhow::Result<()> {
    let added = new_photo_count.saturating_sub(old_photo_count) as i64;
    if added == 0 {
        return Ok(());
    }

    let bytes = added * storage::ESTIMATED_PHOTO_BYTES;
    storage::check_quota(data.db(), business_id, tier, bytes).await?;
    storage::record_usage(data.db(), business_id, "photo", bytes).await?;
    Ok(())
}

#[get("/businesses/{business_id}/listings")]
async fn list(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> impl Responder {
    let business_id = path.into_inner();
    secured!(
        Secured::builder(&req, &data, "listings")
            .action(ActionTypes::Read)
            .api_type(ApiType::BusinessApi)
            .business_id(&business_id)
            .min_role(Role::Member)
            .build()
    );

    match directory::list_by_business(data.db(), &business_id).await {
        Ok(listings) => common::Result::<()>::http_success(listings),
        Err(e) => handle_service_error(req.path(), e),
    }
}

#[post("/businesses/{business_id}/listings")]
async fn create(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<String>,
    params: web::Json<directory::ListingParams>,
) -> impl Responder {
    let business_id = path.into_inner();
    secured!(
        Secured::builder(&req, &data, "listings")
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

    let params = params.into_inner();
    let photo_count = params.photos.as_ref().map(|p| p.len()).unwrap_or(0);
    if let Err(e) = check_photo_quota(&data, &business_id, tier, photo_count, 0).await {
        return handle_service_error(req.path(), e);
    }

    match directory::create(data.db(), &business_id, tier, params).await {
        Ok(listing) => {
            audit::log_operation_best_effort(
                data.db(),
                audit::AuditLogEntry::builder()
                    .operation(audit::operation::CREATE)
                    .resource_type(audit::resource::LISTING)
                    .resource_id(&listing.id)
                    .business_id(&business_id)
                    .operator(current_username(&req))
                    .source_ip(source_ip(&req).unwrap_or_default())
                    .success()
                    .build(),
            )
            .await;
            common::Result::<()>::http_success(listing)
        }
        Err(e) => handle_service_error(req.path(), e),
    }
}

#[get("/businesses/{business_id}/listings/{listing_id}")]
async fn get(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> impl Responder {
    let (business_id, listing_id) = path.into_inner();
    secured!(
        Secured::builder(&req, &data, "listings")
            .action(ActionTypes::Read)
            .api_type(ApiType::BusinessApi)
            .business_id(&business_id)
            .min_role(Role::Member)
            .build()
    );

    match directory::get(data.db(), &business_id, &listing_id).await {
        Ok(listing) => common::Result::<()>::http_success(listing),
        Err(e) => handle_service_error(req.path(), e),
    }
}

#[put("/businesses/{business_id}/listings/{listing_id}")]
async fn update(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<(String, String)>,
    params: web::Json<directory::ListingParams>,
) -> impl Responder {
    let (business_id, listing_id) = path.into_inner();
    secured!(
        Secured::builder(&req, &data, "listings")
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

    let params = params.into_inner();
    if let Some(ref photos) = params.photos {
        let old_count = match directory::get(data.db(), &business_id, &listing_id).await {
            Ok(existing) => existing.photos.len(),
            Err(e) => return handle_service_error(req.path(), e),
        };
        if let Err(e) =
            check_photo_quota(&data, &business_id, tier, photos.len(), old_count).await
        {
            return handle_service_error(req.path(), e);
        }
    }

    match directory::update(data.db(), &business_id, &listing_id, tier, params).await {
        Ok(listing) => {
            audit::log_operation_best_effort(
                data.db(),
                audit::AuditLogEntry::builder()
                    .operation(audit::operation::UPDATE)
                    .resource_type(audit::resource::LISTING)
                    .resource_id(&listing_id)
                    .business_id(&business_id)
                    .operator(current_username(&req))
                    .source_ip(source_ip(&req).unwrap_or_default())
                    .success()
                    .build(),
            )
            .await;
            common::Result::<()>::http_success(listing)
        }
        Err(e) => handle_service_error(req.path(), e),
    }
}

#[delete("/businesses/{business_id}/listings/{listing_id}")]
async fn delete(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> impl Responder {
    let (business_id, listing_id) = path.into_inner();
    secured!(
        Secured::builder(&req, &data, "listings")
            .action(ActionTypes::Write)
            .api_type(ApiType::BusinessApi)
            .business_id(&business_id)
            .min_role(Role::Admin)
            .build()
    );

    match directory::delete(data.db(), &business_id, &listing_id).await {
        Ok(()) => {
            audit::log_operation_best_effort(
                data.db(),
                audit::AuditLogEntry::builder()
                    .operation(audit::operation::DELETE)
                    .resource_type(audit::resource::LISTING)
                    .resource_id(&listing_id)
                    .business_id(&business_id)
                    .operator(current_username(&req))
                    .source_ip(source_ip(&req).unwrap_or_default())
                    .success()
                    .build(),
            )
            .await;
            common::Result::<String>::http_success("delete listing ok!")
        }
        Err(e) => handle_service_error(req.path(), e),
    }
}

#[put("/businesses/{business_id}/listings/{listing_id}/publish")]
async fn publish(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<(String, String)>,
    params: web::Form<FlagFormData>,
) -> impl Responder {
    let (business_id, listing_id) = path.into_inner();
    secured!(
        Secured::builder(&req, &data, "listings")
            .action(ActionTypes::Write)
            .api_type(ApiType::BusinessApi)
            .business_id(&business_id)
            .min_role(Role::Admin)
            .build()
    );

    match directory::set_published(data.db(), &business_id, &listing_id, params.value).await {
        Ok(()) => {
            audit::log_operation_best_effort(
                data.db(),
                audit::AuditLogEntry::builder()
                    .operation(audit::operation::PUBLISH)
                    .resource_type(audit::resource::LISTING)
                    .resource_id(&listing_id)
                    .business_id(&business_id)
                    .operator(current_username(&req))
                    .source_ip(source_ip(&req).unwrap_or_default())
                    .details(format!("published={}", params.value))
                    .success()
                    .build(),
            )
            .await;
            common::Result::<String>::http_success("update listing ok!")
        }
        Err(e) => handle_service_error(req.path(), e),
    }
}

#[put("/businesses/{business_id}/listings/{listing_id}/feature")]
async fn feature(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<(String, String)>,
    params: web::Form<FlagFormData>,
) -> impl Responder {
    let (business_id, listing_id) = path.into_inner();
    secured!(
        Secured::builder(&req, &data, "listings")
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

    match directory::set_featured(data.db(), &business_id, &listing_id, tier, params.value).await {
        Ok(()) => common::Result::<String>::http_success("update listing ok!"),
        Err(e) => handle_service_error(req.path(), e),
    }
}
