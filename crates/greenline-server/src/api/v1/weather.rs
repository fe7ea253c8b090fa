use actix_web::{HttpRequest, Responder, get, put, web};
use serde::Deserialize;

use greenline_auth::model::Role;
use greenline_core::service::{audit, weather};

use crate::model::common::{self, AppState};
use crate::model::response::handle_service_error;
use crate::secured::{current_username, source_ip};
use crate::{ActionTypes, ApiType, Secured, Tier, secured};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListParam {
    include_acknowledged: Option<bool>,
}

#[get("/businesses/{business_id}/weather/alerts")]
async fn list_alerts(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<String>,
    params: web::Query<ListParam>,
) -> impl Responder {
    let business_id = path.into_inner();
    secured!(
        Secured::builder(&req, &data, "weather")
            .action(ActionTypes::Read)
            .api_type(ApiType::BusinessApi)
            .business_id(&business_id)
            .min_role(Role::Member)
            .min_tier(Tier::Tier2)
            .build()
    );

    let result = weather::list_alerts(
        data.db(),
        &business_id,
        params.include_acknowledged.unwrap_or(false),
    )
    .await;

    match result {
        Ok(alerts) => common::Result::<()>::http_success(alerts),
        Err(e) => handle_service_error(req.path(), e),
    }
}

#[put("/businesses/{business_id}/weather/alerts/{alert_id}/ack")]
async fn acknowledge(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<(String, u64)>,
) -> impl Responder {
    let (business_id, alert_id) = path.into_inner();
    secured!(
        Secured::builder(&req, &data, "weather")
            .action(ActionTypes::Write)
            .api_type(ApiType::BusinessApi)
            .business_id(&business_id)
            .min_role(Role::Member)
            .min_tier(Tier::Tier2)
            .build()
    );

    match weather::acknowledge(data.db(), &business_id, alert_id).await {
        Ok(()) => {
            audit::log_operation_best_effort(
                data.db(),
                audit::AuditLogEntry::builder()
                    .operation(audit::operation::ACKNOWLEDGE)
                    .resource_type(audit::resource::WEATHER_ALERT)
                    .resource_id(alert_id.to_string())
                    .business_id(&business_id)
                    .operator(current_username(&req))
                    .source_ip(source_ip(&req).unwrap_or_default())
                    .success()
                    .build(),
            )
            .await;
            common::Result::<String>::http_success("acknowledge alert ok!")
        }
        Err(e) => handle_service_error(req.path(), e),
    }
}
