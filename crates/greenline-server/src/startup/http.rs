//! HTTP server setup module.

use std::sync::Arc;

use actix_web::{App, HttpServer, dev::Server, middleware::Logger, web};

use crate::{api, middleware::auth::Authentication, model::common::AppState};

/// Creates and binds the HTTP server.
///
/// One server carries the whole surface: session auth, business APIs,
/// the platform console, vendor webhooks, and the public directory.
pub fn http_server(
    app_state: Arc<AppState>,
    context_path: String,
    address: String,
    port: u16,
) -> Result<Server, std::io::Error> {
    Ok(HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(Authentication)
            .app_data(web::Data::from(app_state.clone()))
            .service(web::scope(&context_path).service(api::v1::route::routes()))
    })
    .bind((address, port))?
    .run())
}
