pub mod api;
pub mod auth;
pub mod health;

use actix_web::{http::StatusCode, web, HttpRequest, HttpResponse};
use serde::Serialize;

use crate::auth::AuthMiddleware;
use crate::error::AppError;
use crate::service::AuthService;

/// Mounts the gateway: `/health`, the public `/auth` endpoints and the
/// bearer-protected `/api` scope.
pub fn config(service: web::Data<AuthService>) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        let guard = AuthMiddleware::new(service.clone().into_inner());

        cfg.app_data(service)
            .app_data(json_config())
            .service(health::health)
            .service(
                web::scope("/auth")
                    .service(auth::sign_up)
                    .service(auth::token)
                    .service(auth::refresh)
                    .service(auth::reset_password)
                    .service(auth::confirm_sign_up),
            )
            .service(web::scope("/api").wrap(guard).service(api::me));
    }
}

/// Fallback for unknown routes.
pub async fn not_found(req: HttpRequest) -> Result<HttpResponse, AppError> {
    Err(AppError::NotFound(format!("no route for {} {}", req.method(), req.path())))
}

/// Unparsable bodies get the same envelope as failed validation.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        AppError::Validation(format!("invalid request body: {}", err)).into()
    })
}

/// Writes an envelope with its status as the HTTP status.
fn envelope<T: Serialize>(status: u16, body: &T) -> HttpResponse {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    HttpResponse::build(status).json(body)
}
