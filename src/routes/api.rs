use actix_web::{get, HttpResponse, Responder};
use serde_json::json;

use crate::auth::AuthenticatedUser;

/// Returns the identity carried by the caller's access token.
#[get("/me")]
pub async fn me(user: AuthenticatedUser) -> impl Responder {
    let AuthenticatedUser(payload) = user;
    HttpResponse::Ok().json(json!({
        "status": 200,
        "user_id": payload.user_id,
        "email": payload.email,
        "token_id": payload.token_id,
    }))
}
