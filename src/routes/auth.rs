//! Thin HTTP bindings for the auth service. The service validates and answers;
//! these handlers only move envelopes on and off the wire.

use actix_web::{post, web, Responder};

use super::envelope;
use crate::auth::{
    ConfirmSignUpRequest, RefreshRequest, ResetPasswordRequest, SignUpRequest, TokenRequest,
};
use crate::service::AuthService;

/// Register a new user. No tokens are returned.
#[post("/sign-up")]
pub async fn sign_up(
    auth: web::Data<AuthService>,
    body: web::Json<SignUpRequest>,
) -> impl Responder {
    let response = auth.sign_up(body.into_inner()).await;
    envelope(response.status, &response)
}

/// Exchange email and password for an access/refresh token pair.
#[post("/token")]
pub async fn token(auth: web::Data<AuthService>, body: web::Json<TokenRequest>) -> impl Responder {
    let response = auth.token(body.into_inner()).await;
    envelope(response.meta.status, &response)
}

/// Exchange a refresh token for a new access token.
#[post("/refresh")]
pub async fn refresh(
    auth: web::Data<AuthService>,
    body: web::Json<RefreshRequest>,
) -> impl Responder {
    let response = auth.refresh(body.into_inner()).await;
    envelope(response.meta.status, &response)
}

#[post("/reset-password")]
pub async fn reset_password(
    auth: web::Data<AuthService>,
    body: web::Json<ResetPasswordRequest>,
) -> impl Responder {
    let response = auth.reset_password(body.into_inner()).await;
    envelope(response.status, &response)
}

#[post("/confirm-sign-up")]
pub async fn confirm_sign_up(
    auth: web::Data<AuthService>,
    body: web::Json<ConfirmSignUpRequest>,
) -> impl Responder {
    let response = auth.confirm_sign_up(body.into_inner()).await;
    envelope(response.status, &response)
}
