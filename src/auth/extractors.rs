use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::auth::token::TokenPayload;
use crate::error::AppError;

/// The validated access-token payload of the current request.
///
/// Only available on routes wrapped by `AuthMiddleware`; anywhere else extraction
/// fails with `AppError::Unauthorized`.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub TokenPayload);

impl FromRequest for AuthenticatedUser {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<TokenPayload>().cloned() {
            Some(payload) => ready(Ok(AuthenticatedUser(payload))),
            None => {
                let err = AppError::Unauthorized("authentication required".to_string());
                ready(Err(err.into()))
            }
        }
    }
}
