use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use std::rc::Rc;
use std::sync::Arc;

use crate::error::AppError;
use crate::service::AuthService;

/// Requires a valid bearer access token and stores its `TokenPayload` in the
/// request extensions. Wrap only the scopes that need it.
///
/// Rejections are answered here with the error envelope; the inner service is not called.
#[derive(Clone)]
pub struct AuthMiddleware {
    auth: Arc<AuthService>,
}

impl AuthMiddleware {
    pub fn new(auth: Arc<AuthService>) -> Self {
        Self { auth }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
            auth: Arc::clone(&self.auth),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
    auth: Arc<AuthService>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let bearer = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty());

        let token = match bearer {
            Some(token) => token,
            None => {
                let app_err = AppError::Unauthorized("missing bearer token".into());
                return reject(req, app_err);
            }
        };

        match self.auth.verify_access_token(token) {
            Ok(payload) => {
                req.extensions_mut().insert(payload);
                let service = Rc::clone(&self.service);
                Box::pin(async move {
                    service
                        .call(req)
                        .await
                        .map(ServiceResponse::map_into_left_body)
                })
            }
            Err(token_err) => {
                log::warn!(
                    "{} {}: access token rejected: {}",
                    req.method(),
                    req.path(),
                    token_err
                );
                reject(req, AppError::Token(token_err))
            }
        }
    }
}

fn reject<B: 'static>(
    req: ServiceRequest,
    error: AppError,
) -> LocalBoxFuture<'static, Result<ServiceResponse<EitherBody<B>>, Error>> {
    let response = req.error_response(error).map_into_right_body();
    Box::pin(async move { Ok(response) })
}
