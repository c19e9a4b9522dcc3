#![allow(dead_code)]

use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::test;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use taskforge_auth::auth::{Clock, PasswordHasher, RsaCredentials, SystemClock};
use taskforge_auth::repository::{InMemoryUserRepository, UserRepository};
use taskforge_auth::service::{AuthService, AuthServiceConfig};

pub const ACCESS_PRIVATE: &str = include_str!("../fixtures/access_private.pem");
pub const ACCESS_PUBLIC: &str = include_str!("../fixtures/access_public.pem");
pub const REFRESH_PRIVATE: &str = include_str!("../fixtures/refresh_private.pem");
pub const REFRESH_PUBLIC: &str = include_str!("../fixtures/refresh_public.pem");

pub const ACCESS_TTL: Duration = Duration::from_secs(15 * 60);
pub const REFRESH_TTL: Duration = Duration::from_secs(24 * 60 * 60);

pub fn access_credentials() -> RsaCredentials {
    RsaCredentials::from_pem(
        "access",
        ACCESS_PRIVATE.as_bytes(),
        ACCESS_PUBLIC.as_bytes(),
        ACCESS_TTL,
    )
    .expect("access fixture keys")
}

pub fn refresh_credentials() -> RsaCredentials {
    RsaCredentials::from_pem(
        "refresh",
        REFRESH_PRIVATE.as_bytes(),
        REFRESH_PUBLIC.as_bytes(),
        REFRESH_TTL,
    )
    .expect("refresh fixture keys")
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap() = now;
    }

    pub fn advance(&self, by: chrono::Duration) {
        *self.now.lock().unwrap() += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

/// A service over the given repository and clock, with the cheapest bcrypt cost.
pub fn service_with(users: Arc<dyn UserRepository>, clock: Arc<dyn Clock>) -> AuthService {
    AuthService::new(AuthServiceConfig {
        users,
        access_credentials: access_credentials(),
        refresh_credentials: refresh_credentials(),
        hasher: PasswordHasher::new(4).expect("bcrypt cost 4"),
        clock,
        request_timeout: Duration::from_secs(5),
    })
    .expect("auth service")
}

pub fn service() -> AuthService {
    service_with(Arc::new(InMemoryUserRepository::new()), Arc::new(SystemClock))
}

/// Builds the full gateway app around an `AuthService`.
#[macro_export]
macro_rules! test_app {
    ($service:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .wrap(actix_web::middleware::Logger::default())
                .configure(taskforge_auth::routes::config($service.clone()))
                .default_service(actix_web::web::to(taskforge_auth::routes::not_found)),
        )
        .await
    };
}

/// Sends a request and returns the status and the JSON body (`Null` if empty).
pub async fn send<S, B>(app: &S, req: actix_http::Request) -> (StatusCode, Value)
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let resp = test::call_service(app, req).await;
    let status = resp.status();
    let body = test::read_body(resp).await;
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

pub async fn post_json<S, B>(app: &S, uri: &str, body: &Value) -> (StatusCode, Value)
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri(uri)
        .set_json(body)
        .to_request();
    send(app, req).await
}

pub async fn get_with_bearer<S, B>(app: &S, uri: &str, token: Option<&str>) -> (StatusCode, Value)
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let mut req = test::TestRequest::get().uri(uri);
    if let Some(token) = token {
        req = req.insert_header(("Authorization", format!("Bearer {}", token)));
    }
    send(app, req.to_request()).await
}
