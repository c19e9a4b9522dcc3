//!
//! # Custom Error Handling
//!
//! This module defines the error type `AppError` shared by the auth service and the
//! HTTP gateway. Every variant maps to exactly one envelope status and one public
//! message; the detail carried by `Internal` is for the server log only.
//!
//! `AppError` implements `actix_web::error::ResponseError` so guards and extractors can
//! fail with it directly, and provides `From` conversions for `validator`, `bcrypt`,
//! repository and token errors so the flows can use the `?` operator.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use validator::ValidationErrors;

use crate::auth::token::TokenError;
use crate::repository::RepositoryError;
use crate::service::Response;

/// Represents all failure kinds an auth flow or gateway request can end in.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Malformed or out-of-constraint input (HTTP 400).
    #[error("validation error: {0}")]
    Validation(String),
    /// A lookup missed (HTTP 404).
    #[error("not found: {0}")]
    NotFound(String),
    /// A uniqueness rule was violated, e.g. the email is already registered (HTTP 400).
    #[error("conflict: {0}")]
    Conflict(String),
    /// Email/password pair did not authenticate (HTTP 400).
    /// The message never says which half was wrong.
    #[error("invalid credentials")]
    InvalidCredentials,
    /// No bearer credential was presented (HTTP 401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// A presented token was rejected (HTTP 403).
    #[error("token rejected: {0}")]
    Token(#[from] TokenError),
    /// Hashing, signing, repository or deadline failure (HTTP 500).
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::Conflict(_) | AppError::InvalidCredentials => {
                StatusCode::BAD_REQUEST
            }
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Token(_) => StatusCode::FORBIDDEN,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message a caller is allowed to see.
    pub fn public_message(&self) -> String {
        match self {
            AppError::Validation(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg)
            | AppError::Unauthorized(msg) => msg.clone(),
            AppError::InvalidCredentials => "invalid email or password".to_string(),
            AppError::Token(TokenError::Expired) => "token expired".to_string(),
            AppError::Token(_) => "invalid token".to_string(),
            AppError::Internal(_) => "internal server error".to_string(),
        }
    }

    /// True for failures of our own infrastructure rather than of the caller's input.
    pub fn is_internal(&self) -> bool {
        matches!(self, AppError::Internal(_))
    }
}

/// Renders the same envelope body the auth service returns.
impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.status()
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status()).json(Response::from_error(self))
    }
}

/// Names each failing field and rule. Rejected values are never echoed, since one of
/// them may be a password.
impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        let mut fields: Vec<String> = error
            .field_errors()
            .into_iter()
            .map(|(field, errors)| {
                let reasons: Vec<String> = errors
                    .iter()
                    .map(|e| match &e.message {
                        Some(message) => message.to_string(),
                        None => e.code.to_string(),
                    })
                    .collect();
                format!("{}: {}", field, reasons.join(", "))
            })
            .collect();
        fields.sort();
        AppError::Validation(fields.join("; "))
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::Internal(format!("password hashing failed: {}", error))
    }
}

/// Only uniqueness conflicts and misses are caller-facing; everything else is internal.
impl From<RepositoryError> for AppError {
    fn from(error: RepositoryError) -> AppError {
        match error {
            RepositoryError::AlreadyExists => {
                AppError::Conflict("the user with given email already exists".into())
            }
            RepositoryError::NotFound => AppError::NotFound("user not found".into()),
            other => AppError::Internal(other.to_string()),
        }
    }
}
