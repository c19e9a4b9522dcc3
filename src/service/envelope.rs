//! Uniform response envelopes returned by every auth operation.
//!
//! Failures are carried as data: a status mirroring HTTP semantics plus an optional
//! message. The gateway renders the status as the HTTP code unchanged.

use serde::{Deserialize, Serialize};

use crate::auth::TokenDetails;
use crate::error::AppError;

pub const STATUS_OK: u16 = 200;

/// Status and optional error shared by every response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub status: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Response {
    pub fn ok() -> Self {
        Self {
            status: STATUS_OK,
            error: None,
        }
    }

    pub fn from_error(error: &AppError) -> Self {
        Self {
            status: error.status().as_u16(),
            error: Some(error.public_message()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == STATUS_OK
    }
}

/// Result of the authenticate flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    #[serde(flatten)]
    pub meta: Response,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token_expires_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token_expires_at: Option<i64>,
}

impl TokenResponse {
    pub fn issued(access: TokenDetails, refresh: TokenDetails) -> Self {
        Self {
            meta: Response::ok(),
            access_token_expires_at: Some(access.expires_at),
            refresh_token_expires_at: Some(refresh.expires_at),
            access_token: Some(access.token),
            refresh_token: Some(refresh.token),
        }
    }

    pub fn from_error(error: &AppError) -> Self {
        Self {
            meta: Response::from_error(error),
            access_token: None,
            refresh_token: None,
            access_token_expires_at: None,
            refresh_token_expires_at: None,
        }
    }
}

/// Result of the refresh flow. A refresh never hands out a new refresh token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshResponse {
    #[serde(flatten)]
    pub meta: Response,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token_expires_at: Option<i64>,
}

impl RefreshResponse {
    pub fn issued(access: TokenDetails) -> Self {
        Self {
            meta: Response::ok(),
            access_token_expires_at: Some(access.expires_at),
            access_token: Some(access.token),
        }
    }

    pub fn from_error(error: &AppError) -> Self {
        Self {
            meta: Response::from_error(error),
            access_token: None,
            access_token_expires_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::TokenError;
    use serde_json::json;

    #[test]
    fn test_ok_envelope_has_no_error_field() {
        let json = serde_json::to_value(Response::ok()).unwrap();
        assert_eq!(json, json!({ "status": 200 }));
    }

    #[test]
    fn test_error_envelope_flattens_meta() {
        let response = RefreshResponse::from_error(&AppError::Token(TokenError::Expired));
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json, json!({ "status": 403, "error": "token expired" }));
    }

    #[test]
    fn test_token_response_parses_back() {
        let body = json!({
            "status": 200,
            "access_token": "a.b.c",
            "refresh_token": "d.e.f",
            "access_token_expires_at": 1,
            "refresh_token_expires_at": 2
        });
        let response: TokenResponse = serde_json::from_value(body).unwrap();
        assert!(response.meta.is_ok());
        assert_eq!(response.access_token.as_deref(), Some("a.b.c"));
        assert_eq!(response.refresh_token_expires_at, Some(2));
    }
}
