use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::auth::SignUpRequest;

/// A registered account as stored in the `users` table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    /// Unique, compared exactly as stored.
    pub email: String,
    pub username: String,
    /// Display name.
    pub name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// The fields a new account is created from. The plaintext password never gets here.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub name: String,
    pub password_hash: String,
}

impl NewUser {
    pub fn from_sign_up(request: &SignUpRequest, password_hash: String) -> Self {
        Self {
            email: request.email.clone(),
            username: request.username.clone(),
            name: display_name(request),
            password_hash,
        }
    }
}

impl User {
    /// Creates a `User` with a fresh id, stamped now.
    pub fn new(input: NewUser) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: input.email,
            username: input.username,
            name: input.name,
            password_hash: input.password_hash,
            created_at: Utc::now(),
        }
    }
}

/// "First Last" when any name part was given, otherwise the username.
fn display_name(request: &SignUpRequest) -> String {
    let parts: Vec<&str> = [request.first_name.as_deref(), request.last_name.as_deref()]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect();

    if parts.is_empty() {
        request.username.clone()
    } else {
        parts.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(first_name: Option<&str>, last_name: Option<&str>) -> SignUpRequest {
        SignUpRequest {
            email: "a@x.com".to_string(),
            username: "alice".to_string(),
            password: "password1".to_string(),
            first_name: first_name.map(str::to_string),
            last_name: last_name.map(str::to_string),
        }
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name(&request(None, None)), "alice");
        assert_eq!(display_name(&request(Some("Alice"), None)), "Alice");
        assert_eq!(
            display_name(&request(Some("Alice"), Some("Liddell"))),
            "Alice Liddell"
        );
    }

    #[test]
    fn test_new_user_keeps_hash_only() {
        let input = NewUser::from_sign_up(&request(None, None), "$2b$04$hash".to_string());
        let user = User::new(input);

        assert_eq!(user.email, "a@x.com");
        assert_eq!(user.name, "alice");
        assert_eq!(user.password_hash, "$2b$04$hash");

        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
    }
}
