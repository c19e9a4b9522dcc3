pub mod clock;
pub mod credentials;
pub mod extractors;
pub mod middleware;
pub mod password;
pub mod token;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use validator::Validate;

// Re-export necessary items
pub use clock::{Clock, SystemClock};
#[cfg(test)]
pub use clock::FixedClock;
pub use credentials::{CredentialError, CredentialStore, RsaCredentials};
pub use extractors::AuthenticatedUser;
pub use middleware::AuthMiddleware;
pub use password::PasswordHasher;
pub use token::{Claims, TokenDetails, TokenError, TokenPayload};

lazy_static! {
    // Regex for username validation: alphanumeric, underscores, hyphens
    static ref USERNAME_REGEX: regex::Regex = regex::Regex::new(r"^[a-zA-Z0-9_-]+$").unwrap();
    static ref ALPHANUMERIC_REGEX: regex::Regex = regex::Regex::new(r"^[a-zA-Z0-9]+$").unwrap();
    static ref ALPHA_REGEX: regex::Regex = regex::Regex::new(r"^[a-zA-Z]+$").unwrap();
}

/// Payload for registering a new account.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SignUpRequest {
    #[validate(email)]
    pub email: String,
    /// Between 3 and 20 characters; letters, digits, underscores or hyphens.
    #[validate(
        length(min = 3, max = 20),
        regex(
            path = "USERNAME_REGEX",
            message = "Username must be alphanumeric, underscores, or hyphens"
        )
    )]
    pub username: String,
    /// Between 8 and 20 letters or digits.
    #[validate(
        length(min = 8, max = 20, message = "Password must be between 8 and 20 characters"),
        regex(path = "ALPHANUMERIC_REGEX", message = "Password must be alphanumeric")
    )]
    pub password: String,
    #[serde(default)]
    #[validate(
        length(min = 2),
        regex(path = "ALPHA_REGEX", message = "First name must contain only letters")
    )]
    pub first_name: Option<String>,
    #[serde(default)]
    #[validate(
        length(min = 2),
        regex(path = "ALPHA_REGEX", message = "Last name must contain only letters")
    )]
    pub last_name: Option<String>,
}

/// Payload for exchanging an email/password pair for a token pair.
///
/// The password is only required to be present; sign-up rules are not re-applied here.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TokenRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RefreshRequest {
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[validate(email)]
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ConfirmSignUpRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 4, max = 12))]
    pub code: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    fn sign_up() -> SignUpRequest {
        SignUpRequest {
            email: "a@x.com".to_string(),
            username: "alice".to_string(),
            password: "password1".to_string(),
            first_name: None,
            last_name: None,
        }
    }

    #[test]
    fn test_sign_up_request_validation() {
        assert!(sign_up().validate().is_ok());

        let with_names = SignUpRequest {
            first_name: Some("Alice".to_string()),
            last_name: Some("Liddell".to_string()),
            ..sign_up()
        };
        assert!(with_names.validate().is_ok());

        let invalid_email = SignUpRequest {
            email: "axcom".to_string(),
            ..sign_up()
        };
        assert!(invalid_email.validate().is_err());

        let invalid_username = SignUpRequest {
            username: "test user!".to_string(), // Contains space and exclamation
            ..sign_up()
        };
        assert!(invalid_username.validate().is_err());

        let short_username = SignUpRequest {
            username: "al".to_string(),
            ..sign_up()
        };
        assert!(short_username.validate().is_err());

        let long_username = SignUpRequest {
            username: "a".repeat(21),
            ..sign_up()
        };
        assert!(long_username.validate().is_err());
    }

    #[test]
    fn test_sign_up_password_rules() {
        for password in ["short1", "password!", "a".repeat(21).as_str()] {
            let request = SignUpRequest {
                password: password.to_string(),
                ..sign_up()
            };
            assert!(request.validate().is_err(), "accepted {:?}", password);
        }
    }

    #[test]
    fn test_sign_up_name_rules() {
        let short_first_name = SignUpRequest {
            first_name: Some("A".to_string()),
            ..sign_up()
        };
        assert!(short_first_name.validate().is_err());

        let digit_last_name = SignUpRequest {
            last_name: Some("L1ddell".to_string()),
            ..sign_up()
        };
        assert!(digit_last_name.validate().is_err());
    }

    #[test]
    fn test_token_request_validation() {
        let valid = TokenRequest {
            email: "a@x.com".to_string(),
            password: "wrong1".to_string(),
        };
        assert!(valid.validate().is_ok());

        let missing_password = TokenRequest {
            email: "a@x.com".to_string(),
            password: String::new(),
        };
        assert!(missing_password.validate().is_err());

        let invalid_email = TokenRequest {
            email: "not-an-email".to_string(),
            password: "password1".to_string(),
        };
        assert!(invalid_email.validate().is_err());
    }

    #[test]
    fn test_stub_request_validation() {
        assert!(RefreshRequest {
            refresh_token: String::new()
        }
        .validate()
        .is_err());
        assert!(ResetPasswordRequest {
            email: "a@x.com".to_string()
        }
        .validate()
        .is_ok());
        assert!(ConfirmSignUpRequest {
            email: "a@x.com".to_string(),
            code: "123".to_string()
        }
        .validate()
        .is_err());
    }
}
