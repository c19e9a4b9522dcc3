//! The auth service: sign-up, token issuance and refresh.
//!
//! Each call is an independent, strictly sequential pipeline
//! (validate, repository, hash or crypto, respond). Nothing is shared between calls
//! except the read-only credentials and the repository handle, and every outcome,
//! success or failure, comes back as an envelope.

pub mod envelope;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use validator::Validate;

use crate::auth::{
    token, Clock, ConfirmSignUpRequest, CredentialError, CredentialStore, PasswordHasher,
    RefreshRequest, ResetPasswordRequest, RsaCredentials, SignUpRequest, TokenDetails, TokenError,
    TokenPayload, TokenRequest,
};
use crate::error::AppError;
use crate::models::NewUser;
use crate::repository::{RepositoryError, UserRepository};

pub use envelope::{RefreshResponse, Response, TokenResponse};

const SIGN_UP: &str = "auth.sign_up";
const TOKEN: &str = "auth.token";
const REFRESH: &str = "auth.refresh";
const RESET_PASSWORD: &str = "auth.reset_password";
const CONFIRM_SIGN_UP: &str = "auth.confirm_sign_up";

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error(transparent)]
    Credentials(#[from] CredentialError),
    #[error("request timeout must be greater than zero")]
    ZeroTimeout,
}

/// Everything the service needs, named. All fields are required.
pub struct AuthServiceConfig {
    pub users: Arc<dyn UserRepository>,
    pub access_credentials: RsaCredentials,
    pub refresh_credentials: RsaCredentials,
    pub hasher: PasswordHasher,
    pub clock: Arc<dyn Clock>,
    /// Deadline for a whole call, repository and hashing included.
    pub request_timeout: Duration,
}

pub struct AuthService {
    users: Arc<dyn UserRepository>,
    credentials: CredentialStore,
    hasher: PasswordHasher,
    clock: Arc<dyn Clock>,
    request_timeout: Duration,
}

impl AuthService {
    /// Validates the configuration and fails fast on unusable key material.
    pub fn new(config: AuthServiceConfig) -> Result<Self, BuildError> {
        if config.request_timeout.is_zero() {
            return Err(BuildError::ZeroTimeout);
        }

        let credentials =
            CredentialStore::new(config.access_credentials, config.refresh_credentials)?;

        Ok(Self {
            users: config.users,
            credentials,
            hasher: config.hasher,
            clock: config.clock,
            request_timeout: config.request_timeout,
        })
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    /// Registers a new account. No tokens are issued here.
    pub async fn sign_up(&self, request: SignUpRequest) -> Response {
        match self.within_deadline(self.try_sign_up(&request)).await {
            Ok(()) => {
                log::info!("{}: registered {}", SIGN_UP, request.email);
                Response::ok()
            }
            Err(error) => {
                log_failure(
                    SIGN_UP,
                    &error,
                    &format!("email={} username={}", request.email, request.username),
                );
                Response::from_error(&error)
            }
        }
    }

    /// Exchanges an email/password pair for an access and a refresh token.
    ///
    /// An unknown email and a wrong password produce the same envelope; only the
    /// log tells them apart.
    pub async fn token(&self, request: TokenRequest) -> TokenResponse {
        match self.within_deadline(self.try_token(&request)).await {
            Ok((access, refresh)) => {
                log::info!(
                    "{}: issued token pair for user {}",
                    TOKEN,
                    access.payload.user_id
                );
                TokenResponse::issued(access, refresh)
            }
            Err(error) => {
                log_failure(TOKEN, &error, &format!("email={}", request.email));
                let error = match error {
                    AppError::NotFound(_) => AppError::InvalidCredentials,
                    other => other,
                };
                TokenResponse::from_error(&error)
            }
        }
    }

    /// Mints a new access token from a valid refresh token. The refresh token itself is
    /// not rotated and stays usable until it expires.
    pub async fn refresh(&self, request: RefreshRequest) -> RefreshResponse {
        match self.within_deadline(self.try_refresh(&request)).await {
            Ok(access) => {
                log::info!(
                    "{}: refreshed access token for user {}",
                    REFRESH,
                    access.payload.user_id
                );
                RefreshResponse::issued(access)
            }
            Err(error) => {
                log_failure(REFRESH, &error, "");
                RefreshResponse::from_error(&error)
            }
        }
    }

    /// Accepted and validated; delivering reset codes is the email worker's job.
    pub async fn reset_password(&self, request: ResetPasswordRequest) -> Response {
        match request.validate() {
            Ok(()) => {
                log::debug!("{}: accepted for {}", RESET_PASSWORD, request.email);
                Response::ok()
            }
            Err(errors) => {
                let error = AppError::from(errors);
                log_failure(RESET_PASSWORD, &error, &format!("email={}", request.email));
                Response::from_error(&error)
            }
        }
    }

    /// Accepted and validated; confirmation codes are checked by the email worker.
    pub async fn confirm_sign_up(&self, request: ConfirmSignUpRequest) -> Response {
        match request.validate() {
            Ok(()) => {
                log::debug!("{}: accepted for {}", CONFIRM_SIGN_UP, request.email);
                Response::ok()
            }
            Err(errors) => {
                let error = AppError::from(errors);
                log_failure(CONFIRM_SIGN_UP, &error, &format!("email={}", request.email));
                Response::from_error(&error)
            }
        }
    }

    /// Checks a bearer access token. Refresh tokens never pass this check.
    pub fn verify_access_token(&self, token: &str) -> Result<TokenPayload, TokenError> {
        token::validate_at(
            token,
            self.credentials.access().decoding_key(),
            self.clock.now(),
        )
    }

    async fn try_sign_up(&self, request: &SignUpRequest) -> Result<(), AppError> {
        request.validate()?;

        let password_hash = self.hasher.hash(&request.password).await?;
        self.users
            .save(NewUser::from_sign_up(request, password_hash))
            .await?;

        Ok(())
    }

    async fn try_token(
        &self,
        request: &TokenRequest,
    ) -> Result<(TokenDetails, TokenDetails), AppError> {
        request.validate()?;

        let user = match self.users.find_by_email(&request.email).await {
            Ok(user) => user,
            Err(RepositoryError::NotFound) => {
                self.hasher.verify_dummy(&request.password).await?;
                return Err(AppError::NotFound("user not found".into()));
            }
            Err(error) => return Err(error.into()),
        };

        if !self
            .hasher
            .verify(&request.password, &user.password_hash)
            .await?
        {
            return Err(AppError::InvalidCredentials);
        }

        // Claims come from the stored user, never from the request.
        let now = self.clock.now();
        let access = self.credentials.access();
        let refresh = self.credentials.refresh();

        let access_token = token::issue_at(
            &TokenPayload::new(user.id, &user.email),
            access.ttl(),
            access.encoding_key(),
            now,
        )
        .map_err(|e| issuance_failed(access, e))?;
        let refresh_token = token::issue_at(
            &TokenPayload::new(user.id, &user.email),
            refresh.ttl(),
            refresh.encoding_key(),
            now,
        )
        .map_err(|e| issuance_failed(refresh, e))?;

        Ok((access_token, refresh_token))
    }

    async fn try_refresh(&self, request: &RefreshRequest) -> Result<TokenDetails, AppError> {
        request.validate()?;

        let now = self.clock.now();
        let payload = token::validate_at(
            &request.refresh_token,
            self.credentials.refresh().decoding_key(),
            now,
        )?;

        let access = self.credentials.access();
        token::issue_at(&payload, access.ttl(), access.encoding_key(), now)
            .map_err(|e| issuance_failed(access, e))
    }

    async fn within_deadline<T, F>(&self, flow: F) -> Result<T, AppError>
    where
        F: Future<Output = Result<T, AppError>>,
    {
        tokio::time::timeout(self.request_timeout, flow)
            .await
            .map_err(|_| {
                AppError::Internal(format!("deadline of {:?} exceeded", self.request_timeout))
            })?
    }
}

/// Failing to sign is our fault, never the caller's.
fn issuance_failed(credentials: &RsaCredentials, error: TokenError) -> AppError {
    AppError::Internal(format!(
        "failed to create {} token: {}",
        credentials.purpose(),
        error
    ))
}

fn log_failure(op: &str, error: &AppError, context: &str) {
    if error.is_internal() {
        log::error!("{}: {} [{}]", op, error, context);
    } else {
        log::warn!("{}: {} [{}]", op, error, context);
    }
}
