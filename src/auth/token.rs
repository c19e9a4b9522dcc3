use chrono::{DateTime, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// Algorithm every token is signed with.
pub const SIGNING_ALGORITHM: Algorithm = Algorithm::RS256;

/// Algorithms accepted on validation: PKCS#1 v1.5 RSA only. HMAC, EC, EdDSA and
/// RSA-PSS headers are rejected before the signature is looked at.
const ACCEPTED_ALGORITHMS: [Algorithm; 3] = [Algorithm::RS256, Algorithm::RS384, Algorithm::RS512];

/// Reasons a token could not be issued or was rejected.
///
/// Callers rely on these being distinct: an `Expired` access token is refreshed
/// silently, while every other rejection forces a new login.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("key material could not be decoded: {0}")]
    KeyDecode(String),
    #[error("token signature is invalid")]
    InvalidSignature,
    #[error("token has expired")]
    Expired,
    #[error("token is not valid yet")]
    NotYetValid,
    #[error("token is malformed: {0}")]
    Malformed(String),
    #[error("token was signed with an unexpected algorithm")]
    AlgorithmMismatch,
    #[error("token could not be signed: {0}")]
    Signing(String),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(error: jsonwebtoken::errors::Error) -> Self {
        match error.kind() {
            ErrorKind::InvalidSignature => TokenError::InvalidSignature,
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::ImmatureSignature => TokenError::NotYetValid,
            ErrorKind::InvalidAlgorithm
            | ErrorKind::InvalidAlgorithmName
            | ErrorKind::MissingAlgorithm => TokenError::AlgorithmMismatch,
            ErrorKind::InvalidRsaKey(_) | ErrorKind::InvalidKeyFormat => {
                TokenError::KeyDecode(error.to_string())
            }
            ErrorKind::RsaFailedSigning => TokenError::Signing(error.to_string()),
            _ => TokenError::Malformed(error.to_string()),
        }
    }
}

/// Identity claims carried by a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPayload {
    /// Unique per issuance. Assigned by [`issue`]; nil until then.
    pub token_id: Uuid,
    pub user_id: Uuid,
    pub email: String,
}

impl TokenPayload {
    /// Builds an unissued payload for a subject.
    pub fn new(user_id: Uuid, email: impl Into<String>) -> Self {
        Self {
            token_id: Uuid::nil(),
            user_id,
            email: email.into(),
        }
    }
}

/// Everything known about a freshly issued token, so callers never re-parse it.
#[derive(Debug, Clone)]
pub struct TokenDetails {
    pub token: String,
    pub id: Uuid,
    pub payload: TokenPayload,
    /// Seconds since the Unix epoch.
    pub expires_at: i64,
}

/// Wire form of the claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub token_id: Uuid,
    pub user_id: Uuid,
    pub email: String,
    pub jti: Uuid,
    pub exp: i64,
    pub nbf: i64,
    pub iat: i64,
}

/// Issues a token that is valid from now until `now + ttl`.
pub fn issue(
    payload: &TokenPayload,
    ttl: Duration,
    key: &EncodingKey,
) -> Result<TokenDetails, TokenError> {
    issue_at(payload, ttl, key, Utc::now())
}

/// Issues a token as of `now`.
///
/// A fresh token id is minted on every call; any id already on `payload` is replaced.
pub fn issue_at(
    payload: &TokenPayload,
    ttl: Duration,
    key: &EncodingKey,
    now: DateTime<Utc>,
) -> Result<TokenDetails, TokenError> {
    let id = Uuid::new_v4();
    let issued_at = now.timestamp();
    let ttl_secs = i64::try_from(ttl.as_secs())
        .map_err(|_| TokenError::Signing(format!("ttl out of range: {:?}", ttl)))?;
    let expires_at = issued_at
        .checked_add(ttl_secs)
        .ok_or_else(|| TokenError::Signing(format!("ttl out of range: {:?}", ttl)))?;

    let claims = Claims {
        token_id: id,
        user_id: payload.user_id,
        email: payload.email.clone(),
        jti: id,
        exp: expires_at,
        nbf: issued_at,
        iat: issued_at,
    };

    let token = encode(&Header::new(SIGNING_ALGORITHM), &claims, key)?;

    Ok(TokenDetails {
        token,
        id,
        payload: TokenPayload {
            token_id: id,
            ..payload.clone()
        },
        expires_at,
    })
}

/// Validates a token against `key` at the current time.
pub fn validate(token: &str, key: &DecodingKey) -> Result<TokenPayload, TokenError> {
    validate_at(token, key, Utc::now())
}

/// Validates a token against `key` as of `now`.
///
/// Algorithm and signature are checked first; the token is then accepted only when
/// `nbf <= now < exp`.
pub fn validate_at(
    token: &str,
    key: &DecodingKey,
    now: DateTime<Utc>,
) -> Result<TokenPayload, TokenError> {
    let claims = decode_claims(token, key)?;
    let now = now.timestamp();

    if now >= claims.exp {
        return Err(TokenError::Expired);
    }
    if now < claims.nbf {
        return Err(TokenError::NotYetValid);
    }

    Ok(TokenPayload {
        token_id: claims.token_id,
        user_id: claims.user_id,
        email: claims.email,
    })
}

/// Verifies algorithm and signature and returns the claims without any temporal check.
pub fn decode_claims(token: &str, key: &DecodingKey) -> Result<Claims, TokenError> {
    let mut validation = Validation::new(SIGNING_ALGORITHM);
    validation.algorithms = ACCEPTED_ALGORITHMS.to_vec();
    // Temporal bounds are checked against the caller's clock in `validate_at`.
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.leeway = 0;
    validation.set_required_spec_claims(&["exp", "nbf"]);

    let data = decode::<Claims>(token, key, &validation)?;
    Ok(data.claims)
}
