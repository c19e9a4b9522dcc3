//! RSA key material for the two token purposes.
//!
//! Keys are decoded once at startup and never change for the life of the process.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey};
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

use crate::auth::token::{self, TokenError, TokenPayload};

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("{purpose} key is not valid base64: {source}")]
    Base64 {
        purpose: &'static str,
        #[source]
        source: base64::DecodeError,
    },
    #[error("{purpose} key could not be decoded: {source}")]
    Key {
        purpose: &'static str,
        #[source]
        source: TokenError,
    },
    #[error("{purpose} private and public keys do not belong to the same pair")]
    MismatchedPair { purpose: &'static str },
    #[error("access and refresh credentials must use different key pairs")]
    SharedKeyPair,
    #[error("{purpose} ttl must be greater than zero")]
    ZeroTtl { purpose: &'static str },
}

/// One RSA key pair plus the lifetime of tokens signed with it.
#[derive(Clone)]
pub struct RsaCredentials {
    purpose: &'static str,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl RsaCredentials {
    /// Builds credentials from PEM encoded keys.
    pub fn from_pem(
        purpose: &'static str,
        private_key: &[u8],
        public_key: &[u8],
        ttl: Duration,
    ) -> Result<Self, CredentialError> {
        if ttl.is_zero() {
            return Err(CredentialError::ZeroTtl { purpose });
        }

        let encoding_key = EncodingKey::from_rsa_pem(private_key).map_err(|e| {
            CredentialError::Key {
                purpose,
                source: TokenError::KeyDecode(e.to_string()),
            }
        })?;
        let decoding_key = DecodingKey::from_rsa_pem(public_key).map_err(|e| {
            CredentialError::Key {
                purpose,
                source: TokenError::KeyDecode(e.to_string()),
            }
        })?;

        Ok(Self {
            purpose,
            encoding_key,
            decoding_key,
            ttl,
        })
    }

    /// Builds credentials from base64 encoded PEM, the form keys take in configuration.
    pub fn from_base64(
        purpose: &'static str,
        private_key: &str,
        public_key: &str,
        ttl: Duration,
    ) -> Result<Self, CredentialError> {
        let decode = |value: &str| {
            STANDARD
                .decode(value.trim())
                .map_err(|source| CredentialError::Base64 { purpose, source })
        };
        let private_pem = decode(private_key)?;
        let public_pem = decode(public_key)?;

        Self::from_pem(purpose, &private_pem, &public_pem, ttl)
    }

    pub fn purpose(&self) -> &'static str {
        self.purpose
    }

    pub fn encoding_key(&self) -> &EncodingKey {
        &self.encoding_key
    }

    pub fn decoding_key(&self) -> &DecodingKey {
        &self.decoding_key
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Signs a throwaway token with this pair's private key.
    fn probe(&self) -> Result<String, CredentialError> {
        let payload = TokenPayload::new(Uuid::nil(), "probe@localhost");
        token::issue_at(&payload, Duration::from_secs(60), &self.encoding_key, Utc::now())
            .map(|details| details.token)
            .map_err(|source| CredentialError::Key {
                purpose: self.purpose,
                source,
            })
    }

    fn accepts(&self, token: &str) -> bool {
        token::validate(token, &self.decoding_key).is_ok()
    }
}

/// Key material is never printed.
impl fmt::Debug for RsaCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RsaCredentials")
            .field("purpose", &self.purpose)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

/// Immutable holder of the access and refresh credentials.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    access: RsaCredentials,
    refresh: RsaCredentials,
}

impl CredentialStore {
    /// Checks that each private key signs what its own public key verifies, and that
    /// neither public key accepts the other purpose's tokens.
    pub fn new(access: RsaCredentials, refresh: RsaCredentials) -> Result<Self, CredentialError> {
        let access_probe = access.probe()?;
        let refresh_probe = refresh.probe()?;

        if !access.accepts(&access_probe) {
            return Err(CredentialError::MismatchedPair {
                purpose: access.purpose,
            });
        }
        if !refresh.accepts(&refresh_probe) {
            return Err(CredentialError::MismatchedPair {
                purpose: refresh.purpose,
            });
        }
        if access.accepts(&refresh_probe) || refresh.accepts(&access_probe) {
            return Err(CredentialError::SharedKeyPair);
        }

        if access.ttl >= refresh.ttl {
            log::warn!(
                "access token ttl ({:?}) is not shorter than refresh token ttl ({:?})",
                access.ttl,
                refresh.ttl
            );
        }

        Ok(Self { access, refresh })
    }

    pub fn access(&self) -> &RsaCredentials {
        &self.access
    }

    pub fn refresh(&self) -> &RsaCredentials {
        &self.refresh
    }
}
