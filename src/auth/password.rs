use crate::error::AppError;
use bcrypt::{hash, verify};
use std::sync::Arc;

/// Password used to build the hash that unknown accounts are checked against.
const DUMMY_PASSWORD: &str = "taskforge-dummy-password";

pub fn hash_password(password: &str, cost: u32) -> Result<String, AppError> {
    hash(password, cost)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

/// Constant-time comparison is done inside `bcrypt::verify`.
pub fn verify_password(password: &str, hashed_password: &str) -> Result<bool, AppError> {
    verify(password, hashed_password)
        .map_err(|e| AppError::Internal(format!("Failed to verify password: {}", e)))
}

/// Salted one-way hashing for the auth flows.
///
/// bcrypt is CPU bound, so every call runs on the blocking pool and can be abandoned
/// by the caller's deadline without stalling the async workers.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    cost: u32,
    dummy_hash: Arc<str>,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Result<Self, AppError> {
        let dummy_hash = hash_password(DUMMY_PASSWORD, cost)?;
        Ok(Self {
            cost,
            dummy_hash: dummy_hash.into(),
        })
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    pub async fn hash(&self, password: &str) -> Result<String, AppError> {
        let password = password.to_owned();
        let cost = self.cost;
        tokio::task::spawn_blocking(move || hash_password(&password, cost))
            .await
            .map_err(|e| AppError::Internal(format!("password hashing task failed: {}", e)))?
    }

    pub async fn verify(&self, password: &str, hashed_password: &str) -> Result<bool, AppError> {
        let password = password.to_owned();
        let hashed_password = hashed_password.to_owned();
        tokio::task::spawn_blocking(move || verify_password(&password, &hashed_password))
            .await
            .map_err(|e| AppError::Internal(format!("password verification task failed: {}", e)))?
    }

    /// Spends the same work as a real verification so a missing account is not
    /// observable through response time. The result is always a mismatch.
    pub async fn verify_dummy(&self, password: &str) -> Result<bool, AppError> {
        let dummy_hash = Arc::clone(&self.dummy_hash);
        self.verify(password, &dummy_hash).await.map(|_| false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hashing_and_verification() {
        let password = "test_password123";
        let hashed = hash_password(password, 4).unwrap();

        assert_ne!(hashed, password);
        assert!(verify_password(password, &hashed).unwrap());
        assert!(!verify_password("wrong_password", &hashed).unwrap());
    }

    #[test]
    fn test_hashes_are_salted() {
        let first = hash_password("password1", 4).unwrap();
        let second = hash_password("password1", 4).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_invalid_cost_is_internal_error() {
        match PasswordHasher::new(2) {
            Err(AppError::Internal(msg)) => assert!(msg.contains("Failed to hash password")),
            other => panic!("expected internal error, got {:?}", other),
        }
    }

    #[test]
    fn test_verify_with_invalid_hash() {
        match verify_password("test_password123", "invalidhashformat") {
            Err(AppError::Internal(msg)) => {
                assert!(msg.contains("Failed to verify password"));
            }
            Ok(false) => {}
            Ok(true) => panic!("Password verification should fail for invalid hash format"),
            Err(e) => panic!("Unexpected error: {:?}", e),
        }
    }

    #[tokio::test]
    async fn test_async_hasher() {
        let hasher = PasswordHasher::new(4).unwrap();
        let hashed = hasher.hash("password1").await.unwrap();

        assert!(hasher.verify("password1", &hashed).await.unwrap());
        assert!(!hasher.verify("password2", &hashed).await.unwrap());
    }

    #[tokio::test]
    async fn test_dummy_verification_never_matches() {
        let hasher = PasswordHasher::new(4).unwrap();
        assert!(!hasher.verify_dummy(DUMMY_PASSWORD).await.unwrap());
        assert!(!hasher.verify_dummy("anything").await.unwrap());
    }
}
