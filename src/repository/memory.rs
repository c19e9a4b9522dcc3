use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{RepositoryError, UserRepository};
use crate::models::{NewUser, User};

/// `UserRepository` held in process memory, keyed by email.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<String, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn save(&self, user: NewUser) -> Result<User, RepositoryError> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.email) {
            return Err(RepositoryError::AlreadyExists);
        }

        let user = User::new(user);
        users.insert(user.email.clone(), user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<User, RepositoryError> {
        self.users
            .read()
            .await
            .get(email)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn new_user(email: &str, username: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            username: username.to_string(),
            name: username.to_string(),
            password_hash: "$2b$04$hash".to_string(),
        }
    }

    #[tokio::test]
    async fn test_save_and_find() {
        let repo = InMemoryUserRepository::new();
        let saved = repo.save(new_user("a@x.com", "alice")).await.unwrap();

        let found = repo.find_by_email("a@x.com").await.unwrap();
        assert_eq!(found.id, saved.id);
        assert_eq!(found.username, "alice");
    }

    #[tokio::test]
    async fn test_email_is_case_sensitive() {
        let repo = InMemoryUserRepository::new();
        repo.save(new_user("a@x.com", "alice")).await.unwrap();

        assert!(matches!(
            repo.find_by_email("A@X.COM").await,
            Err(RepositoryError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_duplicate_email_keeps_original() {
        let repo = InMemoryUserRepository::new();
        let original = repo.save(new_user("a@x.com", "alice")).await.unwrap();

        assert!(matches!(
            repo.save(new_user("a@x.com", "mallory")).await,
            Err(RepositoryError::AlreadyExists)
        ));

        let found = repo.find_by_email("a@x.com").await.unwrap();
        assert_eq!(found.id, original.id);
        assert_eq!(found.username, "alice");
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_sign_ups_have_one_winner() {
        let repo = Arc::new(InMemoryUserRepository::new());

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let repo = Arc::clone(&repo);
                tokio::spawn(async move {
                    repo.save(new_user("race@x.com", &format!("user{}", i)))
                        .await
                })
            })
            .collect();

        let mut winners = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => winners += 1,
                Err(RepositoryError::AlreadyExists) => {}
                Err(e) => panic!("unexpected error: {:?}", e),
            }
        }

        assert_eq!(winners, 1);
        assert_eq!(repo.len().await, 1);
    }
}
