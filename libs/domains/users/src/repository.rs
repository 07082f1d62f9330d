use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{UserError, UserResult};
use crate::models::{User, UserId};

/// Repository trait for User persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert or update a user keyed by its id.
    ///
    /// Fails with [`UserError::DuplicateEmail`] when a different user
    /// already holds the email.
    async fn save(&self, user: User) -> UserResult<User>;

    async fn find_by_id(&self, id: UserId) -> UserResult<Option<User>>;

    async fn find_by_email(&self, email: &str) -> UserResult<Option<User>>;

    /// All users, oldest first
    async fn find_all(&self) -> UserResult<Vec<User>>;

    /// Returns whether a user existed and was removed
    async fn delete_by_id(&self, id: UserId) -> UserResult<bool>;
}

/// In-memory implementation of UserRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<UserId, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn save(&self, user: User) -> UserResult<User> {
        // Uniqueness check and insert happen under the same write lock
        let mut users = self.users.write().await;

        let taken = users
            .values()
            .any(|u| u.id() != user.id() && u.email() == user.email());
        if taken {
            return Err(UserError::DuplicateEmail(user.email().to_string()));
        }

        let user = if users.contains_key(&user.id()) {
            let user = user.with_updated_at(Utc::now());
            tracing::info!(user_id = %user.id(), "Updated user");
            user
        } else {
            tracing::info!(user_id = %user.id(), "Created user");
            user
        };

        users.insert(user.id(), user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: UserId) -> UserResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> UserResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email() == email).cloned())
    }

    async fn find_all(&self) -> UserResult<Vec<User>> {
        let users = self.users.read().await;
        let mut result: Vec<User> = users.values().cloned().collect();
        result.sort_by_key(|u| (u.created_at(), u.id()));
        Ok(result)
    }

    async fn delete_by_id(&self, id: UserId) -> UserResult<bool> {
        let mut users = self.users.write().await;
        let removed = users.remove(&id).is_some();

        if removed {
            tracing::info!(user_id = %id, "Deleted user");
        }
        Ok(removed)
    }
}
