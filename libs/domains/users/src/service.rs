use std::sync::Arc;

use crate::error::{UserError, UserResult};
use crate::models::{CreateUser, UpdateUser, User, UserId, UserResponse};
use crate::repository::UserRepository;

/// User use cases
///
/// Identifiers arrive as text; anything that does not parse as a user id is
/// reported as [`UserError::NotFound`].
#[derive(Clone)]
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    pub async fn create_user(&self, input: CreateUser) -> UserResult<UserResponse> {
        let user = User::create(input.name, input.email, input.age)?;
        let saved = self.repository.save(user).await?;
        Ok(saved.into())
    }

    pub async fn get_user(&self, id: &str) -> UserResult<UserResponse> {
        self.load(id).await.map(Into::into)
    }

    pub async fn get_all_users(&self) -> UserResult<Vec<UserResponse>> {
        let users = self.repository.find_all().await?;
        Ok(users.into_iter().map(Into::into).collect())
    }

    /// Apply the fields present in `input`; absent fields keep their value
    pub async fn update_user(&self, id: &str, input: UpdateUser) -> UserResult<UserResponse> {
        let mut user = self.load(id).await?;

        if let Some(name) = input.name {
            user = user.update_name(name)?;
        }
        if let Some(email) = input.email {
            user = user.update_email(email)?;
        }
        if input.age.is_some() {
            user = user.update_age(input.age)?;
        }

        let saved = self.repository.save(user).await?;
        Ok(saved.into())
    }

    pub async fn delete_user(&self, id: &str) -> UserResult<()> {
        let user_id = parse_id(id)?;
        if self.repository.delete_by_id(user_id).await? {
            Ok(())
        } else {
            Err(UserError::NotFound(id.to_string()))
        }
    }

    async fn load(&self, id: &str) -> UserResult<User> {
        let user_id = parse_id(id)?;
        self.repository
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| UserError::NotFound(id.to_string()))
    }
}

fn parse_id(id: &str) -> UserResult<UserId> {
    id.parse()
        .map_err(|_| UserError::NotFound(id.to_string()))
}
