//! User directory service

use std::sync::Arc;

use validator::Validate;

use crate::{
    clock::Clock,
    error::AppResult,
    models::user::{RegisterUser, User},
    repository::Repository,
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
    clock: Arc<dyn Clock>,
}

impl UsersService {
    pub fn new(repository: Repository, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    /// Register a new user. The credential hash arrives pre-hashed from the
    /// auth collaborator.
    pub async fn register(&self, request: RegisterUser) -> AppResult<User> {
        request.validate()?;

        let user = self
            .repository
            .users
            .create(&request, self.clock.now())
            .await?;

        tracing::info!(
            user_id = user.user_id,
            username = %user.username,
            role = user.role.as_str(),
            "user registered"
        );

        Ok(user)
    }

    /// Get a user by ID
    pub async fn get_user(&self, user_id: i64) -> AppResult<User> {
        self.repository.users.get_by_id(user_id).await
    }

    /// Get a user by username
    pub async fn get_by_username(&self, username: &str) -> AppResult<Option<User>> {
        self.repository.users.get_by_username(username).await
    }
}
