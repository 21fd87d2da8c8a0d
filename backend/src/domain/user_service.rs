use chrono::Utc;
use shared::CreateUserRequest;
use tracing::info;
use uuid::Uuid;

use crate::domain::error::{ServiceError, ServiceResult};
use crate::domain::models::User;
use crate::domain::validation::{email, required_text, NAME_MAX_LEN};
use crate::storage::UserRepository;

/// Registers users and resolves the caller of a request
#[derive(Clone)]
pub struct UserService {
    users: UserRepository,
}

impl UserService {
    pub fn new(users: UserRepository) -> Self {
        Self { users }
    }

    pub async fn create_user(&self, request: CreateUserRequest) -> ServiceResult<User> {
        let user = User {
            id: Uuid::new_v4().to_string(),
            username: required_text(&request.username, "username", NAME_MAX_LEN)?,
            email: email(&request.email)?,
            created_at: Utc::now(),
        };

        self.users
            .store_user(&user)
            .await
            .map_err(|e| ServiceError::from_constraint(e, "Username is already taken"))?;

        info!("Created user {} ({})", user.username, user.id);
        Ok(user)
    }

    /// Resolve the id an upstream auth layer put on the request
    pub async fn authenticate(&self, user_id: &str) -> ServiceResult<User> {
        self.users.get_user(user_id).await?.ok_or(ServiceError::Unauthorized)
    }
}
