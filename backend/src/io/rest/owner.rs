use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::domain::models::User;
use crate::domain::ServiceError;
use crate::AppState;

/// Header an upstream authentication layer sets to the caller's user id
pub const USER_ID_HEADER: &str = "x-user-id";

/// The authenticated caller. Missing or unknown ids are rejected with 401.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl CurrentUser {
    pub fn id(&self) -> &str {
        &self.0.id
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or(ServiceError::Unauthorized)?;

        let user = state.user_service.authenticate(user_id).await?;
        Ok(CurrentUser(user))
    }
}
