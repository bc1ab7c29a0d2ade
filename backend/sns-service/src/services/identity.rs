//! Maps identity-provider subjects onto internal user rows.

use crate::db::UserRepository;
use crate::error::{AppError, Result};
use crate::messages::MessageKey;
use crate::middleware::Caller;
use crate::models::{User, UserWithStats};
use std::sync::Arc;

pub const MAX_NAME_CHARS: usize = 100;

#[derive(Clone)]
pub struct IdentityService {
    users: Arc<dyn UserRepository>,
}

impl IdentityService {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Internal user for `external_id`; 404 "User not found" when missing.
    pub async fn resolve(&self, external_id: &str) -> Result<User> {
        self.find(external_id)
            .await?
            .ok_or(AppError::NotFound(MessageKey::UserNotFound))
    }

    pub async fn find(&self, external_id: &str) -> Result<Option<User>> {
        self.users
            .find_by_external_id(external_id)
            .await
            .map_err(|e| AppError::internal(MessageKey::InternalError, e))
    }

    pub async fn find_with_stats(&self, external_id: &str) -> Result<Option<UserWithStats>> {
        self.users
            .find_with_stats(external_id)
            .await
            .map_err(|e| AppError::internal(MessageKey::InternalError, e))
    }

    /// Create or refresh the caller's user row.
    ///
    /// Name precedence: explicit `name`, the token's name claim, then the
    /// external id itself. An explicit name over the limit is rejected; the
    /// token-derived fallbacks are cut to fit.
    pub async fn sync(&self, caller: &Caller, name: Option<&str>) -> Result<User> {
        let name = match name.map(str::trim).filter(|n| !n.is_empty()) {
            Some(explicit) if explicit.chars().count() > MAX_NAME_CHARS => {
                return Err(AppError::BadRequest(MessageKey::NameTooLong));
            }
            Some(explicit) => explicit.to_string(),
            None => caller
                .name
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .unwrap_or(caller.external_id.as_str())
                .chars()
                .take(MAX_NAME_CHARS)
                .collect(),
        };

        let user = self
            .users
            .upsert(&caller.external_id, &name)
            .await
            .map_err(|e| AppError::internal(MessageKey::SyncUserFailed, e))?;

        tracing::info!(user_id = %user.id, external_id = %user.external_id, "user synced");
        Ok(user)
    }
}
