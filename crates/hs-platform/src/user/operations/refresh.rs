//! Refresh Session Use Case
//!
//! Exchanges a valid refresh token for a new access/refresh pair. The
//! refresh token is rotated: the stored hash is replaced, so the old
//! token stops working immediately.

use std::sync::Arc;
use tracing::info;

use crate::auth::token_service::{hash_refresh_token, TokenKind, TokenService};
use crate::shared::error::{HomesteadError, Result};
use crate::user::operations::login::LoginOutcome;
use crate::user::repository::UserRepository;

pub struct RefreshSessionUseCase {
    user_repo: Arc<UserRepository>,
    token_service: Arc<TokenService>,
}

impl RefreshSessionUseCase {
    pub fn new(user_repo: Arc<UserRepository>, token_service: Arc<TokenService>) -> Self {
        Self {
            user_repo,
            token_service,
        }
    }

    pub async fn execute(&self, raw_refresh_token: &str) -> Result<LoginOutcome> {
        let claims = self
            .token_service
            .validate(raw_refresh_token, TokenKind::Refresh)?;

        let user = self
            .user_repo
            .find_by_id(&claims.sub)
            .await?
            .ok_or_else(|| HomesteadError::unauthenticated("Invalid refresh token"))?;

        // The token must match the one persisted at login; a logged-out
        // session has no stored hash and cannot refresh.
        let presented_hash = hash_refresh_token(raw_refresh_token);
        if user.refresh_token_hash.as_deref() != Some(presented_hash.as_str()) {
            return Err(HomesteadError::unauthenticated("Invalid refresh token"));
        }

        let access_token = self.token_service.issue_access_token(&user.id)?;
        let refresh_token = self.token_service.issue_refresh_token(&user.id)?;

        self.user_repo
            .set_refresh_token_hash(&user.id, &hash_refresh_token(&refresh_token))
            .await?;

        info!(user_id = %user.id, "session refreshed");
        Ok(LoginOutcome {
            user,
            access_token,
            refresh_token,
        })
    }
}
