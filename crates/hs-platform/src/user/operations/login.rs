//! Login User Use Case

use std::sync::Arc;
use tracing::info;

use crate::auth::password_service::PasswordService;
use crate::auth::token_service::{hash_refresh_token, TokenService};
use crate::shared::error::{HomesteadError, Result};
use crate::user::entity::User;
use crate::user::repository::UserRepository;

/// Command for logging in.
#[derive(Debug, Clone)]
pub struct LoginCommand {
    pub email: String,
    pub password: String,
}

impl LoginCommand {
    pub fn validate(&self) -> Result<()> {
        if self.email.trim().is_empty() || self.password.is_empty() {
            return Err(HomesteadError::validation("Email and password are required"));
        }
        Ok(())
    }
}

/// Result of a successful login: the user plus the issued token pair.
#[derive(Debug)]
pub struct LoginOutcome {
    pub user: User,
    pub access_token: String,
    pub refresh_token: String,
}

pub struct LoginUserUseCase {
    user_repo: Arc<UserRepository>,
    password_service: Arc<PasswordService>,
    token_service: Arc<TokenService>,
}

impl LoginUserUseCase {
    pub fn new(
        user_repo: Arc<UserRepository>,
        password_service: Arc<PasswordService>,
        token_service: Arc<TokenService>,
    ) -> Self {
        Self {
            user_repo,
            password_service,
            token_service,
        }
    }

    /// Verify credentials and issue the session token pair. The refresh
    /// token's hash is persisted on the user so it can be revoked.
    ///
    /// Failure never reveals which of email/password was wrong.
    pub async fn execute(&self, command: LoginCommand) -> Result<LoginOutcome> {
        command.validate()?;

        let user = self
            .user_repo
            .find_by_email(command.email.trim())
            .await?
            .ok_or_else(|| HomesteadError::unauthenticated("Invalid credentials"))?;

        let password_valid = self
            .password_service
            .verify_password(&command.password, &user.password_hash)?;
        if !password_valid {
            return Err(HomesteadError::unauthenticated("Invalid credentials"));
        }

        let access_token = self.token_service.issue_access_token(&user.id)?;
        let refresh_token = self.token_service.issue_refresh_token(&user.id)?;

        self.user_repo
            .set_refresh_token_hash(&user.id, &hash_refresh_token(&refresh_token))
            .await?;

        info!(user_id = %user.id, "user logged in");
        Ok(LoginOutcome {
            user,
            access_token,
            refresh_token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_credentials_rejected() {
        let cmd = LoginCommand {
            email: "".to_string(),
            password: "pw".to_string(),
        };
        assert!(cmd.validate().is_err());

        let cmd = LoginCommand {
            email: "a@b.co".to_string(),
            password: "".to_string(),
        };
        assert!(cmd.validate().is_err());

        let cmd = LoginCommand {
            email: "a@b.co".to_string(),
            password: "pw".to_string(),
        };
        assert!(cmd.validate().is_ok());
    }
}
