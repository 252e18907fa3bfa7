//! Register User Use Case

use regex::Regex;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::auth::password_service::PasswordService;
use crate::media::gateway::MediaGateway;
use crate::shared::error::{HomesteadError, Result};
use crate::user::entity::User;
use crate::user::repository::UserRepository;

fn email_pattern() -> &'static Regex {
    static PATTERN: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap()
    })
}

/// Command for registering a new user.
#[derive(Debug, Clone)]
pub struct RegisterUserCommand {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl RegisterUserCommand {
    /// Boundary validation, before any upload or database work.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty()
            || self.email.trim().is_empty()
            || self.password.trim().is_empty()
        {
            return Err(HomesteadError::validation("All fields are required"));
        }
        if !email_pattern().is_match(self.email.trim()) {
            return Err(HomesteadError::validation("Invalid email address format"));
        }
        Ok(())
    }
}

pub struct RegisterUserUseCase {
    user_repo: Arc<UserRepository>,
    password_service: Arc<PasswordService>,
    media: Arc<MediaGateway>,
}

impl RegisterUserUseCase {
    pub fn new(
        user_repo: Arc<UserRepository>,
        password_service: Arc<PasswordService>,
        media: Arc<MediaGateway>,
    ) -> Self {
        Self {
            user_repo,
            password_service,
            media,
        }
    }

    /// Register a user: uniqueness check, avatar upload, password hash,
    /// insert. The avatar upload completes before anything is written.
    pub async fn execute(
        &self,
        command: RegisterUserCommand,
        avatar: Option<&Path>,
    ) -> Result<User> {
        command.validate()?;

        let name = command.name.trim();
        let email = command.email.trim().to_lowercase();

        if self
            .user_repo
            .find_by_name_or_email(name, &email)
            .await?
            .is_some()
        {
            return Err(HomesteadError::duplicate("User", "name or email"));
        }

        let avatar_path =
            avatar.ok_or_else(|| HomesteadError::validation("Avatar file is required"))?;
        let asset = self.media.upload(avatar_path).await?;

        let password_hash = self.password_service.hash_password(&command.password)?;

        let user = User::new(name, email, password_hash, asset.url);
        self.user_repo.insert(&user).await?;

        info!(user_id = %user.id, "user registered");
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_fields_rejected() {
        let cmd = RegisterUserCommand {
            name: "  ".to_string(),
            email: "a@b.co".to_string(),
            password: "longenough".to_string(),
        };
        assert!(matches!(
            cmd.validate(),
            Err(HomesteadError::Validation { .. })
        ));

        let cmd = RegisterUserCommand {
            name: "ada".to_string(),
            email: "a@b.co".to_string(),
            password: "".to_string(),
        };
        assert!(cmd.validate().is_err());
    }

    #[test]
    fn test_email_format_checked() {
        let cmd = RegisterUserCommand {
            name: "ada".to_string(),
            email: "not-an-email".to_string(),
            password: "longenough".to_string(),
        };
        assert!(cmd.validate().is_err());

        let cmd = RegisterUserCommand {
            name: "ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "longenough".to_string(),
        };
        assert!(cmd.validate().is_ok());
    }

    #[test]
    fn test_email_pattern() {
        assert!(email_pattern().is_match("user@example.com"));
        assert!(email_pattern().is_match("user.name+tag@example.co.uk"));
        assert!(!email_pattern().is_match("@example.com"));
        assert!(!email_pattern().is_match("user@"));
    }
}
