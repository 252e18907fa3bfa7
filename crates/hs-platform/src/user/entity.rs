//! User Entity

use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered user.
///
/// `owned_properties` is the denormalized back-reference to the
/// properties this user created; it is kept consistent with
/// `Property.creator` inside the same transaction on create/delete.
/// `viewed_history` has set semantics (`$addToSet`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,

    /// Display name (unique).
    pub name: String,

    /// Email address (unique, stored lowercase).
    pub email: String,

    /// Argon2id PHC hash. Never exposed through the API.
    pub password_hash: String,

    /// SHA-256 hash of the active refresh token; `None` when logged out.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token_hash: Option<String>,

    /// Avatar delivery URL from the media store.
    pub avatar_url: String,

    /// Ids of properties this user created, in creation order.
    #[serde(default)]
    pub owned_properties: Vec<String>,

    /// Ids of properties this user has viewed (set semantics).
    #[serde(default)]
    pub viewed_history: Vec<String>,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
        avatar_url: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            email: email.into().to_lowercase(),
            password_hash: password_hash.into(),
            refresh_token_hash: None,
            avatar_url: avatar_url.into(),
            owned_properties: Vec::new(),
            viewed_history: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn owns(&self, property_id: &str) -> bool {
        self.owned_properties.iter().any(|p| p == property_id)
    }

    pub fn has_viewed(&self, property_id: &str) -> bool {
        self.viewed_history.iter().any(|p| p == property_id)
    }
}

/// The subset of user fields safe to embed in another entity's response.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatorPublic {
    pub id: String,
    pub name: String,
    pub email: String,
    pub avatar_url: String,
}

impl From<&User> for CreatorPublic {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            avatar_url: user.avatar_url.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user() {
        let user = User::new("ada", "Ada@Example.com", "$argon2id$hash", "https://a/img.png");

        assert!(!user.id.is_empty());
        assert_eq!(user.email, "ada@example.com");
        assert!(user.refresh_token_hash.is_none());
        assert!(user.owned_properties.is_empty());
        assert!(user.viewed_history.is_empty());
    }

    #[test]
    fn test_ownership_and_history_checks() {
        let mut user = User::new("ada", "ada@example.com", "h", "u");
        user.owned_properties.push("prop-1".to_string());
        user.viewed_history.push("prop-2".to_string());

        assert!(user.owns("prop-1"));
        assert!(!user.owns("prop-2"));
        assert!(user.has_viewed("prop-2"));
        assert!(!user.has_viewed("prop-1"));
    }

    #[test]
    fn test_creator_public_omits_secrets() {
        let user = User::new("ada", "ada@example.com", "secret-hash", "https://a/img.png");
        let public = CreatorPublic::from(&user);

        let json = serde_json::to_string(&public).unwrap();
        assert!(json.contains("ada@example.com"));
        assert!(!json.contains("secret-hash"));
        assert!(!json.contains("password"));
    }
}
