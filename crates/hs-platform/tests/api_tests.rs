//! Platform API Integration Tests
//!
//! Tests for domain models, credentials, and error mapping.

use hs_platform::auth::password_service::{Argon2Config, PasswordPolicy};
use hs_platform::auth::token_service::{hash_refresh_token, TokenConfig, TokenKind};
use hs_platform::media::gateway::public_id_from_url;
use hs_platform::operations::{CreatePropertyCommand, RegisterUserCommand, UpdatePropertyCommand};
use hs_platform::{
    ApiResponse, CreatorPublic, HomesteadError, PasswordService, Property, TokenService, User,
};

// Unit tests for domain models
mod domain_tests {
    use super::*;

    #[test]
    fn test_user_creation() {
        let user = User::new("ada", "Ada@Example.COM", "$argon2id$hash", "https://a/1.png");

        assert!(!user.id.is_empty());
        assert_eq!(user.email, "ada@example.com");
        assert!(user.refresh_token_hash.is_none());
        assert!(user.owned_properties.is_empty());
    }

    #[test]
    fn test_property_creation_and_ownership() {
        let property = Property::new(
            "Canal house",
            "Three floors on the water",
            "townhouse",
            "Amsterdam",
            850_000.0,
            "https://res.example.com/hs/image/upload/v1/listings/c1.jpg",
            None,
            "user-9",
        );

        assert!(property.is_owned_by("user-9"));
        assert!(!property.is_owned_by("user-1"));
        assert!(property.price > 0.0);
    }

    #[test]
    fn test_bidirectional_link_fields_agree() {
        // Create property P for user U: U.owned_properties must contain
        // P.id and P.creator must equal U.id. The repository pair does
        // this inside one transaction; here we check the entity halves.
        let mut user = User::new("bo", "bo@example.com", "h", "a");
        let property = Property::new(
            "Cabin",
            "Small cabin",
            "cabin",
            "Oslo",
            90_000.0,
            "https://res.example.com/hs/image/upload/cab.jpg",
            None,
            &user.id,
        );
        user.owned_properties.push(property.id.clone());

        assert!(user.owns(&property.id));
        assert_eq!(property.creator, user.id);
    }

    #[test]
    fn test_creator_public_projection_is_safe() {
        let user = User::new("ada", "ada@example.com", "super-secret-hash", "https://a/1.png");
        let public = CreatorPublic::from(&user);
        let json = serde_json::to_string(&public).unwrap();

        assert!(!json.contains("super-secret-hash"));
        assert!(!json.contains("refreshToken"));
    }

    #[test]
    fn test_viewed_history_set_semantics() {
        let mut user = User::new("ada", "ada@example.com", "h", "a");

        // Mirrors the $addToSet behavior the repository relies on.
        for _ in 0..2 {
            if !user.has_viewed("prop-1") {
                user.viewed_history.push("prop-1".to_string());
            }
        }

        assert_eq!(user.viewed_history.len(), 1);
    }
}

mod credential_tests {
    use super::*;

    fn password_service() -> PasswordService {
        PasswordService::new(Argon2Config::testing(), PasswordPolicy::default())
    }

    fn token_service() -> TokenService {
        TokenService::new(TokenConfig {
            secret: "integration-test-secret".to_string(),
            ..TokenConfig::default()
        })
    }

    #[test]
    fn test_stored_password_is_never_plaintext() {
        let service = password_service();
        let hash = service.hash_password("hunter22hunter22").unwrap();

        assert_ne!(hash, "hunter22hunter22");
        assert!(service.verify_password("hunter22hunter22", &hash).unwrap());
        assert!(!service.verify_password("hunter23hunter23", &hash).unwrap());
    }

    #[test]
    fn test_login_token_pair_round_trips() {
        let tokens = token_service();

        let access = tokens.issue_access_token("user-1").unwrap();
        let refresh = tokens.issue_refresh_token("user-1").unwrap();

        assert_eq!(tokens.validate(&access, TokenKind::Access).unwrap().sub, "user-1");
        assert_eq!(tokens.validate(&refresh, TokenKind::Refresh).unwrap().sub, "user-1");

        // Kinds are not interchangeable.
        assert!(tokens.validate(&access, TokenKind::Refresh).is_err());
        assert!(tokens.validate(&refresh, TokenKind::Access).is_err());
    }

    #[test]
    fn test_refresh_hash_matches_only_its_token() {
        let tokens = token_service();
        let refresh = tokens.issue_refresh_token("user-1").unwrap();
        let stored = hash_refresh_token(&refresh);

        assert_eq!(hash_refresh_token(&refresh), stored);
        let other = tokens.issue_refresh_token("user-1").unwrap();
        assert_ne!(hash_refresh_token(&other), stored);
    }
}

mod validation_tests {
    use super::*;

    #[test]
    fn test_register_requires_all_fields() {
        let cmd = RegisterUserCommand {
            name: "".to_string(),
            email: "a@b.co".to_string(),
            password: "longenough".to_string(),
        };
        assert!(matches!(cmd.validate(), Err(HomesteadError::Validation { .. })));
    }

    #[test]
    fn test_create_property_rejects_bad_price() {
        let cmd = CreatePropertyCommand {
            title: "T".to_string(),
            description: "D".to_string(),
            property_type: "villa".to_string(),
            location: "L".to_string(),
            price: -1.0,
        };
        assert!(cmd.validate().is_err());
    }

    #[test]
    fn test_update_with_no_fields_is_detectable() {
        let cmd = UpdatePropertyCommand::default();
        assert!(!cmd.has_changes());
    }

    #[test]
    fn test_update_partial_fields_validate_independently() {
        let cmd = UpdatePropertyCommand {
            price: Some(125_000.0),
            ..Default::default()
        };
        assert!(cmd.has_changes());
        assert!(cmd.validate().is_ok());
    }
}

mod media_tests {
    use super::*;

    #[test]
    fn test_public_id_round_trip_from_delivery_url() {
        let url = "https://res.example.com/hs/image/upload/v1712000000/listings/villa-9.jpg";
        assert_eq!(public_id_from_url(url).unwrap(), "listings/villa-9");
    }

    #[test]
    fn test_unrecognized_url_fails_instead_of_skipping_cleanup() {
        assert!(public_id_from_url("https://cdn.other.example/villa-9.jpg").is_err());
    }
}

mod error_tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_error_status_mapping() {
        assert_eq!(
            HomesteadError::validation("x").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            HomesteadError::unauthenticated("x").status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            HomesteadError::forbidden("x").status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            HomesteadError::not_found("Property", "p1").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            HomesteadError::duplicate("User", "email").status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            HomesteadError::upload_failed("x").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_envelope_is_uniform_for_errors() {
        let body = ApiResponse::<serde_json::Value>::error(403, "Only the creator may update");
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["statusCode"], 403);
        assert_eq!(json["success"], false);
        assert!(json["data"].is_null());
        assert!(json["message"].as_str().unwrap().contains("creator"));
    }
}
