//! Homestead Platform
//!
//! Property-listing backend core:
//! - User registration, login/logout, and view history
//! - Property listings with ownership-checked mutations
//! - JWT session tokens (access + refresh) with cookie or bearer delivery
//! - Media uploads delegated to a remote store
//!
//! ## Module Organization (Aggregate-based)
//!
//! Each aggregate contains:
//! - `entity` - Domain entities
//! - `repository` - Data access
//! - `api` - REST endpoints
//! - `operations` - Use case operations (where applicable)

// Core aggregates
pub mod property;
pub mod user;

// Authentication & media
pub mod auth;
pub mod media;

// Shared infrastructure
pub mod shared;

// Re-export common types from shared
pub use shared::error::{HomesteadError, Result};
pub use shared::response::ApiResponse;

// Re-export main entity types for convenience
pub use property::entity::Property;
pub use user::entity::{CreatorPublic, User};

// Re-export repositories
pub use property::repository::PropertyRepository;
pub use user::repository::UserRepository;

// Re-export services
pub use auth::password_service::PasswordService;
pub use auth::token_service::{TokenConfig, TokenKind, TokenService};
pub use media::gateway::{MediaConfig, MediaGateway};

/// API surface re-exports
pub mod api {
    pub use crate::property::api::{properties_router, PropertiesState};
    pub use crate::shared::middleware::{AppState, AuthLayer, Authenticated, Identity};
    pub use crate::user::api::{users_router, UsersState};
}

/// Use-case re-exports
pub mod operations {
    pub use crate::property::operations::{
        CreatePropertyCommand, CreatePropertyUseCase, DeletePropertyUseCase,
        UpdatePropertyCommand, UpdatePropertyUseCase,
    };
    pub use crate::user::operations::{
        LoginCommand, LoginUserUseCase, RefreshSessionUseCase, RegisterUserCommand,
        RegisterUserUseCase,
    };
}
