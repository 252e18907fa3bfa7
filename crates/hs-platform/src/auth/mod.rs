//! Authentication
//!
//! Password hashing and JWT session tokens.

pub mod password_service;
pub mod token_service;

pub use password_service::PasswordService;
pub use token_service::{TokenClaims, TokenConfig, TokenKind, TokenService};
