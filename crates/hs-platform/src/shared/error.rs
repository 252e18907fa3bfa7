//! Platform Error Types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use thiserror::Error;

use crate::shared::response::ApiResponse;

#[derive(Error, Debug)]
pub enum HomesteadError {
    #[error("{entity_type} not found: {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Duplicate {entity_type}: {field} already in use")]
    Duplicate { entity_type: String, field: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Unauthenticated: {message}")]
    Unauthenticated { message: String },

    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {message}")]
    InvalidToken { message: String },

    #[error("Media upload failed: {message}")]
    UploadFailed { message: String },

    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] bson::ser::Error),

    #[error("Deserialization error: {0}")]
    Deserialization(#[from] bson::de::Error),

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl HomesteadError {
    pub fn not_found(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: entity_type.into(),
            id: id.into(),
        }
    }

    pub fn duplicate(entity_type: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Duplicate {
            entity_type: entity_type.into(),
            field: field.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation { message: message.into() }
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::Unauthenticated { message: message.into() }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden { message: message.into() }
    }

    pub fn upload_failed(message: impl Into<String>) -> Self {
        Self::UploadFailed { message: message.into() }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into() }
    }

    /// HTTP status this error maps to at the request boundary.
    pub fn status_code(&self) -> StatusCode {
        match self {
            HomesteadError::NotFound { .. } => StatusCode::NOT_FOUND,
            HomesteadError::Duplicate { .. } => StatusCode::CONFLICT,
            HomesteadError::Validation { .. } => StatusCode::BAD_REQUEST,
            HomesteadError::Unauthenticated { .. }
            | HomesteadError::TokenExpired
            | HomesteadError::InvalidToken { .. } => StatusCode::UNAUTHORIZED,
            HomesteadError::Forbidden { .. } => StatusCode::FORBIDDEN,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type Result<T> = std::result::Result<T, HomesteadError>;

impl IntoResponse for HomesteadError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Upstream/database details stay in the logs, not in the body.
        let message = match &self {
            HomesteadError::Database(e) => {
                tracing::error!(error = %e, "database error");
                "Database operation failed".to_string()
            }
            HomesteadError::Serialization(_) | HomesteadError::Deserialization(_) => {
                tracing::error!(error = %self, "document mapping error");
                "Internal data mapping error".to_string()
            }
            other => other.to_string(),
        };

        let body = ApiResponse::<serde_json::Value>::error(status.as_u16(), message);
        (status, Json(body)).into_response()
    }
}
