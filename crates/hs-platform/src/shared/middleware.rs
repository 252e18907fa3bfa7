//! API Middleware
//!
//! Authentication middleware for Axum. Accepts a Bearer token in the
//! `Authorization` header or the same token in the `accessToken` cookie.
//! Authorization (ownership) is not done here; each write operation checks
//! the creator itself.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, header::COOKIE, request::Parts, StatusCode},
    response::{IntoResponse, Json, Response},
};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service};

use crate::auth::token_service::{extract_bearer_token, TokenKind, TokenService};
use crate::shared::response::ApiResponse;

/// Cookie carrying the access token (same value as the Bearer header).
pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";

/// Cookie carrying the refresh token.
pub const REFRESH_TOKEN_COOKIE: &str = "refreshToken";

/// Application state shared with every request via the auth layer.
#[derive(Clone)]
pub struct AppState {
    pub token_service: Arc<TokenService>,
}

/// The authenticated caller, resolved from a validated access token.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: String,
}

/// Extractor that rejects requests without a valid access token.
pub struct Authenticated(pub Identity);

impl std::ops::Deref for Authenticated {
    type Target = Identity;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Error response for authentication failures.
pub struct AuthError {
    pub status: StatusCode,
    pub message: String,
}

impl AuthError {
    fn unauthenticated(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: message.into(),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body =
            ApiResponse::<serde_json::Value>::error(self.status.as_u16(), self.message);
        (self.status, Json(body)).into_response()
    }
}

/// Pull the access token out of the request cookies.
fn extract_cookie_token(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|cookies| {
            cookies
                .split(';')
                .map(|c| c.trim())
                .find_map(|c| c.strip_prefix(&format!("{}=", ACCESS_TOKEN_COOKIE)))
                .map(|v| v.to_string())
        })
}

impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        let app_state = parts.extensions.get::<AppState>().ok_or(AuthError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "Auth service not configured".to_string(),
        })?;

        // Authorization header first, cookie as fallback.
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(extract_bearer_token)
            .map(String::from)
            .or_else(|| extract_cookie_token(parts))
            .ok_or_else(|| AuthError::unauthenticated("Missing authentication token"))?;

        let claims = app_state
            .token_service
            .validate(&token, TokenKind::Access)
            .map_err(|e| AuthError::unauthenticated(e.to_string()))?;

        Ok(Authenticated(Identity { user_id: claims.sub }))
    }
}

/// Layer that injects [`AppState`] into request extensions so the
/// [`Authenticated`] extractor can reach the token service.
#[derive(Clone)]
pub struct AuthLayer {
    state: AppState,
}

impl AuthLayer {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthMiddleware {
            inner,
            state: self.state.clone(),
        }
    }
}

#[derive(Clone)]
pub struct AuthMiddleware<S> {
    inner: S,
    state: AppState,
}

impl<S, B> Service<axum::http::Request<B>> for AuthMiddleware<S>
where
    S: Service<axum::http::Request<B>, Response = Response> + Send + Clone + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = std::result::Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<std::result::Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: axum::http::Request<B>) -> Self::Future {
        req.extensions_mut().insert(self.state.clone());

        let future = self.inner.call(req);
        Box::pin(async move { future.await })
    }
}
