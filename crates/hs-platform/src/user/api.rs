//! Users API
//!
//! REST endpoints for registration, login/logout, user lookup, and view
//! history.

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::property::api::expand_creators;
use crate::property::repository::PropertyRepository;
use crate::shared::api_common::collect_multipart;
use crate::shared::error::{HomesteadError, Result};
use crate::shared::middleware::{Authenticated, ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE};
use crate::shared::response::ApiResponse;
use crate::user::entity::User;
use crate::user::operations::{
    LoginCommand, LoginUserUseCase, RefreshSessionUseCase, RegisterUserCommand,
    RegisterUserUseCase,
};
use crate::user::repository::UserRepository;

/// User document as exposed through the API. Password and refresh-token
/// hashes never appear here.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub avatar_url: String,
    pub owned_properties: Vec<String>,
    pub viewed_history: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
            avatar_url: u.avatar_url,
            owned_properties: u.owned_properties,
            viewed_history: u.viewed_history,
            created_at: u.created_at.to_rfc3339(),
            updated_at: u.updated_at.to_rfc3339(),
        }
    }
}

/// Login request body.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response body. Tokens are also set as http-only cookies.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponseData {
    pub user: UserResponse,
    pub access_token: String,
    pub refresh_token: String,
}

/// Query parameters for the public user listing.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListUsersQuery {
    pub limit: Option<i64>,
}

/// Users service state.
#[derive(Clone)]
pub struct UsersState {
    pub user_repo: Arc<UserRepository>,
    pub property_repo: Arc<PropertyRepository>,
    pub register_use_case: Arc<RegisterUserUseCase>,
    pub login_use_case: Arc<LoginUserUseCase>,
    pub refresh_use_case: Arc<RefreshSessionUseCase>,
    /// Whether session cookies carry the Secure flag.
    pub cookie_secure: bool,
    /// Access cookie lifetime in seconds.
    pub access_cookie_max_age_secs: i64,
    /// Refresh cookie lifetime in seconds.
    pub refresh_cookie_max_age_secs: i64,
}

fn session_cookie(
    name: &'static str,
    value: String,
    max_age_secs: i64,
    secure: bool,
) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(max_age_secs))
        .build()
}

fn expired_cookie(name: &'static str) -> Cookie<'static> {
    Cookie::build((name, ""))
        .path("/")
        .http_only(true)
        .max_age(time::Duration::ZERO)
        .build()
}

/// Register a new user
///
/// Multipart form: `name`, `email`, `password` text fields plus a
/// required `avatar` file part.
#[utoipa::path(
    post,
    path = "/register",
    tag = "users",
    operation_id = "postUsersRegister",
    responses(
        (status = 201, description = "User registered"),
        (status = 400, description = "Missing or invalid fields"),
        (status = 409, description = "Name or email already taken")
    )
)]
pub async fn register(
    State(state): State<UsersState>,
    multipart: Multipart,
) -> Result<impl IntoResponse> {
    let mut form = collect_multipart(multipart).await?;

    let command = RegisterUserCommand {
        name: form.text("name").unwrap_or_default().to_string(),
        email: form.text("email").unwrap_or_default().to_string(),
        password: form.text("password").unwrap_or_default().to_string(),
    };

    // Temp file lives until the end of the request, then is removed.
    let avatar = form.take_file("avatar");
    let user = state
        .register_use_case
        .execute(command, avatar.as_ref().map(|f| f.path()))
        .await?;

    let body = ApiResponse::created(UserResponse::from(user), "User registered successfully");
    Ok((StatusCode::CREATED, Json(body)))
}

/// Log in with email and password
///
/// On success the access/refresh pair is returned in the body and set as
/// http-only cookies.
#[utoipa::path(
    post,
    path = "/login",
    tag = "users",
    operation_id = "postUsersLogin",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = ApiResponse<LoginResponseData>),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<UsersState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse> {
    let outcome = state
        .login_use_case
        .execute(LoginCommand {
            email: req.email,
            password: req.password,
        })
        .await?;

    let jar = jar
        .add(session_cookie(
            ACCESS_TOKEN_COOKIE,
            outcome.access_token.clone(),
            state.access_cookie_max_age_secs,
            state.cookie_secure,
        ))
        .add(session_cookie(
            REFRESH_TOKEN_COOKIE,
            outcome.refresh_token.clone(),
            state.refresh_cookie_max_age_secs,
            state.cookie_secure,
        ));

    let data = LoginResponseData {
        user: UserResponse::from(outcome.user),
        access_token: outcome.access_token,
        refresh_token: outcome.refresh_token,
    };

    Ok((jar, Json(ApiResponse::ok(data, "User logged in successfully"))))
}

/// Refresh token request body. The token may also arrive via the
/// `refreshToken` cookie.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    pub refresh_token: Option<String>,
}

/// Refresh the session
///
/// Exchanges a valid refresh token for a new access/refresh pair. The
/// refresh token is rotated; the previous one stops working.
#[utoipa::path(
    post,
    path = "/refresh-token",
    tag = "users",
    operation_id = "postUsersRefreshToken",
    request_body = RefreshTokenRequest,
    responses(
        (status = 200, description = "Session refreshed", body = ApiResponse<LoginResponseData>),
        (status = 401, description = "Invalid or expired refresh token")
    )
)]
pub async fn refresh_session(
    State(state): State<UsersState>,
    jar: CookieJar,
    body: Option<Json<RefreshTokenRequest>>,
) -> Result<impl IntoResponse> {
    let raw_token = body
        .and_then(|Json(req)| req.refresh_token)
        .or_else(|| jar.get(REFRESH_TOKEN_COOKIE).map(|c| c.value().to_string()))
        .ok_or_else(|| HomesteadError::unauthenticated("Missing refresh token"))?;

    let outcome = state.refresh_use_case.execute(&raw_token).await?;

    let jar = jar
        .add(session_cookie(
            ACCESS_TOKEN_COOKIE,
            outcome.access_token.clone(),
            state.access_cookie_max_age_secs,
            state.cookie_secure,
        ))
        .add(session_cookie(
            REFRESH_TOKEN_COOKIE,
            outcome.refresh_token.clone(),
            state.refresh_cookie_max_age_secs,
            state.cookie_secure,
        ));

    let data = LoginResponseData {
        user: UserResponse::from(outcome.user),
        access_token: outcome.access_token,
        refresh_token: outcome.refresh_token,
    };

    Ok((jar, Json(ApiResponse::ok(data, "Session refreshed successfully"))))
}

/// Log out
///
/// Clears the persisted refresh-token hash and expires both cookies.
#[utoipa::path(
    post,
    path = "/logout",
    tag = "users",
    operation_id = "postUsersLogout",
    responses(
        (status = 200, description = "Logged out"),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = []))
)]
pub async fn logout(
    State(state): State<UsersState>,
    jar: CookieJar,
    auth: Authenticated,
) -> Result<impl IntoResponse> {
    state.user_repo.clear_refresh_token_hash(&auth.user_id).await?;

    let jar = jar
        .add(expired_cookie(ACCESS_TOKEN_COOKIE))
        .add(expired_cookie(REFRESH_TOKEN_COOKIE));

    let body = ApiResponse::ok(serde_json::json!({}), "User logged out successfully");
    Ok((jar, Json(body)))
}

/// List users (public listing)
#[utoipa::path(
    get,
    path = "",
    tag = "users",
    operation_id = "getUsers",
    params(
        ("limit" = Option<i64>, Query, description = "Maximum number of users to return")
    ),
    responses(
        (status = 200, description = "Users found", body = ApiResponse<Vec<UserResponse>>)
    )
)]
pub async fn list_users(
    State(state): State<UsersState>,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<ApiResponse<Vec<UserResponse>>>> {
    let limit = query.limit.unwrap_or(50).clamp(1, 200);
    let users = state.user_repo.find_all(limit).await?;

    let data: Vec<UserResponse> = users.into_iter().map(UserResponse::from).collect();
    Ok(Json(ApiResponse::ok(data, "All users found")))
}

/// Get the authenticated user's view history
///
/// Properties in stored view order, each with the creator's public
/// fields only.
#[utoipa::path(
    get,
    path = "/history",
    tag = "users",
    operation_id = "getUsersHistory",
    responses(
        (status = 200, description = "View history"),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_history(
    State(state): State<UsersState>,
    auth: Authenticated,
) -> Result<impl IntoResponse> {
    let user = state
        .user_repo
        .find_by_id(&auth.user_id)
        .await?
        .ok_or_else(|| HomesteadError::not_found("User", &auth.user_id))?;

    let properties = state
        .property_repo
        .find_by_ids_ordered(&user.viewed_history)
        .await?;
    let items = expand_creators(properties, &state.user_repo).await?;

    Ok(Json(ApiResponse::ok(items, "View history retrieved successfully")))
}

/// Get a user by id
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "users",
    operation_id = "getUserById",
    params(
        ("id" = String, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User found", body = ApiResponse<UserResponse>),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    State(state): State<UsersState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<UserResponse>>> {
    let user = state
        .user_repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| HomesteadError::not_found("User", &id))?;

    Ok(Json(ApiResponse::ok(
        UserResponse::from(user),
        "User information retrieved successfully",
    )))
}

pub fn users_router(state: UsersState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(register))
        .routes(routes!(login))
        .routes(routes!(refresh_session))
        .routes(routes!(logout))
        .routes(routes!(list_users))
        .routes(routes!(get_history))
        .routes(routes!(get_user))
        .with_state(state)
}
