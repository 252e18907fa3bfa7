//! Homestead Server
//!
//! Production server for the property-listing REST APIs:
//! - Users: register, login/logout, refresh, lookup, view history
//! - Properties: search, detail, create/update/delete
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `HS_API_PORT` | `8080` | HTTP API port |
//! | `HS_MONGO_URL` | `mongodb://localhost:27017` | MongoDB connection URL |
//! | `HS_MONGO_DB` | `homestead` | MongoDB database name |
//! | `HS_JWT_SECRET` | - | HMAC secret for session tokens (required) |
//! | `HS_JWT_ISSUER` | `homestead` | JWT issuer claim |
//! | `HS_MEDIA_URL` | - | Media store base endpoint (required) |
//! | `HS_MEDIA_PRESET` | `homestead` | Media store unsigned upload preset |
//! | `HS_COOKIE_SECURE` | `false` | Set the Secure flag on session cookies |
//! | `HS_CORS_ORIGIN` | - | Allowed CORS origin (any origin if unset) |
//! | `RUST_LOG` | `info` | Log level |

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{http::HeaderValue, response::Json, routing::get, Router};
use tokio::{net::TcpListener, signal};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use utoipa_axum::router::OpenApiRouter;
use utoipa_swagger_ui::SwaggerUi;

use hs_platform::api::{
    properties_router, users_router, AppState, AuthLayer, PropertiesState, UsersState,
};
use hs_platform::operations::{
    CreatePropertyUseCase, DeletePropertyUseCase, LoginUserUseCase, RefreshSessionUseCase,
    RegisterUserUseCase, UpdatePropertyUseCase,
};
use hs_platform::{
    MediaConfig, MediaGateway, PasswordService, PropertyRepository, TokenConfig, TokenService,
    UserRepository,
};

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_or_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[tokio::main]
async fn main() -> Result<()> {
    hs_common::logging::init_logging("hs-server");

    info!("Starting Homestead Server");

    // Configuration from environment
    let api_port: u16 = env_or_parse("HS_API_PORT", 8080);
    let mongo_url = env_or("HS_MONGO_URL", "mongodb://localhost:27017");
    let mongo_db = env_or("HS_MONGO_DB", "homestead");
    let jwt_secret =
        std::env::var("HS_JWT_SECRET").context("HS_JWT_SECRET must be set")?;
    let jwt_issuer = env_or("HS_JWT_ISSUER", "homestead");
    let media_url =
        std::env::var("HS_MEDIA_URL").context("HS_MEDIA_URL must be set")?;
    let media_preset = env_or("HS_MEDIA_PRESET", "homestead");
    let cookie_secure: bool = env_or_parse("HS_COOKIE_SECURE", false);

    // Connect to MongoDB
    info!("Connecting to MongoDB: {}/{}", mongo_url, mongo_db);
    let mongo_client = mongodb::Client::with_uri_str(&mongo_url).await?;
    let db = mongo_client.database(&mongo_db);

    // Repositories
    let user_repo = Arc::new(UserRepository::new(&db));
    let property_repo = Arc::new(PropertyRepository::new(&db));
    info!("Repositories initialized");

    // Services
    let token_config = TokenConfig {
        secret: jwt_secret,
        issuer: jwt_issuer,
        ..TokenConfig::default()
    };
    let access_expiry = token_config.access_token_expiry_secs;
    let refresh_expiry = token_config.refresh_token_expiry_secs;
    let token_service = Arc::new(TokenService::new(token_config));
    let password_service = Arc::new(PasswordService::default());
    let media = Arc::new(MediaGateway::new(MediaConfig {
        base_url: media_url,
        upload_preset: media_preset,
    }));
    info!("Auth and media services initialized");

    // Use cases
    let register_use_case = Arc::new(RegisterUserUseCase::new(
        user_repo.clone(),
        password_service.clone(),
        media.clone(),
    ));
    let login_use_case = Arc::new(LoginUserUseCase::new(
        user_repo.clone(),
        password_service.clone(),
        token_service.clone(),
    ));
    let refresh_use_case = Arc::new(RefreshSessionUseCase::new(
        user_repo.clone(),
        token_service.clone(),
    ));
    let create_use_case = Arc::new(CreatePropertyUseCase::new(
        mongo_client.clone(),
        property_repo.clone(),
        user_repo.clone(),
        media.clone(),
    ));
    let update_use_case = Arc::new(UpdatePropertyUseCase::new(
        property_repo.clone(),
        media.clone(),
    ));
    let delete_use_case = Arc::new(DeletePropertyUseCase::new(
        mongo_client.clone(),
        property_repo.clone(),
        user_repo.clone(),
    ));

    // API states
    let app_state = AppState {
        token_service: token_service.clone(),
    };
    let users_state = UsersState {
        user_repo: user_repo.clone(),
        property_repo: property_repo.clone(),
        register_use_case,
        login_use_case,
        refresh_use_case,
        cookie_secure,
        access_cookie_max_age_secs: access_expiry,
        refresh_cookie_max_age_secs: refresh_expiry,
    };
    let properties_state = PropertiesState {
        property_repo,
        user_repo,
        create_use_case,
        update_use_case,
        delete_use_case,
    };

    // Build the API router with auto-collected OpenAPI paths
    let (router, mut openapi) = OpenApiRouter::new()
        .nest("/api/v1/users", users_router(users_state))
        .nest("/api/v1/properties", properties_router(properties_state))
        .split_for_parts();

    openapi.info.title = "Homestead API".to_string();
    openapi.info.version = "1.0.0".to_string();
    openapi.info.description =
        Some("REST APIs for property listings, users, and sessions".to_string());

    let cors = match std::env::var("HS_CORS_ORIGIN") {
        Ok(origin) => {
            let origin: HeaderValue = origin.parse().context("Invalid HS_CORS_ORIGIN")?;
            CorsLayer::new()
                .allow_origin(origin)
                .allow_methods(Any)
                .allow_headers(Any)
        }
        Err(_) => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    };

    let app = Router::new()
        .merge(router)
        .route("/health", get(health_handler))
        .merge(SwaggerUi::new("/swagger-ui").url("/q/openapi", openapi))
        .layer(AuthLayer::new(app_state))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start API server
    let api_addr = format!("0.0.0.0:{}", api_port);
    info!("API server listening on http://{}", api_addr);

    let api_listener = TcpListener::bind(&api_addr).await?;
    let api_task = tokio::spawn(async move {
        axum::serve(api_listener, app).await.unwrap();
    });

    info!("Homestead Server started");
    info!("Press Ctrl+C to shutdown");

    shutdown_signal().await;
    info!("Shutdown signal received...");

    api_task.abort();

    info!("Homestead Server shutdown complete");
    Ok(())
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
