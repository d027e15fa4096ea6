mod auth;
mod db;
mod validation;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use auth::handlers;
use auth::models::{
    JwtLoginResponse, LoginChoiceRequest, LoginChoiceResponse, LoginRequest, LogoutRequest,
    MessageResponse, PublicUser, RefreshRequest, RefreshResponse, RegisterRequest,
    RegisterResponse, SocialLoginRequest, SocialLoginResponse, TokenLoginResponse,
};
use auth::repository::{RevocationRepository, TokenRepository, UserRepository};
use auth::service::AuthService;
use auth::throttle::LoginThrottle;
use auth::token::TokenService;

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::register_handler,
        handlers::login_redirect_handler,
        handlers::login_token_handler,
        handlers::login_jwt_handler,
        handlers::social_login_handler,
        handlers::logout_handler,
        handlers::refresh_handler,
        handlers::list_users_handler,
        handlers::profile_handler,
    ),
    components(
        schemas(
            RegisterRequest, RegisterResponse, LoginRequest, LoginChoiceRequest,
            LoginChoiceResponse, TokenLoginResponse, JwtLoginResponse, SocialLoginRequest,
            SocialLoginResponse, LogoutRequest, RefreshRequest, RefreshResponse,
            MessageResponse, PublicUser,
        )
    ),
    tags(
        (name = "users", description = "User registration, login, and profile endpoints")
    ),
    info(
        title = "User Management API",
        version = "1.0.0",
        description = "RESTful API for user registration, authentication, and profiles"
    )
)]
struct ApiDoc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub auth_service: AuthService,
}

/// Creates and configures the application router
pub fn create_router(db: PgPool, jwt_secret: String) -> Router {
    use tower_http::cors::{Any, CorsLayer};

    let auth_service = AuthService::new(
        UserRepository::new(db.clone()),
        TokenRepository::new(db.clone()),
        RevocationRepository::new(db.clone()),
        TokenService::new(jwt_secret),
        Arc::new(LoginThrottle::new()),
    );

    let state = AppState { db, auth_service };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/api/users/register", post(handlers::register_handler))
        .route("/api/users/login", post(handlers::login_redirect_handler))
        .route("/api/users/login-token", post(handlers::login_token_handler))
        .route("/api/users/login-jwt", post(handlers::login_jwt_handler))
        .route("/api/users/login/social", post(handlers::social_login_handler))
        .route("/api/users/logout", post(handlers::logout_handler))
        .route("/api/users/refresh", post(handlers::refresh_handler))
        .route("/api/users/list", get(handlers::list_users_handler))
        .route("/api/users/profile", get(handlers::profile_handler))
        .layer(cors)
        .with_state(state)
}

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    tracing::info!("User Management API - Starting...");

    let database_url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set in environment");
    let jwt_secret = std::env::var("JWT_SECRET")
        .expect("JWT_SECRET must be set in environment");
    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("PORT").unwrap_or_else(|_| "8080".to_string());

    tracing::info!("Connecting to database...");
    let db_pool = db::create_pool(&database_url)
        .await
        .expect("Failed to create database pool");

    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Migrations completed successfully");

    let app = create_router(db_pool, jwt_secret);

    let addr = format!("{}:{}", host, port);
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("User Management API is running on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    // Peer addresses feed the throttle's session-key fallback
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("Server error");
}

#[cfg(test)]
mod tests;
