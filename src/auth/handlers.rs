// HTTP handlers for the user-management endpoints

use axum::{extract::State, http::StatusCode, Json};

use crate::auth::{
    error::AuthError,
    middleware::{AuthenticatedUser, SessionId},
    models::{
        JwtLoginResponse, LoginChoiceRequest, LoginChoiceResponse, LoginRequest, LogoutRequest,
        MessageResponse, PublicUser, RefreshRequest, RefreshResponse, RegisterRequest,
        RegisterResponse, SocialLoginRequest, SocialLoginResponse, TokenLoginResponse,
    },
};
use crate::AppState;

/// Register a new user
#[utoipa::path(
    post,
    path = "/api/users/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created", body = RegisterResponse),
        (status = 400, description = "Incomplete or invalid data"),
        (status = 500, description = "User creation failed")
    ),
    tag = "users"
)]
pub async fn register_handler(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AuthError> {
    let user = state.auth_service.register(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully".to_string(),
            user: user.into(),
        }),
    ))
}

/// Choose a login method and get the endpoint to follow
#[utoipa::path(
    post,
    path = "/api/users/login",
    request_body = LoginChoiceRequest,
    responses(
        (status = 200, description = "Redirect endpoint provided", body = LoginChoiceResponse),
        (status = 400, description = "Invalid login type")
    ),
    tag = "users"
)]
pub async fn login_redirect_handler(
    Json(request): Json<LoginChoiceRequest>,
) -> Result<Json<LoginChoiceResponse>, AuthError> {
    let next = match request.login_type.as_str() {
        "username" => "/api/users/login-token",
        "jwt" => "/api/users/login-jwt",
        "google" | "facebook" => "/api/users/login/social",
        _ => return Err(AuthError::InvalidLoginType),
    };

    Ok(Json(LoginChoiceResponse {
        next: next.to_string(),
        message: format!("Redirect to {} for {} login", next, request.login_type),
    }))
}

/// Login using username and password, issuing the opaque token
#[utoipa::path(
    post,
    path = "/api/users/login-token",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = TokenLoginResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 429, description = "Maximum login attempts exceeded")
    ),
    tag = "users"
)]
pub async fn login_token_handler(
    State(state): State<AppState>,
    SessionId(session): SessionId,
    Json(request): Json<LoginRequest>,
) -> Result<Json<TokenLoginResponse>, AuthError> {
    let (token, user) = state
        .auth_service
        .login_token(&session, &request.username, &request.password)
        .await?;

    Ok(Json(TokenLoginResponse {
        token,
        message: "Login successful".to_string(),
        user: user.into(),
    }))
}

/// Login using username and password, issuing a JWT access/refresh pair
#[utoipa::path(
    post,
    path = "/api/users/login-jwt",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful with JWT", body = JwtLoginResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 429, description = "Maximum login attempts exceeded")
    ),
    tag = "users"
)]
pub async fn login_jwt_handler(
    State(state): State<AppState>,
    SessionId(session): SessionId,
    Json(request): Json<LoginRequest>,
) -> Result<Json<JwtLoginResponse>, AuthError> {
    let (access, refresh, user) = state
        .auth_service
        .login_jwt(&session, &request.username, &request.password)
        .await?;

    Ok(Json(JwtLoginResponse {
        access,
        refresh,
        user: user.into(),
    }))
}

/// Login with an identity already verified by a social provider
#[utoipa::path(
    post,
    path = "/api/users/login/social",
    request_body = SocialLoginRequest,
    responses(
        (status = 200, description = "Login successful", body = SocialLoginResponse),
        (status = 400, description = "Unknown provider")
    ),
    tag = "users"
)]
pub async fn social_login_handler(
    State(state): State<AppState>,
    Json(request): Json<SocialLoginRequest>,
) -> Result<Json<SocialLoginResponse>, AuthError> {
    let (token, user) = state
        .auth_service
        .login_external(&request.provider, &request.email, request.username.as_deref())
        .await?;

    Ok(Json(SocialLoginResponse {
        token,
        user: user.into(),
    }))
}

/// Logout by blacklisting the presented refresh token
#[utoipa::path(
    post,
    path = "/api/users/logout",
    request_body = LogoutRequest,
    responses(
        (status = 200, description = "Token blacklisted successfully", body = MessageResponse),
        (status = 400, description = "Invalid or missing refresh token"),
        (status = 401, description = "Unauthenticated")
    ),
    tag = "users"
)]
pub async fn logout_handler(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Json(request): Json<LogoutRequest>,
) -> Result<Json<MessageResponse>, AuthError> {
    state.auth_service.logout(request.refresh.as_deref()).await?;
    Ok(Json(MessageResponse {
        message: "Logged out successfully".to_string(),
    }))
}

/// Mint a fresh access token from a refresh token
#[utoipa::path(
    post,
    path = "/api/users/refresh",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "New access token issued", body = RefreshResponse),
        (status = 401, description = "Invalid, expired, or revoked refresh token")
    ),
    tag = "users"
)]
pub async fn refresh_handler(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<RefreshResponse>, AuthError> {
    let access = state.auth_service.refresh(&request.refresh).await?;
    Ok(Json(RefreshResponse { access }))
}

/// List every user's public projection
#[utoipa::path(
    get,
    path = "/api/users/list",
    responses(
        (status = 200, description = "List of users", body = [PublicUser]),
        (status = 401, description = "Unauthenticated")
    ),
    tag = "users"
)]
pub async fn list_users_handler(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
) -> Result<Json<Vec<PublicUser>>, AuthError> {
    let users = state.auth_service.list_users().await?;
    Ok(Json(users))
}

/// The authenticated caller's own profile
#[utoipa::path(
    get,
    path = "/api/users/profile",
    responses(
        (status = 200, description = "User data retrieved successfully", body = PublicUser),
        (status = 401, description = "Unauthenticated")
    ),
    tag = "users"
)]
pub async fn profile_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<PublicUser>, AuthError> {
    let profile = state.auth_service.current_user(user.user_id).await?;
    Ok(Json(profile))
}
