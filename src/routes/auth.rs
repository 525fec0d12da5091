//! Authentication route handlers
//!
//! Provides register, login, token refresh, and account endpoints.

use crate::auth::{create_tokens, hash_password, refresh_tokens, verify_password, Claims, TokenPair};
use crate::db::store::{self, Changes};
use crate::error::{ApiResult, AppError};
use crate::models::{User, UserCreate, UserLogin};
use crate::response::ApiResponse;
use crate::state::SharedState;
use axum::{
    extract::{Extension, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use validator::Validate;

// ============================================
// Request/Response Types
// ============================================

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    #[validate(length(min = 8, message = "new_password must be at least 8 characters"))]
    pub new_password: String,
}

/// Authenticated user plus their token pair
#[derive(Debug, Serialize)]
pub struct AuthData {
    pub user: User,
    pub tokens: TokenPair,
}

// ============================================
// Route Handlers
// ============================================

/// POST /api/v1/auth/register
///
/// Register a new account and receive JWT tokens.
pub async fn register(
    State(state): State<SharedState>,
    Json(payload): Json<UserCreate>,
) -> ApiResult<(StatusCode, Json<ApiResponse<AuthData>>)> {
    payload.validate()?;

    let conn = state.db_pool.get().await?;
    let client: &tokio_postgres::Client = &conn;

    let user = super::users::insert_user(client, &payload).await?;
    info!("User registered: {} (id: {})", user.username, user.id);

    let tokens = create_tokens(user.id, &user.username)?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            AuthData { user, tokens },
            "User registered successfully.",
        )),
    ))
}

/// POST /api/v1/auth/login
///
/// Authenticate with username and password, receive JWT tokens.
pub async fn login(
    State(state): State<SharedState>,
    Json(payload): Json<UserLogin>,
) -> ApiResult<Json<ApiResponse<AuthData>>> {
    debug!("Login attempt: {}", payload.username);

    let conn = state.db_pool.get().await?;
    let client: &tokio_postgres::Client = &conn;

    let user = store::fetch_optional::<User, _>(client, "username = $1", &[&payload.username])
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid username or password".to_string()))?;

    if !verify_password(&payload.password, &user.password_hash)? {
        return Err(AppError::Unauthorized(
            "Invalid username or password".to_string(),
        ));
    }

    if !user.is_active {
        return Err(AppError::BadRequest("Inactive user account".to_string()));
    }

    let tokens = create_tokens(user.id, &user.username)?;

    Ok(Json(ApiResponse::success(
        AuthData { user, tokens },
        "Login successful.",
    )))
}

/// POST /api/v1/auth/refresh
///
/// Refresh access token using refresh token.
pub async fn refresh(
    Json(payload): Json<RefreshRequest>,
) -> ApiResult<Json<ApiResponse<TokenPair>>> {
    let tokens = refresh_tokens(&payload.refresh_token)?;

    Ok(Json(ApiResponse::success(
        tokens,
        "Token refreshed successfully.",
    )))
}

/// GET /api/v1/auth/me
///
/// Get the current user from the bearer token.
pub async fn me(
    State(state): State<SharedState>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<Json<ApiResponse<User>>> {
    let conn = state.db_pool.get().await?;
    let client: &tokio_postgres::Client = &conn;

    let user = match store::fetch_by_id::<User, _>(client, claims.sub).await {
        Ok(user) => user,
        Err(AppError::NotFound(_)) => {
            return Err(AppError::Unauthorized("User not found".to_string()))
        }
        Err(e) => return Err(e),
    };

    Ok(Json(ApiResponse::success(
        user,
        "User retrieved successfully.",
    )))
}

/// POST /api/v1/auth/logout
///
/// Logout (client-side token removal).
pub async fn logout(Extension(claims): Extension<Claims>) -> Json<ApiResponse<()>> {
    debug!("Logout: {}", claims.username);
    Json(ApiResponse::success_message(
        "Logout successful. Please remove token from client.",
    ))
}

/// POST /api/v1/auth/change-password
///
/// Change the current user's password.
pub async fn change_password(
    State(state): State<SharedState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<ChangePasswordRequest>,
) -> ApiResult<Json<ApiResponse<()>>> {
    payload.validate()?;

    let conn = state.db_pool.get().await?;
    let client: &tokio_postgres::Client = &conn;

    let user = match store::fetch_by_id::<User, _>(client, claims.sub).await {
        Ok(user) => user,
        Err(AppError::NotFound(_)) => {
            return Err(AppError::Unauthorized("User not found".to_string()))
        }
        Err(e) => return Err(e),
    };

    if !verify_password(&payload.current_password, &user.password_hash)? {
        return Err(AppError::BadRequest("Invalid current password".to_string()));
    }

    let password_hash = hash_password(&payload.new_password)?;

    let mut changes = Changes::new();
    changes.set("password_hash", &password_hash);
    changes.set("updated_by", &claims.sub);

    let _ = store::update_by_id::<User, _>(client, claims.sub, changes).await?;
    info!("Password changed for user {}", claims.sub);

    Ok(Json(ApiResponse::success_message(
        "Password changed successfully.",
    )))
}
