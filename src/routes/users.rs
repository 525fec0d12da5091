//! User management route handlers
//!
//! CRUD endpoints for user accounts plus the legacy credential-check login.

use crate::auth::{hash_password, verify_password};
use crate::db::store::{self, Changes};
use crate::error::{ApiResult, AppError};
use crate::models::{User, UserCreate, UserLogin, UserUpdate};
use crate::pagination::PageParams;
use crate::response::ApiResponse;
use crate::state::SharedState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde_json::json;
use tracing::{debug, info};
use validator::Validate;

/// Check uniqueness and insert a new user. Shared with the auth router.
pub(super) async fn insert_user(
    client: &tokio_postgres::Client,
    payload: &UserCreate,
) -> Result<User, AppError> {
    // Pre-insert existence check; the unique indexes are the backstop
    if store::exists::<User, _>(
        client,
        "username = $1 OR email = $2",
        &[&payload.username, &payload.email],
    )
    .await?
    {
        return Err(AppError::Conflict(
            "Username or email already registered.".to_string(),
        ));
    }

    let password_hash = hash_password(&payload.password)?;
    let now = Utc::now();

    store::insert(
        client,
        &[
            "username",
            "email",
            "password_hash",
            "is_active",
            "is_superuser",
            "created_at",
            "updated_at",
        ],
        &[
            &payload.username,
            &payload.email,
            &password_hash,
            &true,
            &false,
            &now,
            &now,
        ],
    )
    .await
    .map_err(|e| e.conflict_message("Username or email already registered."))
}

/// POST /api/v1/users/create
pub async fn create_user(
    State(state): State<SharedState>,
    Json(payload): Json<UserCreate>,
) -> ApiResult<(StatusCode, Json<ApiResponse<User>>)> {
    payload.validate()?;

    let conn = state.db_pool.get().await?;
    let client: &tokio_postgres::Client = &conn;

    let user = insert_user(client, &payload).await?;
    info!("User created: {} (id: {})", user.username, user.id);

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(user, "User created successfully.")),
    ))
}

/// GET /api/v1/users/list
pub async fn list_users(
    State(state): State<SharedState>,
    Query(params): Query<PageParams>,
) -> ApiResult<Json<ApiResponse<Vec<User>>>> {
    let conn = state.db_pool.get().await?;
    let client: &tokio_postgres::Client = &conn;

    let page = store::fetch_page::<User, _>(client, "created_at DESC", &params).await?;
    let meta = serde_json::to_value(&page.meta)
        .map_err(|e| AppError::Internal(format!("Failed to serialize meta: {}", e)))?;

    Ok(Json(ApiResponse::success_with_meta(
        page.items,
        "Users fetched successfully.",
        meta,
    )))
}

/// GET /api/v1/users/retrieve/{id}
pub async fn retrieve_user(
    State(state): State<SharedState>,
    Path(id): Path<i32>,
) -> ApiResult<Json<ApiResponse<User>>> {
    let conn = state.db_pool.get().await?;
    let client: &tokio_postgres::Client = &conn;

    let user = store::fetch_by_id::<User, _>(client, id).await?;

    Ok(Json(ApiResponse::success(
        user,
        "User retrieved successfully.",
    )))
}

/// PUT /api/v1/users/update/{id}
pub async fn update_user(
    State(state): State<SharedState>,
    Path(id): Path<i32>,
    Json(payload): Json<UserUpdate>,
) -> ApiResult<Json<ApiResponse<User>>> {
    payload.validate()?;

    let conn = state.db_pool.get().await?;
    let client: &tokio_postgres::Client = &conn;

    // Hash first so the change set borrows a stable value
    let password_hash = payload.password.as_deref().map(hash_password).transpose()?;

    let mut changes = Changes::new();
    if let Some(username) = &payload.username {
        changes.set("username", username);
    }
    if let Some(email) = &payload.email {
        changes.set("email", email);
    }
    if let Some(hash) = &password_hash {
        changes.set("password_hash", hash);
    }

    let user = store::update_by_id::<User, _>(client, id, changes)
        .await
        .map_err(|e| e.conflict_message("Username or email already registered."))?;
    info!("User updated: {} (id: {})", user.username, user.id);

    Ok(Json(ApiResponse::success(
        user,
        "User updated successfully.",
    )))
}

/// DELETE /api/v1/users/delete/{id}
///
/// Legacy hard delete; the row is physically removed.
pub async fn delete_user(
    State(state): State<SharedState>,
    Path(id): Path<i32>,
) -> ApiResult<Json<ApiResponse<()>>> {
    let conn = state.db_pool.get().await?;
    let client: &tokio_postgres::Client = &conn;

    store::hard_delete_by_id::<User, _>(client, id).await?;
    info!("User deleted (id: {})", id);

    Ok(Json(ApiResponse::success_message(
        "User deleted successfully.",
    )))
}

/// POST /api/v1/users/login
///
/// Credential check without token issuance.
pub async fn login(
    State(state): State<SharedState>,
    Json(payload): Json<UserLogin>,
) -> ApiResult<Json<ApiResponse<serde_json::Value>>> {
    debug!("Credential check: {}", payload.username);

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

    Ok(Json(ApiResponse::success(
        json!({ "username": user.username }),
        "Login successful.",
    )))
}
