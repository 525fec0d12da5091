//! Blog post route handlers

use crate::db::store::{self, Changes};
use crate::error::{ApiResult, AppError};
use crate::models::{Post, PostCreate, PostUpdate, User};
use crate::pagination::PageParams;
use crate::response::ApiResponse;
use crate::state::SharedState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use tracing::info;
use validator::Validate;

/// POST /api/v1/blog/posts/create
pub async fn create_post(
    State(state): State<SharedState>,
    Json(payload): Json<PostCreate>,
) -> ApiResult<(StatusCode, Json<ApiResponse<Post>>)> {
    payload.validate()?;

    let conn = state.db_pool.get().await?;
    let client: &tokio_postgres::Client = &conn;

    // The author must exist before we accept the post
    if !store::exists::<User, _>(client, "id = $1", &[&payload.author_id]).await? {
        return Err(AppError::BadRequest("Author does not exist.".to_string()));
    }

    let now = Utc::now();
    let post: Post = store::insert(
        client,
        &[
            "author_id",
            "title",
            "content",
            "created_at",
            "updated_at",
            "created_by",
        ],
        &[
            &payload.author_id,
            &payload.title,
            &payload.content,
            &now,
            &now,
            &payload.author_id,
        ],
    )
    .await?;
    info!("Post created: {} (id: {})", post.title, post.id);

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(post, "Post created successfully.")),
    ))
}

/// GET /api/v1/blog/posts/list
pub async fn list_posts(
    State(state): State<SharedState>,
    Query(params): Query<PageParams>,
) -> ApiResult<Json<ApiResponse<Vec<Post>>>> {
    let conn = state.db_pool.get().await?;
    let client: &tokio_postgres::Client = &conn;

    let page = store::fetch_page::<Post, _>(client, "created_at DESC", &params).await?;
    let meta = serde_json::to_value(&page.meta)
        .map_err(|e| AppError::Internal(format!("Failed to serialize meta: {}", e)))?;

    Ok(Json(ApiResponse::success_with_meta(
        page.items,
        "Posts fetched successfully.",
        meta,
    )))
}

/// GET /api/v1/blog/posts/retrieve/{id}
pub async fn retrieve_post(
    State(state): State<SharedState>,
    Path(id): Path<i32>,
) -> ApiResult<Json<ApiResponse<Post>>> {
    let conn = state.db_pool.get().await?;
    let client: &tokio_postgres::Client = &conn;

    let post = store::fetch_by_id::<Post, _>(client, id).await?;

    Ok(Json(ApiResponse::success(
        post,
        "Post retrieved successfully.",
    )))
}

/// PATCH /api/v1/blog/posts/update/{id}
pub async fn update_post(
    State(state): State<SharedState>,
    Path(id): Path<i32>,
    Json(payload): Json<PostUpdate>,
) -> ApiResult<Json<ApiResponse<Post>>> {
    payload.validate()?;

    let conn = state.db_pool.get().await?;
    let client: &tokio_postgres::Client = &conn;

    let mut changes = Changes::new();
    if let Some(title) = &payload.title {
        changes.set("title", title);
    }
    if let Some(content) = &payload.content {
        changes.set("content", content);
    }

    let post = store::update_by_id::<Post, _>(client, id, changes).await?;
    info!("Post updated (id: {})", post.id);

    Ok(Json(ApiResponse::success(
        post,
        "Post updated successfully.",
    )))
}

/// DELETE /api/v1/blog/posts/delete/{id}
///
/// Soft delete; the row stays behind flagged.
pub async fn delete_post(
    State(state): State<SharedState>,
    Path(id): Path<i32>,
) -> ApiResult<Json<ApiResponse<()>>> {
    let conn = state.db_pool.get().await?;
    let client: &tokio_postgres::Client = &conn;

    store::soft_delete_by_id::<Post, _>(client, id, None).await?;
    info!("Post deleted (id: {})", id);

    Ok(Json(ApiResponse::success_message(
        "Post deleted successfully.",
    )))
}
