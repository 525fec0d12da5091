//! Request log route handlers
//!
//! Read-only listings over the audit log tables, newest first.

use crate::db::store;
use crate::error::{ApiResult, AppError};
use crate::models::{ApiLog, ErrorLog};
use crate::pagination::PageParams;
use crate::response::ApiResponse;
use crate::state::SharedState;
use axum::{
    extract::{Query, State},
    Json,
};

/// GET /api/v1/logs/api-logs
pub async fn list_api_logs(
    State(state): State<SharedState>,
    Query(params): Query<PageParams>,
) -> ApiResult<Json<ApiResponse<Vec<ApiLog>>>> {
    let conn = state.db_pool.get().await?;
    let client: &tokio_postgres::Client = &conn;

    let page = store::fetch_page::<ApiLog, _>(client, "created_at DESC", &params).await?;
    let meta = serde_json::to_value(&page.meta)
        .map_err(|e| AppError::Internal(format!("Failed to serialize meta: {}", e)))?;

    Ok(Json(ApiResponse::success_with_meta(
        page.items,
        "API logs fetched successfully.",
        meta,
    )))
}

/// GET /api/v1/logs/error-logs
pub async fn list_error_logs(
    State(state): State<SharedState>,
    Query(params): Query<PageParams>,
) -> ApiResult<Json<ApiResponse<Vec<ErrorLog>>>> {
    let conn = state.db_pool.get().await?;
    let client: &tokio_postgres::Client = &conn;

    let page = store::fetch_page::<ErrorLog, _>(client, "created_at DESC", &params).await?;
    let meta = serde_json::to_value(&page.meta)
        .map_err(|e| AppError::Internal(format!("Failed to serialize meta: {}", e)))?;

    Ok(Json(ApiResponse::success_with_meta(
        page.items,
        "Error logs fetched successfully.",
        meta,
    )))
}
