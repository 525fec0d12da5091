//! Stock route handlers
//!
//! Price changes and their history rows are committed in one transaction;
//! if either write fails the whole request rolls back.

use crate::db::store::{self, Changes};
use crate::error::{ApiResult, AppError};
use crate::models::{Stock, StockCreate, StockHistory, StockUpdate, StockWithHistory};
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

/// POST /api/v1/stocks/create
///
/// Creates the stock and seeds one history row atomically.
pub async fn create_stock(
    State(state): State<SharedState>,
    Json(payload): Json<StockCreate>,
) -> ApiResult<(StatusCode, Json<ApiResponse<Stock>>)> {
    payload.validate()?;

    let mut conn = state.db_pool.get().await?;
    let tx = conn.transaction().await?;

    let now = Utc::now();
    let stock: Stock = store::insert(
        &*tx,
        &[
            "symbol",
            "company_name",
            "price",
            "last_updated",
            "created_at",
            "updated_at",
        ],
        &[
            &payload.symbol,
            &payload.company_name,
            &payload.price,
            &payload.last_updated,
            &now,
            &now,
        ],
    )
    .await
    .map_err(|e| e.conflict_message("Stock with this symbol already exists."))?;

    let _ = store::insert::<StockHistory, _>(
        &*tx,
        &["stock_id", "price", "created_at"],
        &[&stock.id, &stock.price, &now],
    )
    .await?;

    tx.commit().await?;
    info!("Stock created: {} (id: {})", stock.symbol, stock.id);

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(stock, "Stock created successfully.")),
    ))
}

/// GET /api/v1/stocks/list
pub async fn list_stocks(
    State(state): State<SharedState>,
    Query(params): Query<PageParams>,
) -> ApiResult<Json<ApiResponse<Vec<Stock>>>> {
    let conn = state.db_pool.get().await?;
    let client: &tokio_postgres::Client = &conn;

    let page = store::fetch_page::<Stock, _>(client, "id", &params).await?;
    let meta = serde_json::to_value(&page.meta)
        .map_err(|e| AppError::Internal(format!("Failed to serialize meta: {}", e)))?;

    Ok(Json(ApiResponse::success_with_meta(
        page.items,
        "Stocks fetched successfully.",
        meta,
    )))
}

/// GET /api/v1/stocks/retrieve/{id}
///
/// Returns the stock with its full price history.
pub async fn retrieve_stock(
    State(state): State<SharedState>,
    Path(id): Path<i32>,
) -> ApiResult<Json<ApiResponse<StockWithHistory>>> {
    let conn = state.db_pool.get().await?;
    let client: &tokio_postgres::Client = &conn;

    let stock = store::fetch_by_id::<Stock, _>(client, id).await?;
    let history =
        store::fetch_where::<StockHistory, _>(client, "stock_id = $1", "created_at DESC", &[&id])
            .await?;

    Ok(Json(ApiResponse::success(
        StockWithHistory { stock, history },
        "Stock retrieved successfully.",
    )))
}

/// PATCH /api/v1/stocks/update/{id}
///
/// A changed price appends exactly one history row in the same
/// transaction; updating with the current price appends none.
pub async fn update_stock(
    State(state): State<SharedState>,
    Path(id): Path<i32>,
    Json(payload): Json<StockUpdate>,
) -> ApiResult<Json<ApiResponse<Stock>>> {
    payload.validate()?;

    let mut conn = state.db_pool.get().await?;
    let tx = conn.transaction().await?;

    let stock = store::fetch_by_id::<Stock, _>(&*tx, id).await?;

    let now = Utc::now();
    if let Some(price) = payload.price {
        if price != stock.price {
            let _ = store::insert::<StockHistory, _>(
                &*tx,
                &["stock_id", "price", "created_at"],
                &[&id, &price, &now],
            )
            .await?;
        }
    }

    let mut changes = Changes::new();
    if let Some(symbol) = &payload.symbol {
        changes.set("symbol", symbol);
    }
    if let Some(company_name) = &payload.company_name {
        changes.set("company_name", company_name);
    }
    if let Some(price) = &payload.price {
        changes.set("price", price);
    }
    if let Some(last_updated) = &payload.last_updated {
        changes.set("last_updated", last_updated);
    }

    let updated = store::update_by_id::<Stock, _>(&*tx, id, changes)
        .await
        .map_err(|e| e.conflict_message("Stock with this symbol already exists."))?;

    tx.commit().await?;
    info!("Stock updated: {} (id: {})", updated.symbol, updated.id);

    Ok(Json(ApiResponse::success(
        updated,
        "Stock updated successfully.",
    )))
}
