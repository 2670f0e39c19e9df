//! HTTP handlers for warehouse item and stock movement endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use shared::PageParams;

use crate::error::AppResult;
use crate::models::{StockInRequest, StockOutRequest, UpdateWarehouseItemRequest};
use crate::services::inventory::{
    InventoryOverviewEntry, InventoryService, ItemListFilter, LowStockAlert, Movement,
    OverviewFilter, WarehouseItem, WarehouseItemWithProduct,
};
use crate::AppState;

/// Stock-in: add quantity at a location, creating the record if needed
pub async fn stock_in(
    State(state): State<AppState>,
    Json(input): Json<StockInRequest>,
) -> AppResult<(StatusCode, Json<WarehouseItemWithProduct>)> {
    let service = InventoryService::new(state.db);
    let item = service.stock_in(input).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// Stock-out: deduct from one location, or allocate across locations when
/// no location is given
pub async fn stock_out(
    State(state): State<AppState>,
    Json(input): Json<StockOutRequest>,
) -> AppResult<Json<WarehouseItemWithProduct>> {
    let service = InventoryService::new(state.db);
    let item = service.stock_out(input).await?;
    Ok(Json(item))
}

/// List warehouse items with optional product/location filters
pub async fn list_warehouse_items(
    State(state): State<AppState>,
    Query(page): Query<PageParams>,
    Query(filter): Query<ItemListFilter>,
) -> AppResult<Json<Vec<WarehouseItem>>> {
    let service = InventoryService::new(state.db);
    let items = service.list_items(filter, page).await?;
    Ok(Json(items))
}

/// Get a single warehouse item with its product
pub async fn get_warehouse_item(
    State(state): State<AppState>,
    Path(item_id): Path<i64>,
) -> AppResult<Json<WarehouseItemWithProduct>> {
    let service = InventoryService::new(state.db);
    let item = service.get_item(item_id).await?;
    Ok(Json(item))
}

/// Update a warehouse item's location or safety stock
pub async fn update_warehouse_item(
    State(state): State<AppState>,
    Path(item_id): Path<i64>,
    Json(input): Json<UpdateWarehouseItemRequest>,
) -> AppResult<Json<WarehouseItemWithProduct>> {
    let service = InventoryService::new(state.db);
    let item = service.update_item(item_id, input).await?;
    Ok(Json(item))
}

/// Delete a warehouse item and its movement history
pub async fn delete_warehouse_item(
    State(state): State<AppState>,
    Path(item_id): Path<i64>,
) -> AppResult<StatusCode> {
    let service = InventoryService::new(state.db);
    service.delete_item(item_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Get the movement log for one warehouse item, in replay order
pub async fn get_item_movements(
    State(state): State<AppState>,
    Path(item_id): Path<i64>,
) -> AppResult<Json<Vec<Movement>>> {
    let service = InventoryService::new(state.db);
    let movements = service.movements_for_item(item_id).await?;
    Ok(Json(movements))
}

/// Inventory overview: per-product totals with location breakdowns
pub async fn inventory_overview(
    State(state): State<AppState>,
    Query(page): Query<PageParams>,
    Query(filter): Query<OverviewFilter>,
) -> AppResult<Json<Vec<InventoryOverviewEntry>>> {
    let service = InventoryService::new(state.db);
    let overview = service.overview(filter, page).await?;
    Ok(Json(overview))
}

/// Products whose total quantity fell below their total safety stock
pub async fn low_stock_alerts(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<LowStockAlert>>> {
    let service = InventoryService::new(state.db);
    let alerts = service.low_stock_alerts().await?;
    Ok(Json(alerts))
}
