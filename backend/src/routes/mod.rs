//! Route definitions for the Warehouse Inventory Platform

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Product catalog
        .nest("/products", product_routes())
        // Warehouse items, stock movements, and aggregates
        .nest("/warehouse-items", warehouse_item_routes())
}

/// Product catalog routes
fn product_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_products).post(handlers::create_product),
        )
        .route(
            "/:product_id",
            get(handlers::get_product)
                .patch(handlers::update_product)
                .delete(handlers::delete_product),
        )
        .route(
            "/:product_id/movements",
            get(handlers::get_product_movements),
        )
}

/// Warehouse item routes
fn warehouse_item_routes() -> Router<AppState> {
    Router::new()
        // Stock-in is the creation path for warehouse items
        .route(
            "/",
            get(handlers::list_warehouse_items).post(handlers::stock_in),
        )
        .route("/stock-out", post(handlers::stock_out))
        // Aggregates
        .route("/inventory/overview", get(handlers::inventory_overview))
        .route("/inventory/low-stock", get(handlers::low_stock_alerts))
        // Item CRUD and audit log
        .route(
            "/:item_id",
            get(handlers::get_warehouse_item)
                .patch(handlers::update_warehouse_item)
                .delete(handlers::delete_warehouse_item),
        )
        .route("/:item_id/movements", get(handlers::get_item_movements))
}
