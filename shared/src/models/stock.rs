//! Stock movement and warehouse item request models

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Input for a stock-in. Targets one (product, location) pair; the stock
/// record is created lazily on first stock-in to a new location.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct StockInRequest {
    pub product_id: i64,
    #[validate(range(min = 1))]
    pub quantity: i64,
    #[validate(length(min = 2, max = 100))]
    pub location: String,
    #[validate(length(max = 500))]
    pub remarks: Option<String>,
}

/// Input for a stock-out. With a location, only that record is deducted;
/// without one, the engine allocates across locations in record creation
/// order.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct StockOutRequest {
    pub product_id: i64,
    #[validate(range(min = 1))]
    pub quantity: i64,
    #[validate(length(min = 2, max = 100))]
    pub location: Option<String>,
    #[validate(length(max = 500))]
    pub remarks: Option<String>,
}

/// Partial update for a warehouse item. Quantity is carried for API
/// compatibility but quantity changes are rejected; stock levels move only
/// through stock-in and stock-out so the movement log stays consistent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateWarehouseItemRequest {
    #[validate(range(min = 0))]
    pub quantity: Option<i64>,
    #[validate(length(min = 2, max = 100))]
    pub location: Option<String>,
    #[validate(range(min = 0))]
    pub safety_stock: Option<i64>,
}
