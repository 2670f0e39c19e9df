//! Product catalog request models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Input for creating a product. The SKU is normalized to uppercase before
/// it is stored.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateProductRequest {
    #[validate(length(min = 2, max = 100))]
    pub name: String,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    #[validate(length(min = 3, max = 50))]
    pub sku: String,
    #[validate(custom = "crate::validation::validate_price")]
    pub price: Decimal,
}

/// Partial update for a product. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateProductRequest {
    #[validate(length(min = 2, max = 100))]
    pub name: Option<String>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    #[validate(length(min = 3, max = 50))]
    pub sku: Option<String>,
    #[validate(custom = "crate::validation::validate_price")]
    pub price: Option<Decimal>,
}
