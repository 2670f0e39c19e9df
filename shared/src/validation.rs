//! Validation utilities for the Warehouse Inventory Platform
//!
//! Field-level rules shared by every write and lookup path. SKU
//! normalization lives here so the backend cannot drift between the
//! create, update, and query code paths.

use rust_decimal::Decimal;
use validator::ValidationError;

// ============================================================================
// SKU handling
// ============================================================================

/// SKUs are stored and compared uppercase. Applied on every write and every
/// lookup, not only at creation.
pub fn normalize_sku(sku: &str) -> String {
    sku.trim().to_uppercase()
}

/// Validate SKU shape: 3-50 characters after trimming, not blank.
pub fn validate_sku(sku: &str) -> Result<(), &'static str> {
    let trimmed = sku.trim();
    if trimmed.len() < 3 {
        return Err("SKU must be at least 3 characters");
    }
    if trimmed.len() > 50 {
        return Err("SKU must be at most 50 characters");
    }
    Ok(())
}

// ============================================================================
// Quantities and thresholds
// ============================================================================

/// Movement quantities must be strictly positive.
pub fn validate_quantity(quantity: i64) -> Result<(), &'static str> {
    if quantity <= 0 {
        return Err("Quantity must be greater than 0");
    }
    Ok(())
}

/// Safety stock may be zero but never negative.
pub fn validate_safety_stock(safety_stock: i64) -> Result<(), &'static str> {
    if safety_stock < 0 {
        return Err("Safety stock must be greater than or equal to 0");
    }
    Ok(())
}

/// A product is low on stock when its total quantity is strictly below the
/// sum of its per-location safety stock thresholds. Equality is in stock.
pub fn is_low_stock(total_quantity: i64, total_safety_stock: i64) -> bool {
    total_quantity < total_safety_stock
}

// ============================================================================
// Locations
// ============================================================================

/// Validate a storage location name: 2-100 characters, not blank.
pub fn validate_location(location: &str) -> Result<(), &'static str> {
    let trimmed = location.trim();
    if trimmed.len() < 2 {
        return Err("Location must be at least 2 characters");
    }
    if trimmed.len() > 100 {
        return Err("Location must be at most 100 characters");
    }
    Ok(())
}

// ============================================================================
// Custom validators for the `validator` derive
// ============================================================================

/// Prices are fixed-point decimals and must be strictly positive.
pub fn validate_price(price: &Decimal) -> Result<(), ValidationError> {
    if *price <= Decimal::ZERO {
        return Err(ValidationError::new("price_not_positive"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_sku_uppercases() {
        assert_eq!(normalize_sku("abc-123"), "ABC-123");
        assert_eq!(normalize_sku("  wh-0042 "), "WH-0042");
    }

    #[test]
    fn test_normalize_sku_idempotent() {
        let once = normalize_sku("Sku-Mixed-Case");
        assert_eq!(normalize_sku(&once), once);
    }

    #[test]
    fn test_validate_sku_length() {
        assert!(validate_sku("ABC").is_ok());
        assert!(validate_sku("AB").is_err());
        assert!(validate_sku(&"X".repeat(50)).is_ok());
        assert!(validate_sku(&"X".repeat(51)).is_err());
        assert!(validate_sku("   ").is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-5).is_err());
    }

    #[test]
    fn test_validate_safety_stock() {
        assert!(validate_safety_stock(0).is_ok());
        assert!(validate_safety_stock(5).is_ok());
        assert!(validate_safety_stock(-1).is_err());
    }

    #[test]
    fn test_low_stock_strict_boundary() {
        // Equality is not low stock
        assert!(!is_low_stock(10, 10));
        // One below the threshold is
        assert!(is_low_stock(9, 10));
        assert!(!is_low_stock(11, 10));
    }

    #[test]
    fn test_validate_location() {
        assert!(validate_location("A1").is_ok());
        assert!(validate_location("Aisle 4, Rack B").is_ok());
        assert!(validate_location("X").is_err());
        assert!(validate_location(" ").is_err());
        assert!(validate_location(&"L".repeat(101)).is_err());
    }

    #[test]
    fn test_validate_price() {
        use std::str::FromStr;
        assert!(validate_price(&Decimal::from_str("19.99").unwrap()).is_ok());
        assert!(validate_price(&Decimal::ZERO).is_err());
        assert!(validate_price(&Decimal::from_str("-0.01").unwrap()).is_err());
    }
}
