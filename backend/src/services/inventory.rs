//! Inventory service: stock allocation, the append-only movement log, and
//! cross-location aggregates.
//!
//! Every state-changing operation runs in a single transaction. Stock rows
//! are read `FOR UPDATE` so two concurrent stock-outs cannot both observe
//! the pre-decrement quantity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use validator::Validate;

use shared::{normalize_sku, LocationQuantity, PageParams};

use crate::error::{AppError, AppResult};
use crate::models::{StockInRequest, StockOutRequest, UpdateWarehouseItemRequest};
use crate::services::product::Product;

/// Inventory service for stock movements, allocation, and aggregates
#[derive(Clone)]
pub struct InventoryService {
    db: PgPool,
}

/// Movement direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "movement_direction", rename_all = "lowercase")]
#[serde(rename_all = "UPPERCASE")]
pub enum MovementDirection {
    In,
    Out,
}

/// Stock held by one product at one location.
///
/// At most one row exists per (product, location); the row is created
/// lazily on first stock-in to that location.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct WarehouseItem {
    pub id: i64,
    pub product_id: i64,
    pub location: String,
    pub quantity: i64,
    pub safety_stock: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Append-only audit entry for one quantity change. Replaying a record's
/// movements from zero in id order reconstructs its current quantity.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Movement {
    pub id: i64,
    pub product_id: i64,
    pub warehouse_item_id: Option<i64>,
    pub direction: MovementDirection,
    pub quantity: i64,
    pub movement_date: DateTime<Utc>,
    pub remarks: Option<String>,
}

/// A warehouse item with its product loaded
#[derive(Debug, Clone, Serialize)]
pub struct WarehouseItemWithProduct {
    #[serde(flatten)]
    pub item: WarehouseItem,
    pub product: Product,
}

/// Filters for the inventory overview
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OverviewFilter {
    /// Case-insensitive substring match on the product name
    pub product_name: Option<String>,
    /// Exact match on the (normalized) SKU
    pub sku: Option<String>,
}

/// Filters for listing warehouse items
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemListFilter {
    pub product_id: Option<i64>,
    /// Case-insensitive substring match on the location
    pub location: Option<String>,
}

/// One product's stock position across all locations
#[derive(Debug, Clone, Serialize)]
pub struct InventoryOverviewEntry {
    pub product_id: i64,
    pub product_name: String,
    pub sku: String,
    pub total_quantity: i64,
    pub locations: Vec<LocationQuantity>,
}

/// A product whose total quantity fell below its total safety stock
#[derive(Debug, Clone, Serialize)]
pub struct LowStockAlert {
    pub product_id: i64,
    pub product_name: String,
    pub sku: String,
    pub total_quantity: i64,
    pub total_safety_stock: i64,
    pub locations: Vec<LocationQuantity>,
}

/// Row for the overview query
#[derive(Debug, FromRow)]
struct OverviewRow {
    product_id: i64,
    product_name: String,
    sku: String,
    total_quantity: i64,
    locations: serde_json::Value,
}

/// Row for the low-stock query
#[derive(Debug, FromRow)]
struct LowStockRow {
    product_id: i64,
    product_name: String,
    sku: String,
    total_quantity: i64,
    total_safety_stock: i64,
    locations: serde_json::Value,
}

const ITEM_COLUMNS: &str =
    "id, product_id, location, quantity, safety_stock, created_at, updated_at";
const MOVEMENT_COLUMNS: &str =
    "id, product_id, warehouse_item_id, direction, quantity, movement_date, remarks";

impl InventoryService {
    /// Create a new InventoryService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Receive stock at a location.
    ///
    /// Increments the (product, location) record if it exists, otherwise
    /// creates it with the default safety stock. One `IN` movement is
    /// written in the same transaction as the quantity change.
    pub async fn stock_in(&self, input: StockInRequest) -> AppResult<WarehouseItemWithProduct> {
        input.validate()?;

        let mut tx = self.db.begin().await?;

        let product = fetch_product(&mut tx, input.product_id).await?;

        let existing = sqlx::query_as::<_, WarehouseItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM warehouse_items \
             WHERE product_id = $1 AND location = $2 FOR UPDATE"
        ))
        .bind(input.product_id)
        .bind(&input.location)
        .fetch_optional(&mut *tx)
        .await?;

        let item = match existing {
            Some(existing) => {
                sqlx::query_as::<_, WarehouseItem>(&format!(
                    "UPDATE warehouse_items SET quantity = quantity + $1, updated_at = NOW() \
                     WHERE id = $2 RETURNING {ITEM_COLUMNS}"
                ))
                .bind(input.quantity)
                .bind(existing.id)
                .fetch_one(&mut *tx)
                .await?
            }
            None => {
                sqlx::query_as::<_, WarehouseItem>(&format!(
                    "INSERT INTO warehouse_items (product_id, location, quantity) \
                     VALUES ($1, $2, $3) RETURNING {ITEM_COLUMNS}"
                ))
                .bind(input.product_id)
                .bind(&input.location)
                .bind(input.quantity)
                .fetch_one(&mut *tx)
                .await?
            }
        };

        record_movement(
            &mut tx,
            item.product_id,
            Some(item.id),
            MovementDirection::In,
            input.quantity,
            input.remarks.as_deref(),
        )
        .await?;

        tx.commit().await?;

        Ok(WarehouseItemWithProduct { item, product })
    }

    /// Remove stock.
    ///
    /// With a location, only that record is deducted. Without one, records
    /// holding stock are drained in creation order (ascending id), each
    /// deduction getting its own `OUT` movement with the exact amount taken
    /// from that record. Returns the first record touched; callers that
    /// need the full split should read the movement log.
    ///
    /// A failure at any point leaves stock and movements untouched.
    pub async fn stock_out(&self, input: StockOutRequest) -> AppResult<WarehouseItemWithProduct> {
        input.validate()?;

        let mut tx = self.db.begin().await?;

        let product = fetch_product(&mut tx, input.product_id).await?;

        let item = match &input.location {
            Some(location) => self.stock_out_targeted(&mut tx, &input, location).await?,
            None => self.stock_out_allocated(&mut tx, &input).await?,
        };

        tx.commit().await?;

        Ok(WarehouseItemWithProduct { item, product })
    }

    /// Targeted mode: deduct from one (product, location) record.
    async fn stock_out_targeted(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        input: &StockOutRequest,
        location: &str,
    ) -> AppResult<WarehouseItem> {
        let item = sqlx::query_as::<_, WarehouseItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM warehouse_items \
             WHERE product_id = $1 AND location = $2 FOR UPDATE"
        ))
        .bind(input.product_id)
        .bind(location)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| AppError::LocationNotFound {
            product_id: input.product_id,
            location: Some(location.to_string()),
        })?;

        if item.quantity < input.quantity {
            return Err(AppError::InsufficientStock {
                product_id: input.product_id,
                location: Some(location.to_string()),
                requested: input.quantity,
                available: item.quantity,
            });
        }

        let updated = sqlx::query_as::<_, WarehouseItem>(&format!(
            "UPDATE warehouse_items SET quantity = quantity - $1, updated_at = NOW() \
             WHERE id = $2 RETURNING {ITEM_COLUMNS}"
        ))
        .bind(input.quantity)
        .bind(item.id)
        .fetch_one(&mut **tx)
        .await?;

        record_movement(
            tx,
            input.product_id,
            Some(updated.id),
            MovementDirection::Out,
            input.quantity,
            input.remarks.as_deref(),
        )
        .await?;

        Ok(updated)
    }

    /// Untargeted mode: walk the product's stocked records in creation
    /// order, deducting from each until the request is satisfied.
    async fn stock_out_allocated(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        input: &StockOutRequest,
    ) -> AppResult<WarehouseItem> {
        let available = sqlx::query_as::<_, WarehouseItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM warehouse_items \
             WHERE product_id = $1 AND quantity > 0 ORDER BY id FOR UPDATE"
        ))
        .bind(input.product_id)
        .fetch_all(&mut **tx)
        .await?;

        if available.is_empty() {
            return Err(AppError::LocationNotFound {
                product_id: input.product_id,
                location: None,
            });
        }

        let total_available: i64 = available.iter().map(|item| item.quantity).sum();
        if total_available < input.quantity {
            return Err(AppError::InsufficientStock {
                product_id: input.product_id,
                location: None,
                requested: input.quantity,
                available: total_available,
            });
        }

        let mut remaining = input.quantity;
        let mut first_touched: Option<WarehouseItem> = None;

        for slot in available {
            if remaining == 0 {
                break;
            }
            let deduct = slot.quantity.min(remaining);

            let updated = sqlx::query_as::<_, WarehouseItem>(&format!(
                "UPDATE warehouse_items SET quantity = quantity - $1, updated_at = NOW() \
                 WHERE id = $2 RETURNING {ITEM_COLUMNS}"
            ))
            .bind(deduct)
            .bind(slot.id)
            .fetch_one(&mut **tx)
            .await?;

            record_movement(
                tx,
                input.product_id,
                Some(updated.id),
                MovementDirection::Out,
                deduct,
                input.remarks.as_deref(),
            )
            .await?;

            remaining -= deduct;
            first_touched.get_or_insert(updated);
        }

        first_touched.ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!("allocation walk touched no records"))
        })
    }

    /// Per-product stock position: total quantity plus the per-location
    /// breakdown, grouped at the store so pagination never splits a
    /// product across pages.
    pub async fn overview(
        &self,
        filter: OverviewFilter,
        page: PageParams,
    ) -> AppResult<Vec<InventoryOverviewEntry>> {
        let page = page.clamped();
        let sku = filter.sku.as_deref().map(normalize_sku);

        let rows = sqlx::query_as::<_, OverviewRow>(
            r#"
            SELECT p.id AS product_id, p.name AS product_name, p.sku,
                   SUM(w.quantity)::BIGINT AS total_quantity,
                   JSON_AGG(JSON_BUILD_OBJECT('location', w.location, 'quantity', w.quantity)
                            ORDER BY w.id) AS locations
            FROM warehouse_items w
            JOIN products p ON p.id = w.product_id
            WHERE ($1::TEXT IS NULL OR p.name ILIKE '%' || $1 || '%')
              AND ($2::TEXT IS NULL OR p.sku = $2)
            GROUP BY p.id, p.name, p.sku
            ORDER BY p.id
            OFFSET $3 LIMIT $4
            "#,
        )
        .bind(&filter.product_name)
        .bind(&sku)
        .bind(page.offset)
        .bind(page.limit)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter()
            .map(|row| {
                let locations = serde_json::from_value(row.locations)
                    .map_err(|e| AppError::Internal(e.into()))?;
                Ok(InventoryOverviewEntry {
                    product_id: row.product_id,
                    product_name: row.product_name,
                    sku: row.sku,
                    total_quantity: row.total_quantity,
                    locations,
                })
            })
            .collect()
    }

    /// Products whose total quantity is strictly below their total safety
    /// stock. Both sums run over the same records; a product with no stock
    /// records never appears. The breakdown is the full one, not filtered
    /// to under-threshold locations.
    pub async fn low_stock_alerts(&self) -> AppResult<Vec<LowStockAlert>> {
        let rows = sqlx::query_as::<_, LowStockRow>(
            r#"
            SELECT p.id AS product_id, p.name AS product_name, p.sku,
                   SUM(w.quantity)::BIGINT AS total_quantity,
                   SUM(w.safety_stock)::BIGINT AS total_safety_stock,
                   JSON_AGG(JSON_BUILD_OBJECT('location', w.location, 'quantity', w.quantity)
                            ORDER BY w.id) AS locations
            FROM warehouse_items w
            JOIN products p ON p.id = w.product_id
            GROUP BY p.id, p.name, p.sku
            HAVING SUM(w.quantity) < SUM(w.safety_stock)
            ORDER BY p.id
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        rows.into_iter()
            .map(|row| {
                let locations = serde_json::from_value(row.locations)
                    .map_err(|e| AppError::Internal(e.into()))?;
                Ok(LowStockAlert {
                    product_id: row.product_id,
                    product_name: row.product_name,
                    sku: row.sku,
                    total_quantity: row.total_quantity,
                    total_safety_stock: row.total_safety_stock,
                    locations,
                })
            })
            .collect()
    }

    /// Movement log for a product, in replay order (ascending id)
    pub async fn movements_for_product(&self, product_id: i64) -> AppResult<Vec<Movement>> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM products WHERE id = $1)")
                .bind(product_id)
                .fetch_one(&self.db)
                .await?;

        if !exists {
            return Err(AppError::ProductNotFound { product_id });
        }

        let movements = sqlx::query_as::<_, Movement>(&format!(
            "SELECT {MOVEMENT_COLUMNS} FROM movements WHERE product_id = $1 ORDER BY id"
        ))
        .bind(product_id)
        .fetch_all(&self.db)
        .await?;

        Ok(movements)
    }

    /// Movement log for one warehouse item, in replay order
    pub async fn movements_for_item(&self, item_id: i64) -> AppResult<Vec<Movement>> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM warehouse_items WHERE id = $1)",
        )
        .bind(item_id)
        .fetch_one(&self.db)
        .await?;

        if !exists {
            return Err(AppError::ItemNotFound { item_id });
        }

        let movements = sqlx::query_as::<_, Movement>(&format!(
            "SELECT {MOVEMENT_COLUMNS} FROM movements WHERE warehouse_item_id = $1 ORDER BY id"
        ))
        .bind(item_id)
        .fetch_all(&self.db)
        .await?;

        Ok(movements)
    }

    /// List warehouse items with optional product and location filters
    pub async fn list_items(
        &self,
        filter: ItemListFilter,
        page: PageParams,
    ) -> AppResult<Vec<WarehouseItem>> {
        let page = page.clamped();

        let items = sqlx::query_as::<_, WarehouseItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM warehouse_items \
             WHERE ($1::BIGINT IS NULL OR product_id = $1) \
               AND ($2::TEXT IS NULL OR location ILIKE '%' || $2 || '%') \
             ORDER BY id OFFSET $3 LIMIT $4"
        ))
        .bind(filter.product_id)
        .bind(&filter.location)
        .bind(page.offset)
        .bind(page.limit)
        .fetch_all(&self.db)
        .await?;

        Ok(items)
    }

    /// Get a warehouse item with its product loaded
    pub async fn get_item(&self, item_id: i64) -> AppResult<WarehouseItemWithProduct> {
        let item = sqlx::query_as::<_, WarehouseItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM warehouse_items WHERE id = $1"
        ))
        .bind(item_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or(AppError::ItemNotFound { item_id })?;

        let product = sqlx::query_as::<_, Product>(
            "SELECT id, name, description, sku, price, created_at, updated_at \
             FROM products WHERE id = $1",
        )
        .bind(item.product_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or(AppError::ProductNotFound {
            product_id: item.product_id,
        })?;

        Ok(WarehouseItemWithProduct { item, product })
    }

    /// Update a warehouse item's location or safety stock.
    ///
    /// Quantity changes are rejected: stock levels move only through
    /// stock-in and stock-out, which keep the movement log consistent.
    pub async fn update_item(
        &self,
        item_id: i64,
        input: UpdateWarehouseItemRequest,
    ) -> AppResult<WarehouseItemWithProduct> {
        input.validate()?;

        let mut tx = self.db.begin().await?;

        let item = sqlx::query_as::<_, WarehouseItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM warehouse_items WHERE id = $1 FOR UPDATE"
        ))
        .bind(item_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AppError::ItemNotFound { item_id })?;

        if let Some(quantity) = input.quantity {
            if quantity != item.quantity {
                return Err(AppError::Validation {
                    field: "quantity".to_string(),
                    message: "quantity changes must go through stock-in or stock-out".to_string(),
                });
            }
        }

        let location = input.location.unwrap_or_else(|| item.location.clone());
        if location != item.location {
            let occupied = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM warehouse_items \
                 WHERE product_id = $1 AND location = $2 AND id <> $3)",
            )
            .bind(item.product_id)
            .bind(&location)
            .bind(item.id)
            .fetch_one(&mut *tx)
            .await?;

            if occupied {
                return Err(AppError::DuplicateEntry(format!(
                    "stock record for this product at location '{}'",
                    location
                )));
            }
        }

        let safety_stock = input.safety_stock.unwrap_or(item.safety_stock);

        let updated = sqlx::query_as::<_, WarehouseItem>(&format!(
            "UPDATE warehouse_items SET location = $1, safety_stock = $2, updated_at = NOW() \
             WHERE id = $3 RETURNING {ITEM_COLUMNS}"
        ))
        .bind(&location)
        .bind(safety_stock)
        .bind(item.id)
        .fetch_one(&mut *tx)
        .await?;

        let product = fetch_product(&mut tx, updated.product_id).await?;

        tx.commit().await?;

        Ok(WarehouseItemWithProduct {
            item: updated,
            product,
        })
    }

    /// Delete a warehouse item; its movement history is removed with it
    pub async fn delete_item(&self, item_id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM warehouse_items WHERE id = $1")
            .bind(item_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::ItemNotFound { item_id });
        }

        Ok(())
    }
}

/// Resolve a product inside the caller's transaction
async fn fetch_product(tx: &mut Transaction<'_, Postgres>, product_id: i64) -> AppResult<Product> {
    sqlx::query_as::<_, Product>(
        "SELECT id, name, description, sku, price, created_at, updated_at \
         FROM products WHERE id = $1",
    )
    .bind(product_id)
    .fetch_optional(&mut **tx)
    .await?
    .ok_or(AppError::ProductNotFound { product_id })
}

/// The movement recorder: the only code path that writes the audit log.
/// Always runs inside the transaction of the quantity change it records;
/// movements are never updated or deleted.
async fn record_movement(
    tx: &mut Transaction<'_, Postgres>,
    product_id: i64,
    warehouse_item_id: Option<i64>,
    direction: MovementDirection,
    quantity: i64,
    remarks: Option<&str>,
) -> AppResult<Movement> {
    let movement = sqlx::query_as::<_, Movement>(&format!(
        "INSERT INTO movements (product_id, warehouse_item_id, direction, quantity, remarks) \
         VALUES ($1, $2, $3, $4, $5) RETURNING {MOVEMENT_COLUMNS}"
    ))
    .bind(product_id)
    .bind(warehouse_item_id)
    .bind(direction)
    .bind(quantity)
    .bind(remarks)
    .fetch_one(&mut **tx)
    .await?;

    Ok(movement)
}
