//! Product catalog service.
//!
//! SKUs are normalized to uppercase on every write and every lookup path,
//! never only at creation.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use validator::Validate;

use shared::{normalize_sku, PageParams};

use crate::error::{AppError, AppResult};
use crate::models::{CreateProductRequest, UpdateProductRequest};

/// Product catalog service
#[derive(Clone)]
pub struct ProductService {
    db: PgPool,
}

/// A catalog product. Deleting a product removes its stock records and
/// movements with it.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub sku: String,
    pub price: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Filters for listing products
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductFilter {
    /// Case-insensitive substring match on the name
    pub name: Option<String>,
    /// Exact match on the (normalized) SKU
    pub sku: Option<String>,
}

const PRODUCT_COLUMNS: &str = "id, name, description, sku, price, created_at, updated_at";

impl ProductService {
    /// Create a new ProductService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a product; the SKU must be unique after normalization
    pub async fn create(&self, input: CreateProductRequest) -> AppResult<Product> {
        input.validate()?;

        let sku = normalize_sku(&input.sku);

        let mut tx = self.db.begin().await?;

        let taken =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM products WHERE sku = $1)")
                .bind(&sku)
                .fetch_one(&mut *tx)
                .await?;

        if taken {
            return Err(AppError::DuplicateEntry(format!("SKU '{}'", sku)));
        }

        let product = sqlx::query_as::<_, Product>(&format!(
            "INSERT INTO products (name, description, sku, price) \
             VALUES ($1, $2, $3, $4) RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(&input.name)
        .bind(&input.description)
        .bind(&sku)
        .bind(input.price)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(product)
    }

    /// Get a product by id
    pub async fn get(&self, product_id: i64) -> AppResult<Product> {
        sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(product_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or(AppError::ProductNotFound { product_id })
    }

    /// List products with optional name and SKU filters
    pub async fn list(&self, filter: ProductFilter, page: PageParams) -> AppResult<Vec<Product>> {
        let page = page.clamped();
        let sku = filter.sku.as_deref().map(normalize_sku);

        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE ($1::TEXT IS NULL OR name ILIKE '%' || $1 || '%') \
               AND ($2::TEXT IS NULL OR sku = $2) \
             ORDER BY id OFFSET $3 LIMIT $4"
        ))
        .bind(&filter.name)
        .bind(&sku)
        .bind(page.offset)
        .bind(page.limit)
        .fetch_all(&self.db)
        .await?;

        Ok(products)
    }

    /// Partially update a product; a changed SKU is re-normalized and
    /// re-checked for uniqueness
    pub async fn update(
        &self,
        product_id: i64,
        input: UpdateProductRequest,
    ) -> AppResult<Product> {
        input.validate()?;

        let mut tx = self.db.begin().await?;

        let existing = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1 FOR UPDATE"
        ))
        .bind(product_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AppError::ProductNotFound { product_id })?;

        let sku = match &input.sku {
            Some(sku) => {
                let sku = normalize_sku(sku);
                if sku != existing.sku {
                    let taken = sqlx::query_scalar::<_, bool>(
                        "SELECT EXISTS(SELECT 1 FROM products WHERE sku = $1 AND id <> $2)",
                    )
                    .bind(&sku)
                    .bind(product_id)
                    .fetch_one(&mut *tx)
                    .await?;

                    if taken {
                        return Err(AppError::DuplicateEntry(format!("SKU '{}'", sku)));
                    }
                }
                sku
            }
            None => existing.sku.clone(),
        };

        let name = input.name.unwrap_or_else(|| existing.name.clone());
        let description = input.description.or_else(|| existing.description.clone());
        let price = input.price.unwrap_or(existing.price);

        let product = sqlx::query_as::<_, Product>(&format!(
            "UPDATE products SET name = $1, description = $2, sku = $3, price = $4, \
             updated_at = NOW() WHERE id = $5 RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(&name)
        .bind(&description)
        .bind(&sku)
        .bind(price)
        .bind(product_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(product)
    }

    /// Delete a product and, through it, its stock records and movements
    pub async fn delete(&self, product_id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(product_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::ProductNotFound { product_id });
        }

        Ok(())
    }
}
