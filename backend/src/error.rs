//! Error handling for the Warehouse Inventory Platform
//!
//! Business errors are deterministic given current state; only
//! `ConcurrencyConflict` is transient and safe to retry.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Caller-side precondition failures
    #[error("validation error on {field}: {message}")]
    Validation { field: String, message: String },

    #[error("duplicate entry: {0}")]
    DuplicateEntry(String),

    // Business errors
    #[error("product {product_id} not found")]
    ProductNotFound { product_id: i64 },

    #[error("warehouse item {item_id} not found")]
    ItemNotFound { item_id: i64 },

    #[error("no stock record for product {product_id} matching the request")]
    LocationNotFound {
        product_id: i64,
        location: Option<String>,
    },

    #[error("insufficient stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: i64,
        location: Option<String>,
        requested: i64,
        available: i64,
    },

    // Transient errors
    #[error("transaction aborted by a concurrent update")]
    ConcurrencyConflict,

    // Infrastructure errors
    #[error("database error: {0}")]
    Database(sqlx::Error),

    #[error("internal server error")]
    Internal(#[from] anyhow::Error),
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error() {
            match db_err.code().as_deref() {
                // serialization_failure / deadlock_detected: the whole
                // transaction rolled back, the caller may retry
                Some("40001") | Some("40P01") => return AppError::ConcurrencyConflict,
                // unique_violation
                Some("23505") => {
                    let what = db_err
                        .constraint()
                        .unwrap_or("unique value")
                        .to_string();
                    return AppError::DuplicateEntry(what);
                }
                _ => {}
            }
        }
        AppError::Database(err)
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let (field, message) = errors
            .field_errors()
            .iter()
            .next()
            .map(|(field, errs)| {
                let message = errs
                    .first()
                    .map(|e| format!("failed `{}` constraint", e.code))
                    .unwrap_or_else(|| "invalid value".to_string());
                ((*field).to_string(), message)
            })
            .unwrap_or_else(|| ("request".to_string(), "invalid request".to_string()));
        AppError::Validation { field, message }
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retryable: Option<bool>,
}

impl ErrorDetail {
    fn new(code: &str, message: String) -> Self {
        Self {
            code: code.to_string(),
            message,
            field: None,
            retryable: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = match &self {
            AppError::Validation { field, message } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    field: Some(field.clone()),
                    ..ErrorDetail::new("VALIDATION_ERROR", message.clone())
                },
            ),
            AppError::DuplicateEntry(what) => (
                StatusCode::CONFLICT,
                ErrorDetail::new(
                    "DUPLICATE_ENTRY",
                    format!("a record with this {} already exists", what),
                ),
            ),
            AppError::ProductNotFound { product_id } => (
                StatusCode::NOT_FOUND,
                ErrorDetail::new("PRODUCT_NOT_FOUND", format!("product {} not found", product_id)),
            ),
            AppError::ItemNotFound { item_id } => (
                StatusCode::NOT_FOUND,
                ErrorDetail::new(
                    "ITEM_NOT_FOUND",
                    format!("warehouse item {} not found", item_id),
                ),
            ),
            AppError::LocationNotFound {
                product_id,
                location,
            } => (
                StatusCode::NOT_FOUND,
                ErrorDetail::new(
                    "LOCATION_NOT_FOUND",
                    match location {
                        Some(location) => format!(
                            "product {} has no stock record at location '{}'",
                            product_id, location
                        ),
                        None => format!("product {} has no stock at any location", product_id),
                    },
                ),
            ),
            AppError::InsufficientStock {
                product_id,
                location,
                requested,
                available,
            } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorDetail::new(
                    "INSUFFICIENT_STOCK",
                    match location {
                        Some(location) => format!(
                            "insufficient stock for product {} at location '{}': requested {}, available {}",
                            product_id, location, requested, available
                        ),
                        None => format!(
                            "insufficient total stock for product {}: requested {}, available {}",
                            product_id, requested, available
                        ),
                    },
                ),
            ),
            AppError::ConcurrencyConflict => (
                StatusCode::CONFLICT,
                ErrorDetail {
                    retryable: Some(true),
                    ..ErrorDetail::new(
                        "CONCURRENCY_CONFLICT",
                        "the operation was aborted by a concurrent update, retry the request"
                            .to_string(),
                    )
                },
            ),
            AppError::Database(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new("DATABASE_ERROR", "a database error occurred".to_string()),
            ),
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new(
                    "INTERNAL_ERROR",
                    "an internal server error occurred".to_string(),
                ),
            ),
        };

        // Log the error for debugging
        tracing::error!("Error: {:?}", self);

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
