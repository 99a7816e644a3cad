//! HTTP handlers for biztime-service.

pub mod companies;
pub mod health;
pub mod invoices;

use service_core::error::AppError;

/// Fallback for routes that do not exist.
pub async fn not_found() -> AppError {
    AppError::NotFound(anyhow::anyhow!("Not Found"))
}
