//! HTTP handlers

pub mod health;
pub mod wifi;
pub mod bluetooth;
pub mod stream;

use crate::error::AppError;

/// Fallback for unknown routes
pub async fn not_found(uri: axum::http::Uri) -> AppError {
    AppError::NotFound(format!("No route for {}", uri.path()))
}
