use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use database::DatabaseError;
use thiserror::Error;

use crate::models::ProductId;

#[derive(Debug, Error)]
pub enum ProductError {
    /// Bad input, rejected before any storage call
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Identifier text is neither an ObjectId nor an integer
    #[error("Invalid product identifier: '{0}'")]
    InvalidIdentifier(String),

    #[error("Product not found: {0}")]
    NotFound(ProductId),

    /// The store could not be reached while building the repository
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Persistence error: {0}")]
    Persistence(String),
}

pub type ProductResult<T> = Result<T, ProductError>;

impl ProductError {
    /// Wrap a store error with the operation that produced it
    pub(crate) fn persistence(operation: &str, err: impl std::fmt::Display) -> Self {
        ProductError::Persistence(format!("{} failed: {}", operation, err))
    }
}

/// Convert ProductError to AppError for standardized error responses
impl From<ProductError> for AppError {
    fn from(err: ProductError) -> Self {
        match err {
            ProductError::Validation(msg) => AppError::BadRequest(msg),
            ProductError::InvalidIdentifier(raw) => {
                AppError::InvalidIdentifier(format!("'{}' is not a valid product id", raw))
            }
            ProductError::NotFound(id) => AppError::NotFound(format!("Product {} not found", id)),
            ProductError::Connection(msg) => AppError::InternalServerError(msg),
            ProductError::Persistence(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for ProductError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<DatabaseError> for ProductError {
    fn from(err: DatabaseError) -> Self {
        if err.is_connection_error() {
            ProductError::Connection(err.to_string())
        } else {
            ProductError::Persistence(err.to_string())
        }
    }
}
