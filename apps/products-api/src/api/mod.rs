//! API routes module

pub mod health;

use axum::Router;
use domain_products::handlers;

use crate::state::AppState;

/// Routes mounted under `/api`
pub fn routes(state: &AppState) -> Router {
    Router::new().nest("/products", handlers::router(state.service.clone()))
}
