//! Application state management

use domain_products::ProductService;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub service: ProductService,
}
