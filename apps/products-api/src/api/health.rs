//! Readiness endpoint

use axum::{extract::State, response::IntoResponse, routing::get, Router};
use axum_helpers::{run_health_checks, HealthCheckFuture};

use crate::state::AppState;

/// 200 when the product store answers, 503 otherwise
async fn ready(State(state): State<AppState>) -> impl IntoResponse {
    let backend = state.service.backend();
    let checks: Vec<(&str, HealthCheckFuture)> = vec![(
        backend,
        Box::pin(async {
            state
                .service
                .check_health()
                .await
                .map_err(|e| e.to_string())
        }),
    )];

    run_health_checks(checks).await
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/ready", get(ready))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use domain_products::{
        InMemoryProductRepository, Product, ProductError, ProductId, ProductRepository,
        ProductResult, ProductService,
    };
    use http_body_util::BodyExt;
    use serde_json::Value;
    use std::sync::Arc;
    use tower::ServiceExt;

    /// Store that never answers
    struct DownRepository;

    #[async_trait]
    impl ProductRepository for DownRepository {
        async fn save(&self, _: &Product) -> ProductResult<ProductId> {
            Err(ProductError::Persistence("down".into()))
        }
        async fn find_by_id(&self, _: &ProductId) -> ProductResult<Option<Product>> {
            Err(ProductError::Persistence("down".into()))
        }
        async fn list_all(&self) -> ProductResult<Vec<Product>> {
            Err(ProductError::Persistence("down".into()))
        }
        async fn update(&self, _: &Product) -> ProductResult<()> {
            Err(ProductError::Persistence("down".into()))
        }
        async fn delete(&self, _: &ProductId) -> ProductResult<()> {
            Err(ProductError::Persistence("down".into()))
        }
        async fn health_check(&self) -> ProductResult<()> {
            Err(ProductError::Connection("connection refused".into()))
        }
        fn backend(&self) -> &'static str {
            "postgres"
        }
    }

    async fn get_ready(repository: Arc<dyn ProductRepository>) -> (StatusCode, Value) {
        let state = AppState {
            service: ProductService::new(repository),
        };
        let response = router(state)
            .oneshot(Request::get("/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_ready_when_store_answers() {
        let (status, body) = get_ready(Arc::new(InMemoryProductRepository::new())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ready");
        assert_eq!(body["memory"], "connected");
    }

    #[tokio::test]
    async fn test_not_ready_when_store_is_down() {
        let (status, body) = get_ready(Arc::new(DownRepository)).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["postgres"], "disconnected");
    }
}
