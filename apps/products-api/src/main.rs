//! Products API - REST server over a relational or document product store

use axum_helpers::server::{create_app, create_router, health_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_products::{build_repository, ProductService};
use tracing::info;

mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // A missing .env file is fine; real environments set variables directly
    dotenvy::dotenv().ok();
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);

    info!(
        storage = config.storage_kind.as_ref(),
        identity = %config.storage.identity(),
        "Connecting to product store"
    );

    let repository = build_repository(&config.storage, config.retry.clone()).await?;
    let state = AppState {
        service: ProductService::new(repository),
    };

    let router = create_router::<openapi::ApiDoc>(api::routes(&state), &config.server)?;
    let app = router
        .merge(health_router(config.app))
        .merge(api::health::router(state));

    info!(
        "Starting Products API on {} ({} v{})",
        config.server.address(),
        config.app.name,
        config.app.version
    );

    create_app(app, &config.server)
        .await
        .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Products API shutdown complete");
    Ok(())
}
