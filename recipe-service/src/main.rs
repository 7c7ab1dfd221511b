mod error;
mod handlers;
mod models;
mod routes;

#[cfg(test)]
mod tests;

use recipebook_shared::config::StoreConfig;
use recipebook_shared::runtime::{init_logging, serve, shutdown_signal};

use crate::routes::{create_router_with_state, AppState};

const DEFAULT_PORT: u16 = 3001;

#[tokio::main]
async fn main() -> Result<(), lambda_http::Error> {
    init_logging("info,recipebook_recipe_service=debug,recipebook_shared=debug");

    // Missing store settings are fatal before anything is served
    let config = match StoreConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!("Invalid configuration: {}", err);
            return Err(err.into());
        }
    };
    tracing::info!("Using store at {} (table '{}')", config.url, config.table);

    let state = match AppState::from_config(&config) {
        Ok(state) => state,
        Err(err) => {
            tracing::error!("Failed to create store client: {}", err);
            return Err(err.into());
        }
    };
    let subscriptions = state.subscriptions.clone();
    let app = create_router_with_state(state);

    serve(app, DEFAULT_PORT, async move {
        shutdown_signal().await;
        if subscriptions.stop().await {
            tracing::info!("Stopped recipe change subscription");
        }
    })
    .await
}
