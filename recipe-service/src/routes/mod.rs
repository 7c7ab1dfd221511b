use axum::{extract::Request, middleware, routing::any, Router};
use log::info;
use std::sync::Arc;

use crate::handlers::recipe_handlers::handle_recipe_request;
use recipebook_shared::config::StoreConfig;
use recipebook_shared::cors::with_cors;
use recipebook_shared::error::StoreError;
use recipebook_shared::feed::{realtime::RealtimeChangeFeed, ChangeFeed, ChangeFilter, SubscriptionManager};
use recipebook_shared::store::{postgrest::PostgrestRecipeStore, RecipeStore};

/// Dependencies shared by every request, built once per process
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecipeStore>,
    pub subscriptions: Arc<SubscriptionManager>,
}

impl AppState {
    pub fn new(store: Arc<dyn RecipeStore>, feed: Arc<dyn ChangeFeed>, table: &str) -> Self {
        Self {
            store,
            subscriptions: Arc::new(SubscriptionManager::new(feed, ChangeFilter::for_table(table))),
        }
    }

    /// State backed by the hosted database
    pub fn from_config(config: &StoreConfig) -> Result<Self, StoreError> {
        info!("Creating PostgREST store for table '{}'", config.table);
        Ok(Self::new(
            Arc::new(PostgrestRecipeStore::new(config)?),
            Arc::new(RealtimeChangeFeed::new(config)),
            &config.table,
        ))
    }
}

/// Creates a router with the given state
pub fn create_router_with_state(state: AppState) -> Router {
    // Logging middleware to trace all requests
    async fn logging_middleware(
        req: Request,
        next: axum::middleware::Next,
    ) -> impl axum::response::IntoResponse {
        info!(
            "Router received request: method={}, uri={}",
            req.method(),
            req.uri()
        );
        next.run(req).await
    }

    // Every path is served by the same dispatcher, which routes on method and query
    let dispatcher = Router::new()
        .route("/", any(handle_recipe_request))
        .route("/*path", any(handle_recipe_request))
        .with_state(state);

    let router = with_cors(dispatcher).layer(middleware::from_fn(logging_middleware));

    info!("Router configured with recipe dispatcher and middleware");
    router
}
