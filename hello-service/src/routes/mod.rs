use axum::{extract::Request, middleware, routing::post, Router};
use log::info;
use recipebook_shared::cors::with_cors;

use crate::handlers::{greet, method_not_allowed};

/// Creates the greeter router
pub fn create_router() -> Router {
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

    let greeting = post(greet).fallback(method_not_allowed);

    let router = Router::new()
        .route("/", greeting.clone())
        .route("/*path", greeting);

    with_cors(router).layer(middleware::from_fn(logging_middleware))
}
