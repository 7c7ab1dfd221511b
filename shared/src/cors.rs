use axum::{
    extract::{Request, State},
    http::{header, Method},
    middleware::{self, Next},
    response::Response,
    Router,
};
use tower::ServiceExt;
use tower_http::cors::{Any, CorsLayer};
use tracing::debug;

/// Wraps a router in a permissive CORS layer.
///
/// The CORS layer answers every OPTIONS request itself, so only genuine
/// preflights are sent to it. A bare OPTIONS request goes straight to the
/// router and gets whatever the handlers return for that method.
pub fn with_cors(router: Router) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    router
        .clone()
        .layer(cors)
        .layer(middleware::from_fn_with_state(router, route_bare_options))
}

/// True for an OPTIONS request carrying both `Origin` and `Access-Control-Request-Method`
pub fn is_preflight(req: &Request) -> bool {
    req.method() == Method::OPTIONS
        && req.headers().contains_key(header::ORIGIN)
        && req
            .headers()
            .contains_key(header::ACCESS_CONTROL_REQUEST_METHOD)
}

async fn route_bare_options(State(router): State<Router>, req: Request, next: Next) -> Response {
    if req.method() == Method::OPTIONS && !is_preflight(&req) {
        debug!("OPTIONS {} is not a CORS preflight, dispatching it", req.uri());
        return match router.oneshot(req).await {
            Ok(response) => response,
            Err(never) => match never {},
        };
    }
    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::StatusCode, routing::any};

    fn app() -> Router {
        with_cors(Router::new().route(
            "/",
            any(|method: Method| async move {
                if method == Method::GET {
                    StatusCode::OK
                } else {
                    StatusCode::METHOD_NOT_ALLOWED
                }
            }),
        ))
    }

    fn options(headers: &[(header::HeaderName, &str)]) -> Request {
        let mut builder = Request::builder().method(Method::OPTIONS).uri("/");
        for (name, value) in headers {
            builder = builder.header(name, *value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn test_is_preflight_needs_both_headers() {
        assert!(!is_preflight(&options(&[])));
        assert!(!is_preflight(&options(&[(header::ORIGIN, "https://example.com")])));
        assert!(is_preflight(&options(&[
            (header::ORIGIN, "https://example.com"),
            (header::ACCESS_CONTROL_REQUEST_METHOD, "POST"),
        ])));
    }

    #[tokio::test]
    async fn test_bare_options_reaches_the_handler() {
        let response = app().oneshot(options(&[])).await.unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

        let response = app()
            .oneshot(options(&[(header::ORIGIN, "https://example.com")]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_preflight_is_answered_by_cors_layer() {
        let response = app()
            .oneshot(options(&[
                (header::ORIGIN, "https://example.com"),
                (header::ACCESS_CONTROL_REQUEST_METHOD, "POST"),
            ]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "*"
        );
    }

    #[tokio::test]
    async fn test_simple_request_gets_cors_headers() {
        let request = Request::builder()
            .uri("/")
            .header(header::ORIGIN, "https://example.com")
            .body(Body::empty())
            .unwrap();
        let response = app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "*"
        );
    }
}
