use axum::http::{header, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use crate::handlers::greeting_for;
use crate::routes::create_router;
use recipebook_shared::test_utils::http_test_utils::{
    assert_json_content_type, create_raw_request, create_test_request, response_to_json,
};
use recipebook_shared::test_utils::test_logging::init_test_logging;

#[test]
fn test_greeting_text() {
    assert_eq!(greeting_for("Functions"), "Hello Functions!");
}

#[tokio::test]
async fn test_post_greets_by_name() {
    init_test_logging();
    let app = create_router();

    let response = app
        .oneshot(create_test_request("POST", "/", Some(json!({ "name": "Functions" }))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_json_content_type(&response);
    assert_eq!(
        response_to_json(response).await,
        json!({ "message": "Hello Functions!" })
    );
}

#[tokio::test]
async fn test_post_under_function_path() {
    init_test_logging();
    let app = create_router();

    let response = app
        .oneshot(create_test_request(
            "POST",
            "/functions/v1/hello-world",
            Some(json!({ "name": "Deno" })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response_to_json(response).await["message"], "Hello Deno!");
}

#[tokio::test]
async fn test_missing_name_is_500() {
    init_test_logging();
    let app = create_router();

    let response = app
        .oneshot(create_test_request("POST", "/", Some(json!({ "nom": "x" }))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_json_content_type(&response);
    let body = response_to_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("name"));
}

#[tokio::test]
async fn test_invalid_json_is_500() {
    init_test_logging();
    let app = create_router();

    let response = app
        .oneshot(create_raw_request("POST", "/", "name=Functions"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(response_to_json(response).await.get("error").is_some());
}

#[tokio::test]
async fn test_get_is_not_allowed() {
    init_test_logging();
    let app = create_router();

    let response = app
        .oneshot(create_test_request("GET", "/", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(
        response_to_json(response).await,
        json!({ "error": "Method not allowed" })
    );
}

#[tokio::test]
async fn test_bare_options_is_not_allowed() {
    init_test_logging();
    let app = create_router();

    let response = app
        .oneshot(create_test_request("OPTIONS", "/", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_json_content_type(&response);
    assert_eq!(
        response_to_json(response).await,
        json!({ "error": "Method not allowed" })
    );
}

#[tokio::test]
async fn test_head_is_not_allowed() {
    init_test_logging();
    let app = create_router();

    let response = app
        .oneshot(create_test_request("HEAD", "/", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_json_content_type(&response);
}

#[tokio::test]
async fn test_cors_preflight_is_answered() {
    init_test_logging();
    let app = create_router();

    let mut request = create_test_request("OPTIONS", "/", None);
    request
        .headers_mut()
        .insert(header::ORIGIN, "https://example.com".parse().unwrap());
    request
        .headers_mut()
        .insert(header::ACCESS_CONTROL_REQUEST_METHOD, "POST".parse().unwrap());
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
}
