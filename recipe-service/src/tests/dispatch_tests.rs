use axum::http::{Method, Uri};
use recipebook_shared::store::Columns;

use crate::handlers::recipe_handlers::RecipeAction;

fn classify(method: Method, uri: &str) -> RecipeAction {
    RecipeAction::classify(&method, &uri.parse::<Uri>().unwrap())
}

#[test]
fn test_get_without_query_selects_everything() {
    assert_eq!(classify(Method::GET, "/"), RecipeAction::SelectAll);
    assert_eq!(classify(Method::GET, "/recipes"), RecipeAction::SelectAll);
    assert_eq!(classify(Method::GET, "/?limit=5"), RecipeAction::SelectAll);
}

#[test]
fn test_columns_parameter_selects_projection() {
    assert_eq!(
        classify(Method::GET, "/?columns=title,category"),
        RecipeAction::SelectColumns(Columns::Only(vec![
            "title".to_string(),
            "category".to_string()
        ]))
    );
    assert_eq!(
        classify(Method::GET, "/?columns=title%2C%20image_url"),
        RecipeAction::SelectColumns(Columns::Only(vec![
            "title".to_string(),
            "image_url".to_string()
        ]))
    );
}

#[test]
fn test_empty_columns_parameter_means_all() {
    assert_eq!(
        classify(Method::GET, "/?columns="),
        RecipeAction::SelectColumns(Columns::All)
    );
    assert_eq!(
        classify(Method::GET, "/?columns=*"),
        RecipeAction::SelectColumns(Columns::All)
    );
}

#[test]
fn test_subscribe_segment_wins_over_columns() {
    assert_eq!(classify(Method::GET, "/subscribe"), RecipeAction::Subscribe);
    assert_eq!(
        classify(Method::GET, "/recipes/subscribe?columns=title"),
        RecipeAction::Subscribe
    );
    // Only a whole path segment signals the intent
    assert_eq!(classify(Method::GET, "/subscribers"), RecipeAction::SelectAll);
}

#[test]
fn test_subscribe_requires_get() {
    assert_eq!(classify(Method::POST, "/subscribe"), RecipeAction::Create);
}

#[test]
fn test_write_methods() {
    assert_eq!(classify(Method::POST, "/"), RecipeAction::Create);
    assert_eq!(classify(Method::PUT, "/"), RecipeAction::Update);
    assert_eq!(classify(Method::DELETE, "/?columns=title"), RecipeAction::Delete);
}

#[test]
fn test_other_methods_are_unsupported() {
    for method in [Method::PATCH, Method::HEAD, Method::OPTIONS, Method::TRACE] {
        assert_eq!(classify(method, "/"), RecipeAction::Unsupported);
    }
}
