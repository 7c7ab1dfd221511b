use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{Method, Uri},
    response::{IntoResponse, Response},
    Json,
};
use recipebook_shared::feed::SubscriptionManager;
use recipebook_shared::models::{Row, SuccessResponse};
use recipebook_shared::store::{Columns, RecipeStore};
use std::collections::HashMap;

use crate::error::{AppError, Result};
use crate::handlers::parse_json_body;
use crate::models::{DeleteRecipeRequest, UpdateRecipeRequest, DELETED_MESSAGE, SUBSCRIBED_MESSAGE};
use crate::routes::AppState;

/// What a request against the recipe function asks for. Evaluated in declaration order.
#[derive(Debug, PartialEq)]
pub enum RecipeAction {
    Subscribe,
    SelectColumns(Columns),
    SelectAll,
    Create,
    Update,
    Delete,
    Unsupported,
}

impl RecipeAction {
    pub fn classify(method: &Method, uri: &Uri) -> Self {
        if *method == Method::GET {
            if uri.path().split('/').any(|segment| segment == "subscribe") {
                return RecipeAction::Subscribe;
            }

            let params = Query::<HashMap<String, String>>::try_from_uri(uri)
                .map(|Query(params)| params)
                .unwrap_or_default();
            return match params.get("columns") {
                Some(raw) => RecipeAction::SelectColumns(Columns::parse(raw)),
                None => RecipeAction::SelectAll,
            };
        }

        if *method == Method::POST {
            RecipeAction::Create
        } else if *method == Method::PUT {
            RecipeAction::Update
        } else if *method == Method::DELETE {
            RecipeAction::Delete
        } else {
            RecipeAction::Unsupported
        }
    }
}

// ANY /, ANY /*path
pub async fn handle_recipe_request(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> Result<Response> {
    let action = RecipeAction::classify(&method, &uri);
    tracing::debug!("Dispatching {} {} as {:?}", method, uri, action);

    let response = match action {
        RecipeAction::Subscribe => {
            Json(subscribe_to_changes(&state.subscriptions).await?).into_response()
        }
        RecipeAction::SelectColumns(columns) => {
            Json(list_recipes(state.store.as_ref(), &columns).await?).into_response()
        }
        RecipeAction::SelectAll => {
            Json(list_recipes(state.store.as_ref(), &Columns::All).await?).into_response()
        }
        RecipeAction::Create => Json(create_recipe(state.store.as_ref(), &body).await?).into_response(),
        RecipeAction::Update => Json(update_recipe(state.store.as_ref(), &body).await?).into_response(),
        RecipeAction::Delete => Json(delete_recipe(state.store.as_ref(), &body).await?).into_response(),
        RecipeAction::Unsupported => return Err(AppError::MethodNotAllowed),
    };

    Ok(response)
}

// GET /subscribe
pub async fn subscribe_to_changes(subscriptions: &SubscriptionManager) -> Result<SuccessResponse> {
    if subscriptions.ensure_subscribed().await? {
        tracing::info!("Started listening for recipe changes");
    }
    Ok(SuccessResponse::new(SUBSCRIBED_MESSAGE))
}

// GET /, GET /?columns=a,b
pub async fn list_recipes(store: &dyn RecipeStore, columns: &Columns) -> Result<Vec<Row>> {
    let rows = store.select(columns).await?;
    tracing::info!("Fetched {} recipe(s) with columns '{}'", rows.len(), columns);
    Ok(rows)
}

// POST /
pub async fn create_recipe(store: &dyn RecipeStore, body: &[u8]) -> Result<Vec<Row>> {
    let recipe: Row = parse_json_body(body)?;
    let inserted = store.insert(recipe).await?;
    tracing::info!("Created {} recipe(s)", inserted.len());
    Ok(inserted)
}

// PUT /
pub async fn update_recipe(store: &dyn RecipeStore, body: &[u8]) -> Result<Vec<Row>> {
    let request: UpdateRecipeRequest = parse_json_body(body)?;
    let id = request.id.ok_or_else(|| AppError::missing_field("id"))?;

    let updated = store.update(&id, request.fields).await?;
    tracing::info!("Updated recipe {}: {} row(s) affected", id, updated.len());
    Ok(updated)
}

// DELETE /
pub async fn delete_recipe(store: &dyn RecipeStore, body: &[u8]) -> Result<SuccessResponse> {
    let request: DeleteRecipeRequest = parse_json_body(body)?;
    let id = request.id.ok_or_else(|| AppError::missing_field("id"))?;

    store.delete(&id).await?;
    tracing::info!("Deleted recipe {}", id);
    Ok(SuccessResponse::new(DELETED_MESSAGE))
}
