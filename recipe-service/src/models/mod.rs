use recipebook_shared::models::{RecipeId, Row};
use serde::Deserialize;

// Request DTOs

/// PUT body: the id plus whatever columns should change
#[derive(Deserialize, Debug)]
pub struct UpdateRecipeRequest {
    #[serde(default)]
    pub id: Option<RecipeId>,
    #[serde(flatten)]
    pub fields: Row,
}

/// DELETE body
#[derive(Deserialize, Debug)]
pub struct DeleteRecipeRequest {
    #[serde(default)]
    pub id: Option<RecipeId>,
}

pub const SUBSCRIBED_MESSAGE: &str = "Subscribed!";
pub const DELETED_MESSAGE: &str = "Recipe deleted!";
