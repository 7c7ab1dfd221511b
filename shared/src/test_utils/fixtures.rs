use serde_json::json;

use crate::models::{Recipe, RecipeId};

/// Two recipes with ids 1 and 2, used to seed the in-memory store
pub fn sample_recipes() -> Vec<Recipe> {
    vec![
        Recipe {
            id: RecipeId::Int(1),
            created_at: Some("2025-02-20T10:00:00+00:00".to_string()),
            title: Some("Tomato Soup".to_string()),
            ingredients: Some(json!(["tomatoes", "onion", "stock"])),
            instructions: Some("Simmer everything for 30 minutes and blend.".to_string()),
            category: Some("Soup".to_string()),
            image_url: Some("https://images.example.com/tomato-soup.jpg".to_string()),
        },
        Recipe {
            id: RecipeId::Int(2),
            created_at: Some("2025-02-21T08:30:00+00:00".to_string()),
            title: Some("Pancakes".to_string()),
            ingredients: Some(json!("flour, eggs, milk")),
            instructions: Some("Whisk, rest the batter, fry.".to_string()),
            category: Some("Breakfast".to_string()),
            image_url: None,
        },
    ]
}

/// Body of a create request as a client would send it
pub fn new_recipe_body() -> serde_json::Value {
    json!({
        "title": "Guacamole",
        "ingredients": ["avocado", "lime", "salt"],
        "instructions": "Mash and season.",
        "category": "Dip",
        "image_url": "https://images.example.com/guacamole.jpg"
    })
}
