use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

pub mod events;

/// A full or projected table row as the store returns it
pub type Row = serde_json::Map<String, Value>;

/// Identifier assigned by the store. Accepts both bigint identity and text/uuid keys.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum RecipeId {
    Int(i64),
    Text(String),
}

impl RecipeId {
    pub fn to_value(&self) -> Value {
        match self {
            RecipeId::Int(id) => Value::from(*id),
            RecipeId::Text(id) => Value::from(id.clone()),
        }
    }

    /// True when a row's `id` column holds this identifier
    pub fn matches(&self, value: &Value) -> bool {
        match (self, value) {
            (RecipeId::Int(id), Value::Number(n)) => n.as_i64() == Some(*id),
            (RecipeId::Text(id), Value::String(s)) => id == s,
            // ids from query strings arrive as text
            (RecipeId::Text(id), Value::Number(n)) => n.to_string() == *id,
            _ => false,
        }
    }
}

impl fmt::Display for RecipeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecipeId::Int(id) => write!(f, "{}", id),
            RecipeId::Text(id) => write!(f, "{}", id),
        }
    }
}

impl From<i64> for RecipeId {
    fn from(id: i64) -> Self {
        RecipeId::Int(id)
    }
}

impl From<&str> for RecipeId {
    fn from(id: &str) -> Self {
        RecipeId::Text(id.to_string())
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Recipe {
    pub id: RecipeId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    pub title: Option<String>,
    pub ingredients: Option<Value>, // free text or a structured list
    pub instructions: Option<String>,
    pub category: Option<String>,
    pub image_url: Option<String>,
}

impl Recipe {
    pub fn into_row(self) -> serde_json::Result<Row> {
        serde_json::from_value(serde_json::to_value(self)?)
    }
}

/// Columns the recipes table is created with
pub const RECIPE_COLUMNS: &[&str] = &[
    "id",
    "created_at",
    "title",
    "ingredients",
    "instructions",
    "category",
    "image_url",
];

// Response DTOs for general use across services
#[derive(Serialize, Deserialize, Debug)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct SuccessResponse {
    pub success: bool,
    pub message: String,
}

impl SuccessResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

// Helper function to get current timestamp as string
pub fn now_str() -> String {
    Utc::now().to_rfc3339()
}
