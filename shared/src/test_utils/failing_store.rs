use async_trait::async_trait;

use crate::error::{Result, StoreError};
use crate::models::{RecipeId, Row};
use crate::store::{Columns, RecipeStore};

/// Store whose every call fails with the configured message
pub struct FailingRecipeStore {
    message: String,
}

impl FailingRecipeStore {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }

    fn fail<T>(&self) -> Result<T> {
        Err(StoreError::api(self.message.clone()))
    }
}

#[async_trait]
impl RecipeStore for FailingRecipeStore {
    async fn select(&self, _columns: &Columns) -> Result<Vec<Row>> {
        self.fail()
    }

    async fn insert(&self, _row: Row) -> Result<Vec<Row>> {
        self.fail()
    }

    async fn update(&self, _id: &RecipeId, _fields: Row) -> Result<Vec<Row>> {
        self.fail()
    }

    async fn delete(&self, _id: &RecipeId) -> Result<()> {
        self.fail()
    }
}
