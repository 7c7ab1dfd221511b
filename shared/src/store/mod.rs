use async_trait::async_trait;
use std::fmt;

use crate::error::Result;
use crate::models::{RecipeId, Row};

// Expose the store implementations
pub mod memory;
pub mod postgrest;

/// Column projection for a select
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Columns {
    All,
    Only(Vec<String>),
}

impl Columns {
    /// Parses a comma-separated column list. Empty input and `*` both mean every column.
    /// Names are not checked against the table; the store rejects unknown ones.
    pub fn parse(raw: &str) -> Self {
        let names: Vec<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect();

        if names.is_empty() || names.iter().any(|name| name == "*") {
            Columns::All
        } else {
            Columns::Only(names)
        }
    }
}

impl fmt::Display for Columns {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Columns::All => write!(f, "*"),
            Columns::Only(names) => write!(f, "{}", names.join(",")),
        }
    }
}

/// RecipeStore trait defining the table-scoped operations against the external store
#[async_trait]
pub trait RecipeStore: Send + Sync + 'static {
    /// Reads every row, projected to the given columns
    async fn select(&self, columns: &Columns) -> Result<Vec<Row>>;

    /// Inserts a new row and returns what the store persisted
    async fn insert(&self, row: Row) -> Result<Vec<Row>>;

    /// Updates the row with the given id and returns the updated row(s)
    async fn update(&self, id: &RecipeId, fields: Row) -> Result<Vec<Row>>;

    /// Deletes the row with the given id
    async fn delete(&self, id: &RecipeId) -> Result<()>;
}
