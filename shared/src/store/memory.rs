use async_trait::async_trait;
use serde_json::Value;
use std::sync::Mutex;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::error::{Result, StoreError};
use crate::feed::{record_change, ChangeFeed, ChangeFilter, Subscription};
use crate::models::events::{ChangeEvent, ChangeKind};
use crate::models::{now_str, Recipe, RecipeId, Row, RECIPE_COLUMNS};
use crate::store::{Columns, RecipeStore};

const CHANGE_BUFFER: usize = 64;

struct Table {
    rows: Vec<Row>,
    next_id: i64,
}

/// In-memory emulation of the recipes table, used as the test double for the hosted store.
/// Mirrors the store's observable behaviour: generated ids, unknown-column errors
/// and change events for every write.
pub struct MemoryRecipeStore {
    table_name: String,
    table: Mutex<Table>,
    changes: broadcast::Sender<ChangeEvent>,
}

impl Default for MemoryRecipeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryRecipeStore {
    /// Create a new empty store
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_BUFFER);
        Self {
            table_name: "recipes".to_string(),
            table: Mutex::new(Table {
                rows: Vec::new(),
                next_id: 1,
            }),
            changes,
        }
    }

    /// Create a store with initial recipes; integer ids are kept and the id sequence continues after them
    pub fn with_data(recipes: Vec<Recipe>) -> Self {
        let store = Self::new();
        {
            let mut table = store.table.lock().unwrap();
            for recipe in recipes {
                if let RecipeId::Int(id) = recipe.id {
                    table.next_id = table.next_id.max(id + 1);
                }
                let mut row = match recipe.into_row() {
                    Ok(row) => row,
                    Err(err) => {
                        warn!("Skipping unserializable recipe: {}", err);
                        continue;
                    }
                };
                row.entry("created_at")
                    .or_insert_with(|| Value::from(now_str()));
                table.rows.push(row);
            }
        }
        store
    }

    /// Number of rows currently stored
    pub fn len(&self) -> usize {
        self.table.lock().unwrap().rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_columns<'a>(&self, names: impl IntoIterator<Item = &'a String>) -> Result<()> {
        for name in names {
            if !RECIPE_COLUMNS.contains(&name.as_str()) {
                return Err(StoreError::with_code(
                    format!("column {}.{} does not exist", self.table_name, name),
                    "42703",
                ));
            }
        }
        Ok(())
    }

    fn publish(&self, kind: ChangeKind, record: Option<Row>, old_record: Option<Row>) {
        let event = ChangeEvent {
            kind,
            schema: "public".to_string(),
            table: self.table_name.clone(),
            record,
            old_record,
            commit_timestamp: Some(now_str()),
        };
        // No receivers simply means nobody subscribed
        let _ = self.changes.send(event);
    }
}

fn project(row: &Row, columns: &Columns) -> Row {
    match columns {
        Columns::All => row.clone(),
        Columns::Only(names) => names
            .iter()
            .map(|name| (name.clone(), row.get(name).cloned().unwrap_or(Value::Null)))
            .collect(),
    }
}

#[async_trait]
impl RecipeStore for MemoryRecipeStore {
    async fn select(&self, columns: &Columns) -> Result<Vec<Row>> {
        if let Columns::Only(names) = columns {
            self.check_columns(names)?;
        }

        let table = self.table.lock().unwrap();
        Ok(table.rows.iter().map(|row| project(row, columns)).collect())
    }

    async fn insert(&self, row: Row) -> Result<Vec<Row>> {
        if row.get("id").map_or(false, |id| !id.is_null()) {
            return Err(StoreError::with_code(
                "cannot insert a non-DEFAULT value into column \"id\"",
                "428C9",
            ));
        }
        self.check_columns(row.keys())?;

        let inserted = {
            let mut table = self.table.lock().unwrap();
            let id = table.next_id;
            table.next_id += 1;

            let mut stored = Row::new();
            for column in RECIPE_COLUMNS {
                stored.insert(column.to_string(), Value::Null);
            }
            stored.extend(row);
            stored.insert("id".to_string(), Value::from(id));
            stored.insert("created_at".to_string(), Value::from(now_str()));

            table.rows.push(stored.clone());
            stored
        };

        debug!("Inserted recipe {}", inserted["id"]);
        self.publish(ChangeKind::Insert, Some(inserted.clone()), None);
        Ok(vec![inserted])
    }

    async fn update(&self, id: &RecipeId, fields: Row) -> Result<Vec<Row>> {
        self.check_columns(fields.keys())?;
        if fields.contains_key("id") {
            return Err(StoreError::with_code(
                "column \"id\" can only be updated to DEFAULT",
                "428C9",
            ));
        }

        let changed = {
            let mut table = self.table.lock().unwrap();
            let mut changed = Vec::new();
            for row in table
                .rows
                .iter_mut()
                .filter(|row| row.get("id").map_or(false, |value| id.matches(value)))
            {
                let old = row.clone();
                for (key, value) in fields.iter() {
                    row.insert(key.clone(), value.clone());
                }
                changed.push((old, row.clone()));
            }
            changed
        };

        if changed.is_empty() {
            debug!("Update matched no recipe with id {}", id);
        }

        Ok(changed
            .into_iter()
            .map(|(old, new)| {
                self.publish(ChangeKind::Update, Some(new.clone()), Some(old));
                new
            })
            .collect())
    }

    async fn delete(&self, id: &RecipeId) -> Result<()> {
        let removed: Vec<Row> = {
            let mut table = self.table.lock().unwrap();
            let (removed, kept): (Vec<Row>, Vec<Row>) = table
                .rows
                .drain(..)
                .partition(|row| row.get("id").map_or(false, |value| id.matches(value)));
            table.rows = kept;
            removed
        };

        for old in removed {
            self.publish(ChangeKind::Delete, None, Some(old));
        }
        Ok(())
    }
}

#[async_trait]
impl ChangeFeed for MemoryRecipeStore {
    async fn subscribe(&self, filter: ChangeFilter) -> Result<Subscription> {
        let mut changes = self.changes.subscribe();
        let listener_filter = filter.clone();

        Ok(Subscription::spawn(filter, move |received, mut shutdown| async move {
            loop {
                tokio::select! {
                    _ = &mut shutdown => break,
                    event = changes.recv() => match event {
                        Ok(event) => {
                            if listener_filter.matches(&event) {
                                record_change(&event, &received);
                            }
                        }
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            warn!("Change listener lagged, {} event(s) skipped", skipped);
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    }
                }
            }
        }))
    }
}
