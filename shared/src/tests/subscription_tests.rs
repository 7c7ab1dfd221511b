use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

use crate::feed::{ChangeFeed, ChangeFilter, SubscriptionManager};
use crate::models::RecipeId;
use crate::store::memory::MemoryRecipeStore;
use crate::store::RecipeStore;
use crate::test_utils::fixtures::sample_recipes;

// Polls until the condition holds or a second has passed
async fn eventually<F>(mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    for _ in 0..100 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}

#[tokio::test]
async fn test_subscription_counts_store_writes() {
    let store = Arc::new(MemoryRecipeStore::with_data(sample_recipes()));
    let subscription = store
        .subscribe(ChangeFilter::for_table("recipes"))
        .await
        .unwrap();
    assert!(subscription.is_active());

    store
        .insert(json!({ "title": "Salad" }).as_object().cloned().unwrap())
        .await
        .unwrap();
    store
        .update(&RecipeId::Int(1), json!({ "title": "Soup" }).as_object().cloned().unwrap())
        .await
        .unwrap();
    store.delete(&RecipeId::Int(2)).await.unwrap();

    assert!(eventually(|| subscription.received() == 3).await);

    subscription.stop().await;
}

#[tokio::test]
async fn test_filter_ignores_other_tables_and_events() {
    let store = Arc::new(MemoryRecipeStore::with_data(sample_recipes()));

    let mut inserts_only = ChangeFilter::for_table("recipes");
    inserts_only.event = "INSERT".to_string();
    let inserts = store.subscribe(inserts_only).await.unwrap();
    let other_table = store
        .subscribe(ChangeFilter::for_table("ingredients"))
        .await
        .unwrap();

    store.delete(&RecipeId::Int(1)).await.unwrap();
    store
        .insert(json!({ "title": "Salad" }).as_object().cloned().unwrap())
        .await
        .unwrap();

    assert!(eventually(|| inserts.received() == 1).await);
    assert_eq!(other_table.received(), 0);
}

#[tokio::test]
async fn test_stop_ends_listener() {
    let store = Arc::new(MemoryRecipeStore::new());
    let subscription = store
        .subscribe(ChangeFilter::for_table("recipes"))
        .await
        .unwrap();

    subscription.stop().await;

    // Writes after stop reach nobody and do not fail
    store
        .insert(json!({ "title": "Salad" }).as_object().cloned().unwrap())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_manager_keeps_single_subscription() {
    let store = Arc::new(MemoryRecipeStore::new());
    let manager = SubscriptionManager::new(store.clone(), ChangeFilter::for_table("recipes"));

    assert!(!manager.is_subscribed().await);
    assert!(manager.ensure_subscribed().await.unwrap());
    assert!(!manager.ensure_subscribed().await.unwrap());
    assert!(!manager.ensure_subscribed().await.unwrap());
    assert!(manager.is_subscribed().await);

    store
        .insert(json!({ "title": "Salad" }).as_object().cloned().unwrap())
        .await
        .unwrap();

    // A second listener would double count
    for _ in 0..100 {
        if manager.received().await >= 1 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(manager.received().await, 1);

    assert!(manager.stop().await);
    assert!(!manager.is_subscribed().await);
    assert!(!manager.stop().await);

    // Subscribing again after stop starts a fresh listener
    assert!(manager.ensure_subscribed().await.unwrap());
    manager.stop().await;
}
