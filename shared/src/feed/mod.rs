use async_trait::async_trait;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::error::Result;
use crate::models::events::ChangeEvent;

pub mod realtime;

/// Which row changes a subscription listens for
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChangeFilter {
    pub schema: String,
    pub table: String,
    /// `*` for every event type, otherwise INSERT / UPDATE / DELETE
    pub event: String,
}

impl ChangeFilter {
    pub fn for_table(table: &str) -> Self {
        Self {
            schema: "public".to_string(),
            table: table.to_string(),
            event: "*".to_string(),
        }
    }

    pub fn matches(&self, event: &ChangeEvent) -> bool {
        event.schema == self.schema
            && event.table == self.table
            && (self.event == "*" || self.event.eq_ignore_ascii_case(event.kind.as_str()))
    }
}

/// Source of row-level change events
#[async_trait]
pub trait ChangeFeed: Send + Sync + 'static {
    /// Starts listening in the background and returns the handle right away
    async fn subscribe(&self, filter: ChangeFilter) -> Result<Subscription>;
}

/// Handle to a running change listener. Dropping it stops the listener.
pub struct Subscription {
    filter: ChangeFilter,
    received: Arc<AtomicU64>,
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl Subscription {
    /// Spawns the listener task. The task gets the event counter and a
    /// shutdown signal it must watch.
    pub fn spawn<F, Fut>(filter: ChangeFilter, listener: F) -> Self
    where
        F: FnOnce(Arc<AtomicU64>, oneshot::Receiver<()>) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let received = Arc::new(AtomicU64::new(0));
        let (shutdown, shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(listener(received.clone(), shutdown_rx));

        info!(
            "Subscribed to {} changes on {}.{}",
            filter.event, filter.schema, filter.table
        );

        Self {
            filter,
            received,
            shutdown: Some(shutdown),
            task,
        }
    }

    pub fn filter(&self) -> &ChangeFilter {
        &self.filter
    }

    /// Number of matching change events seen so far
    pub fn received(&self) -> u64 {
        self.received.load(Ordering::Relaxed)
    }

    pub fn is_active(&self) -> bool {
        !self.task.is_finished()
    }

    /// Signals the listener to stop and waits for it to finish
    pub async fn stop(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Err(err) = (&mut self.task).await {
            warn!("Change listener ended abnormally: {}", err);
        }
        info!(
            "Unsubscribed from {}.{} after {} change(s)",
            self.filter.schema,
            self.filter.table,
            self.received()
        );
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}

/// Logs and counts a change event delivered to a listener
pub fn record_change(event: &ChangeEvent, received: &AtomicU64) {
    received.fetch_add(1, Ordering::Relaxed);
    info!(
        "Change received! type={}, table={}.{}, record={:?}, old_record={:?}",
        event.kind.as_str(),
        event.schema,
        event.table,
        event.record,
        event.old_record
    );
}

/// Owns the process-wide change subscription and keeps at most one listener alive
pub struct SubscriptionManager {
    feed: Arc<dyn ChangeFeed>,
    filter: ChangeFilter,
    active: Mutex<Option<Subscription>>,
}

impl SubscriptionManager {
    pub fn new(feed: Arc<dyn ChangeFeed>, filter: ChangeFilter) -> Self {
        Self {
            feed,
            filter,
            active: Mutex::new(None),
        }
    }

    /// Starts a subscription unless one is already running.
    /// Returns true when a new listener was started.
    pub async fn ensure_subscribed(&self) -> Result<bool> {
        let mut active = self.active.lock().await;

        if let Some(subscription) = active.as_ref() {
            if subscription.is_active() {
                info!("Change subscription already active, reusing it");
                return Ok(false);
            }
            warn!("Previous change subscription ended, starting a new one");
        }

        let subscription = self.feed.subscribe(self.filter.clone()).await?;
        *active = Some(subscription);
        Ok(true)
    }

    pub async fn is_subscribed(&self) -> bool {
        self.active
            .lock()
            .await
            .as_ref()
            .map(Subscription::is_active)
            .unwrap_or(false)
    }

    /// Events seen by the current subscription, zero when there is none
    pub async fn received(&self) -> u64 {
        self.active
            .lock()
            .await
            .as_ref()
            .map(Subscription::received)
            .unwrap_or(0)
    }

    /// Stops the current subscription. Returns false when nothing was running.
    pub async fn stop(&self) -> bool {
        let subscription = self.active.lock().await.take();
        match subscription {
            Some(subscription) => {
                subscription.stop().await;
                true
            }
            None => false,
        }
    }
}
