use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::atomic::AtomicU64;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, error, info, warn};

use super::{record_change, ChangeFeed, ChangeFilter, Subscription};
use crate::config::StoreConfig;
use crate::error::{Result, StoreError};
use crate::models::events::ChangeEvent;

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);
const PHOENIX_TOPIC: &str = "phoenix";

/// Phoenix channel frame as spoken by the realtime server (protocol 1.0.0)
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PhoenixMessage {
    pub topic: String,
    pub event: String,
    #[serde(default)]
    pub payload: Value,
    #[serde(rename = "ref", default)]
    pub msg_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join_ref: Option<String>,
}

pub fn channel_topic(channel: &str) -> String {
    format!("realtime:{}", channel)
}

pub fn join_message(topic: &str, filter: &ChangeFilter, access_token: &str, msg_ref: u64) -> PhoenixMessage {
    PhoenixMessage {
        topic: topic.to_string(),
        event: "phx_join".to_string(),
        payload: json!({
            "config": {
                "broadcast": { "ack": false, "self": false },
                "presence": { "key": "" },
                "postgres_changes": [{
                    "event": filter.event,
                    "schema": filter.schema,
                    "table": filter.table,
                }],
                "private": false,
            },
            "access_token": access_token,
        }),
        msg_ref: Some(msg_ref.to_string()),
        join_ref: Some(msg_ref.to_string()),
    }
}

pub fn heartbeat_message(msg_ref: u64) -> PhoenixMessage {
    PhoenixMessage {
        topic: PHOENIX_TOPIC.to_string(),
        event: "heartbeat".to_string(),
        payload: json!({}),
        msg_ref: Some(msg_ref.to_string()),
        join_ref: None,
    }
}

pub fn leave_message(topic: &str, msg_ref: u64) -> PhoenixMessage {
    PhoenixMessage {
        topic: topic.to_string(),
        event: "phx_leave".to_string(),
        payload: json!({}),
        msg_ref: Some(msg_ref.to_string()),
        join_ref: None,
    }
}

/// Extracts the row change carried by a `postgres_changes` frame
pub fn parse_change(message: &PhoenixMessage) -> Option<ChangeEvent> {
    if message.event != "postgres_changes" {
        return None;
    }
    let data = message.payload.get("data")?;
    match serde_json::from_value(data.clone()) {
        Ok(event) => Some(event),
        Err(err) => {
            warn!("Unreadable postgres_changes payload: {}", err);
            None
        }
    }
}

/// What the listener should do after a frame for its topic
#[derive(Debug, PartialEq)]
pub enum FrameOutcome {
    Continue,
    Change(ChangeEvent),
    Failed(String),
}

pub fn classify_frame(message: &PhoenixMessage, topic: &str) -> FrameOutcome {
    if message.topic != topic {
        debug!("Ignoring frame for topic {}: {}", message.topic, message.event);
        return FrameOutcome::Continue;
    }

    match message.event.as_str() {
        "postgres_changes" => match parse_change(message) {
            Some(event) => FrameOutcome::Change(event),
            None => FrameOutcome::Continue,
        },
        "phx_reply" | "system" => {
            let status = message.payload.get("status").and_then(Value::as_str);
            if status == Some("error") {
                FrameOutcome::Failed(message.payload.to_string())
            } else {
                debug!("Realtime {} on {}: {:?}", message.event, topic, status);
                FrameOutcome::Continue
            }
        }
        "phx_error" | "phx_close" => FrameOutcome::Failed(format!("channel {}", message.event)),
        _ => FrameOutcome::Continue,
    }
}

/// Change feed backed by the realtime websocket server
pub struct RealtimeChangeFeed {
    url: String,
    channel: String,
    access_token: String,
}

impl RealtimeChangeFeed {
    pub fn new(config: &StoreConfig) -> Self {
        Self {
            url: config.realtime_url(),
            channel: config.channel.clone(),
            access_token: config.service_role_key.clone(),
        }
    }
}

#[async_trait]
impl ChangeFeed for RealtimeChangeFeed {
    async fn subscribe(&self, filter: ChangeFilter) -> Result<Subscription> {
        let url = self.url.clone();
        let topic = channel_topic(&self.channel);
        let access_token = self.access_token.clone();
        let listener_filter = filter.clone();

        Ok(Subscription::spawn(filter, move |received, shutdown| async move {
            match listen(&url, &topic, &access_token, &listener_filter, received, shutdown).await {
                Ok(()) => info!("Realtime channel {} closed", topic),
                Err(err) => error!("Realtime channel {} failed: {}", topic, err),
            }
        }))
    }
}

fn encode(message: &PhoenixMessage) -> Result<Message> {
    Ok(Message::Text(serde_json::to_string(message)?))
}

fn feed_error(err: impl std::fmt::Display) -> StoreError {
    StoreError::Feed(err.to_string())
}

async fn listen(
    url: &str,
    topic: &str,
    access_token: &str,
    filter: &ChangeFilter,
    received: Arc<AtomicU64>,
    mut shutdown: oneshot::Receiver<()>,
) -> Result<()> {
    let (socket, _) = connect_async(url).await.map_err(feed_error)?;
    let (mut sink, mut stream) = socket.split();
    info!("Connected to realtime server, joining {}", topic);

    let mut next_ref: u64 = 1;
    sink.send(encode(&join_message(topic, filter, access_token, next_ref))?)
        .await
        .map_err(feed_error)?;

    let mut heartbeat = tokio::time::interval(HEARTBEAT_INTERVAL);
    // The first tick fires immediately
    heartbeat.tick().await;

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                next_ref += 1;
                let _ = sink.send(encode(&leave_message(topic, next_ref))?).await;
                let _ = sink.close().await;
                return Ok(());
            }
            _ = heartbeat.tick() => {
                next_ref += 1;
                sink.send(encode(&heartbeat_message(next_ref))?)
                    .await
                    .map_err(feed_error)?;
            }
            frame = stream.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    let message: PhoenixMessage = match serde_json::from_str(&text) {
                        Ok(message) => message,
                        Err(err) => {
                            warn!("Skipping unreadable realtime frame: {}", err);
                            continue;
                        }
                    };
                    match classify_frame(&message, topic) {
                        FrameOutcome::Continue => {}
                        FrameOutcome::Change(event) => {
                            if filter.matches(&event) {
                                record_change(&event, &received);
                            }
                        }
                        FrameOutcome::Failed(reason) => return Err(StoreError::Feed(reason)),
                    }
                }
                Some(Ok(Message::Close(_))) | None => {
                    return Err(StoreError::Feed("connection closed by server".to_string()));
                }
                Some(Ok(_)) => {}
                Some(Err(err)) => return Err(feed_error(err)),
            }
        }
    }
}
