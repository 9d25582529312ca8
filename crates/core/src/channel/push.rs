use futures_util::FutureExt;
use marta_live_transit::identifiers::VehicleIdentifier;
use rust_socketio::asynchronous::{Client, ClientBuilder};
use rust_socketio::Payload;
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::channel::ChannelError;
use crate::session::SessionEvent;

/// Live Socket.IO subscription to the vehicle and staleness events.
pub struct PushSubscription {
    client: Client,
}

impl PushSubscription {
    pub async fn close(self) {
        if let Err(e) = self.client.disconnect().await {
            warn!("push disconnect failed: {e}");
        }
    }
}

/// Connect and subscribe to `queue` (vehicle batches) and `stale_queue`
/// (ids to evict).
pub async fn subscribe(
    url: &str,
    queue: &str,
    stale_queue: &str,
    tx: mpsc::Sender<SessionEvent>,
) -> Result<PushSubscription, ChannelError> {
    let batch_tx = tx.clone();
    let stale_tx = tx;

    let on_batch = move |payload: Payload, _socket: Client| {
        let tx = batch_tx.clone();
        async move {
            match decode_batch(payload) {
                Some(batch) => {
                    let _ = tx.send(SessionEvent::VehicleBatch(batch)).await;
                }
                None => debug!("ignoring non-text push payload"),
            }
        }
        .boxed()
    };

    let on_stale = move |payload: Payload, _socket: Client| {
        let tx = stale_tx.clone();
        async move {
            let ids = decode_stale(payload);
            if !ids.is_empty() {
                let _ = tx.send(SessionEvent::Stale(ids)).await;
            }
        }
        .boxed()
    };

    let client = ClientBuilder::new(url)
        .on(queue, on_batch)
        .on(stale_queue, on_stale)
        .connect()
        .await
        .map_err(|e| ChannelError::Connect {
            url: url.to_owned(),
            reason: e.to_string(),
        })?;

    Ok(PushSubscription { client })
}

/// Flatten a push message into realtime records. A message may carry the
/// batch as one array argument or as several record arguments.
pub fn decode_batch(payload: Payload) -> Option<Vec<Value>> {
    match payload {
        Payload::Text(values) => Some(flatten(values)),
        _ => None,
    }
}

/// Vehicle ids from a staleness message. Entries that are not ids are
/// dropped.
pub fn decode_stale(payload: Payload) -> Vec<VehicleIdentifier> {
    match payload {
        Payload::Text(values) => flatten(values)
            .iter()
            .filter_map(VehicleIdentifier::from_json)
            .collect(),
        _ => Vec::new(),
    }
}

fn flatten(values: Vec<Value>) -> Vec<Value> {
    let mut records = Vec::new();
    for value in values {
        match value {
            Value::Array(items) => records.extend(items),
            Value::Null => {}
            other => records.push(other),
        }
    }
    records
}
