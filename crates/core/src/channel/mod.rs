//! How realtime updates reach the session.
//!
//! Push (Socket.IO) is used when an endpoint is configured and the
//! connection succeeds; otherwise the full batch is polled on an interval.
//! The choice is made once at startup. Either way the session only ever
//! sees [`SessionEvent`]s.

pub mod poll;
pub mod push;

use std::sync::Arc;

use marta_live_transit::network::TransitFeed;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::config::ClientConfig;
use crate::session::SessionEvent;

pub use poll::PollHandle;
pub use push::PushSubscription;

#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("push connection to {url} failed: {reason}")]
    Connect { url: String, reason: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum ChannelMode {
    Push,
    Poll,
}

/// A running update channel. Dropping it does not stop delivery; call
/// [`UpdateChannel::close`].
pub enum UpdateChannel {
    Push(PushSubscription),
    Poll(PollHandle),
}

impl UpdateChannel {
    pub fn mode(&self) -> ChannelMode {
        match self {
            UpdateChannel::Push(_) => ChannelMode::Push,
            UpdateChannel::Poll(_) => ChannelMode::Poll,
        }
    }

    pub async fn close(self) {
        match self {
            UpdateChannel::Push(subscription) => subscription.close().await,
            UpdateChannel::Poll(handle) => handle.stop(),
        }
    }
}

/// Pick push if it is configured and reachable, polling otherwise.
pub async fn select(
    config: &ClientConfig,
    feed: Arc<dyn TransitFeed>,
    tx: mpsc::Sender<SessionEvent>,
) -> UpdateChannel {
    if let Some(url) = &config.push_url {
        let stale_queue = config.stale_queue();
        match push::subscribe(url, &config.push_queue, &stale_queue, tx.clone()).await {
            Ok(subscription) => {
                info!(url = %url, queue = %config.push_queue, "subscribed to push updates");
                return UpdateChannel::Push(subscription);
            }
            Err(e) => warn!("{e}; falling back to polling"),
        }
    }

    info!(every = ?config.poll_interval(), "polling for vehicle updates");
    UpdateChannel::Poll(poll::start(feed, config.route_id(), config.poll_interval(), tx))
}
