use std::time::Duration;

use marta_live_transit::identifiers::RouteIdentifier;
use serde::Deserialize;

pub const DEFAULT_PUSH_QUEUE: &str = "marta";
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;
pub const DEFAULT_FOCUS_ZOOM: u8 = 15;
pub const DEFAULT_GEOLOCATION_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing {0}")]
    Missing(&'static str),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

/// Settings for one tracking session.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Root of the route/realtime/upcoming endpoints.
    pub base_url: String,
    pub route: String,
    /// Socket.IO endpoint. Without one the session polls.
    pub push_url: Option<String>,
    /// Push event name for vehicle batches; staleness notices arrive on
    /// `"{push_queue}/stale"`.
    pub push_queue: String,
    pub poll_interval_secs: u64,
    pub focus_zoom: u8,
    pub geolocation_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            route: String::new(),
            push_url: None,
            push_queue: DEFAULT_PUSH_QUEUE.to_owned(),
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            focus_zoom: DEFAULT_FOCUS_ZOOM,
            geolocation_timeout_secs: DEFAULT_GEOLOCATION_TIMEOUT_SECS,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>, route: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            route: route.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::Missing("base_url"));
        }
        if self.route.trim().is_empty() {
            return Err(ConfigError::Missing("route"));
        }
        if self.poll_interval_secs == 0 {
            return Err(ConfigError::Zero("poll_interval_secs"));
        }
        if self.geolocation_timeout_secs == 0 {
            return Err(ConfigError::Zero("geolocation_timeout_secs"));
        }
        Ok(())
    }

    pub fn route_id(&self) -> RouteIdentifier {
        RouteIdentifier::new(&self.route)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn geolocation_timeout(&self) -> Duration {
        Duration::from_secs(self.geolocation_timeout_secs)
    }

    pub fn stale_queue(&self) -> String {
        format!("{}/stale", self.push_queue)
    }
}
