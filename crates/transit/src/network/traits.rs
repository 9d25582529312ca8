//! Pluggable data fetching.
//!
//! The route, realtime and upcoming-schedule endpoints live outside this
//! crate. Implement [`TransitFeed`] to supply them; `marta-live-core` ships
//! an HTTP implementation.

use std::future::Future;
use std::pin::Pin;

use crate::identifiers::*;
use crate::models::wire::{RouteDescriptor, UpcomingResponse};

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP {0}")]
    Status(u16),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

pub type FeedResult<T> = std::result::Result<T, FeedError>;

pub type FeedFuture<'a, T> = Pin<Box<dyn Future<Output = FeedResult<T>> + Send + 'a>>;

/// Source of route, realtime and schedule data for one client.
pub trait TransitFeed: Send + Sync {
    /// Shapes and stops for a route.
    fn route<'a>(&'a self, route: &'a RouteIdentifier) -> FeedFuture<'a, RouteDescriptor>;

    /// The full current vehicle batch for a route. Records are left as raw
    /// JSON so that one bad record cannot fail the whole batch.
    fn realtime<'a>(
        &'a self,
        route: &'a RouteIdentifier,
    ) -> FeedFuture<'a, Vec<serde_json::Value>>;

    /// Upcoming arrivals for every stop on the route, or for one stop.
    fn upcoming<'a>(
        &'a self,
        route: &'a RouteIdentifier,
        stop: Option<&'a StopIdentifier>,
    ) -> FeedFuture<'a, UpcomingResponse>;
}
