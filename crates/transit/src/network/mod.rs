//! Network abstractions.

pub mod traits;

pub use traits::{FeedError, FeedFuture, FeedResult, TransitFeed};
