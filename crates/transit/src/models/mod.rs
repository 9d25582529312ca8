//! Entity models, types, traits and wire shapes.

pub mod entities;
pub mod traits;
pub mod types;
pub mod wire;

// Re-exports for convenience
pub use entities::{Observer, ObserverSource, Stop, StopAttrs, StopSchedule, Vehicle, VehicleAttrs};
pub use traits::TrackedEntity;
pub use types::{Direction, Result, ScheduleStatus, StatusSeverity, TransitError};
pub use wire::{RouteDescriptor, StopDescriptor, UpcomingResponse, UpcomingTimes};
