//! Decoding of single realtime vehicle records.
//!
//! Records arrive as loose JSON: ids may be numbers or strings and optional
//! fields may be missing. Each record decodes on its own.

use std::sync::Arc;

use serde::Deserialize;

use crate::identifiers::*;
use crate::models::entities::VehicleAttrs;
use crate::models::types::*;
use crate::spatial::GeoPoint;

/// One record of a realtime vehicle batch, as served by the realtime
/// endpoint and the push channel.
#[derive(Clone, Debug, Deserialize)]
pub struct VehicleObservation {
    pub id: VehicleIdentifier,
    pub route: RouteIdentifier,
    pub location: GeoPoint,
    pub direction: String,
    #[serde(default)]
    pub status_time: String,
    #[serde(default)]
    pub adherence: i32,
}

impl VehicleObservation {
    pub fn from_value(value: &serde_json::Value) -> Result<Self> {
        if !value.is_object() {
            return Err(TransitError::InvalidObservation(format!(
                "expected an object, got {}",
                value
            )));
        }
        Ok(Self::deserialize(value)?)
    }

    pub fn attrs(&self) -> VehicleAttrs {
        VehicleAttrs {
            direction: Direction::parse(&self.direction),
            adherence: self.adherence,
            status_time: Arc::from(self.status_time.as_str()),
        }
    }
}
