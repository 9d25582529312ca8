//! Rider geolocation seam. Acquiring a fix is the platform's job; failure
//! of any kind just means the session runs without a geolocated observer.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use marta_live_transit::spatial::GeoPoint;

#[derive(Debug, thiserror::Error)]
pub enum GeolocationError {
    #[error("geolocation is not available")]
    Unavailable,

    #[error("geolocation permission denied")]
    Denied,

    #[error("geolocation timed out")]
    Timeout,

    #[error("geolocation failed: {0}")]
    Failed(String),
}

pub type LocateFuture<'a> =
    Pin<Box<dyn Future<Output = Result<GeoPoint, GeolocationError>> + Send + 'a>>;

pub trait Geolocator: Send + Sync {
    fn locate(&self) -> LocateFuture<'_>;
}

/// Geolocator that always answers with the same fix, or always fails.
#[derive(Clone, Copy, Debug)]
pub struct FixedLocation(pub Option<GeoPoint>);

impl Geolocator for FixedLocation {
    fn locate(&self) -> LocateFuture<'_> {
        let fix = self.0;
        Box::pin(async move { fix.ok_or(GeolocationError::Unavailable) })
    }
}

pub async fn locate_within(
    geolocator: &dyn Geolocator,
    timeout: Duration,
) -> Result<GeoPoint, GeolocationError> {
    match tokio::time::timeout(timeout, geolocator.locate()).await {
        Ok(result) => result,
        Err(_) => Err(GeolocationError::Timeout),
    }
}
