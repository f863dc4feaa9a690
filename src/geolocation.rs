//! Device geolocation
//!
//! The provider is an external collaborator: a single-shot, asynchronous
//! position fix that may fail or never resolve.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use thiserror::Error;
use tracing::debug;

use crate::geo::Coordinates;

/// Why a position fix could not be delivered
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeolocationError {
    #[error("User denied geolocation permission")]
    PermissionDenied,

    #[error("Position unavailable")]
    PositionUnavailable,

    #[error("Geolocation request timed out")]
    Timeout,

    #[error("{0}")]
    Other(String),
}

/// Source of the device's current position
pub trait GeolocationProvider {
    /// Whether the platform has any location capability at all
    fn is_supported(&self) -> bool {
        true
    }

    async fn current_position(&self) -> Result<Coordinates, GeolocationError>;
}

/// What the simulated device reports on the next fix
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceFix {
    At(Coordinates),
    Fails(GeolocationError),
}

/// Geolocation provider backed by a settable position.
///
/// Clones share the same device, so one handle can move the device while
/// another is answering requests.
#[derive(Debug, Clone)]
pub struct SimulatedGeolocation {
    supported: bool,
    latency: Duration,
    fix: Arc<Mutex<DeviceFix>>,
}

impl SimulatedGeolocation {
    #[must_use]
    pub fn new(initial: Option<Coordinates>) -> Self {
        let fix = initial.map_or(
            DeviceFix::Fails(GeolocationError::PositionUnavailable),
            DeviceFix::At,
        );
        Self {
            supported: true,
            latency: Duration::ZERO,
            fix: Arc::new(Mutex::new(fix)),
        }
    }

    /// A platform without any location capability
    #[must_use]
    pub fn unsupported() -> Self {
        Self {
            supported: false,
            ..Self::new(None)
        }
    }

    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Move the simulated device
    pub fn move_to(&self, position: Coordinates) {
        self.set_fix(DeviceFix::At(position));
    }

    /// Make subsequent fixes fail with `error`
    pub fn fail_with(&self, error: GeolocationError) {
        self.set_fix(DeviceFix::Fails(error));
    }

    fn set_fix(&self, fix: DeviceFix) {
        debug!("Simulated device fix now {:?}", fix);
        *self.fix.lock().unwrap_or_else(PoisonError::into_inner) = fix;
    }

    fn snapshot(&self) -> DeviceFix {
        self.fix
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl GeolocationProvider for SimulatedGeolocation {
    fn is_supported(&self) -> bool {
        self.supported
    }

    async fn current_position(&self) -> Result<Coordinates, GeolocationError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        match self.snapshot() {
            DeviceFix::At(position) => Ok(position),
            DeviceFix::Fails(error) => Err(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_simulated_fix_follows_moves() {
        let device = SimulatedGeolocation::new(Some(Coordinates::new(13.80, 100.50)));
        let handle = device.clone();

        assert_eq!(
            device.current_position().await,
            Ok(Coordinates::new(13.80, 100.50))
        );

        handle.move_to(Coordinates::new(13.90, 100.60));
        assert_eq!(
            device.current_position().await,
            Ok(Coordinates::new(13.90, 100.60))
        );
    }

    #[tokio::test]
    async fn test_simulated_failure() {
        let device = SimulatedGeolocation::new(None);
        assert_eq!(
            device.current_position().await,
            Err(GeolocationError::PositionUnavailable)
        );

        device.fail_with(GeolocationError::PermissionDenied);
        assert_eq!(
            device.current_position().await,
            Err(GeolocationError::PermissionDenied)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_latency_is_honoured() {
        let device = SimulatedGeolocation::new(Some(Coordinates::new(1.0, 2.0)))
            .with_latency(Duration::from_secs(3));
        let started = tokio::time::Instant::now();
        device.current_position().await.unwrap();
        assert!(started.elapsed() >= Duration::from_secs(3));
    }

    #[test]
    fn test_unsupported_platform() {
        assert!(!SimulatedGeolocation::unsupported().is_supported());
        assert!(SimulatedGeolocation::new(None).is_supported());
    }
}
