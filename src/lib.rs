//! `StoreCheck` - store locator check-in
//!
//! This library provides the check-in controller of a store locator map:
//! pick a business from a static catalog, locate the device, and either
//! confirm the business location or record it for the rest of the session.
//! The map widget, the geolocation source and the notification surface are
//! collaborators behind traits.

pub mod catalog;
pub mod config;
pub mod controller;
pub mod error;
pub mod geo;
pub mod geolocation;
pub mod logging;
pub mod map;
pub mod notice;
pub mod panel;
pub mod picker;
pub mod session;

// Re-export core types for public API
pub use catalog::{Business, Catalog};
pub use config::StoreCheckConfig;
pub use controller::{CheckInController, CheckInStatus, Followup, LocationRequest};
pub use error::StoreCheckError;
pub use geo::{Bounds, Coordinates, haversine_meters};
pub use geolocation::{GeolocationError, GeolocationProvider, SimulatedGeolocation};
pub use map::{FitRequest, MapSurface, MarkerRole, Padding};
pub use notice::{Notice, Notifier};
pub use panel::DetailPanel;
pub use picker::{LocationPicker, SelectionChanged};
pub use session::{Session, UiEvent};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, StoreCheckError>;
