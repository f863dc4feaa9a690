//! Check-in controller
//!
//! Owns the selection, the device location, session coordinate overrides and
//! the check-in status. It reacts to picker and geolocation events and drives
//! the map surface in response. It never talks to the geolocation provider
//! directly: it hands out [`LocationRequest`] tickets and is told about their
//! outcome later, so several requests can be in flight at once.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use futures::future::LocalBoxFuture;
use tracing::{debug, info, warn};

use crate::Result;
use crate::catalog::Business;
use crate::error::StoreCheckError;
use crate::geo::Coordinates;
use crate::geolocation::GeolocationError;
use crate::map::{BUSINESS_ZOOM, FitRequest, LOCATE_ZOOM, MapSurface, MarkerRole};
use crate::notice::{Notice, Notifier};

/// Check-ins closer than this (inclusive) confirm the recorded location
pub const CHECK_IN_RADIUS_M: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CheckInStatus {
    #[default]
    Idle,
    TooFar,
    Success,
    UpdateRequest,
    LocationAdded,
}

impl CheckInStatus {
    /// Outcome of checking in at `meters` from the recorded location
    #[must_use]
    pub fn for_distance(meters: f64) -> Self {
        if meters <= CHECK_IN_RADIUS_M {
            CheckInStatus::Success
        } else {
            CheckInStatus::TooFar
        }
    }
}

/// Coordinates recorded for a business during this session
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionOverride {
    pub coordinates: Coordinates,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocatePurpose {
    /// Manual or initial refresh of the device location
    Refresh,
    /// Frame a freshly selected business together with the device
    FrameSelection,
}

/// Ticket for one geolocation request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocationRequest {
    pub generation: u64,
    pub purpose: LocatePurpose,
}

/// Work the caller has to schedule after an operation
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Followup {
    Done,
    /// Ask the geolocation provider for a fix and report back
    Locate(LocationRequest),
    /// Wait for the map to settle, then call [`CheckInController::fit_both_markers`]
    FitAfterSettle,
}

struct Placed<H> {
    handle: H,
    at: Coordinates,
}

pub struct CheckInController<M: MapSurface, N: Notifier> {
    map: M,
    notifier: N,
    geolocation_supported: bool,
    overrides: HashMap<String, SessionOverride>,
    selected: Option<Business>,
    user_location: Option<Coordinates>,
    status: CheckInStatus,
    current_marker: Option<Placed<M::Marker>>,
    business_marker: Option<Placed<M::Marker>>,
    latest_request: u64,
}

impl<M: MapSurface, N: Notifier> CheckInController<M, N> {
    pub fn new(map: M, notifier: N, geolocation_supported: bool) -> Self {
        Self {
            map,
            notifier,
            geolocation_supported,
            overrides: HashMap::new(),
            selected: None,
            user_location: None,
            status: CheckInStatus::Idle,
            current_marker: None,
            business_marker: None,
            latest_request: 0,
        }
    }

    pub fn selected(&self) -> Option<&Business> {
        self.selected.as_ref()
    }

    pub fn user_location(&self) -> Option<Coordinates> {
        self.user_location
    }

    pub fn status(&self) -> CheckInStatus {
        self.status
    }

    pub fn override_for(&self, id: &str) -> Option<&SessionOverride> {
        self.overrides.get(id)
    }

    pub fn map(&self) -> &M {
        &self.map
    }

    pub fn map_mut(&mut self) -> &mut M {
        &mut self.map
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn notifier_mut(&mut self) -> &mut N {
        &mut self.notifier
    }

    /// Catalog record with this session's override applied
    pub fn effective(&self, business: &Business) -> Business {
        let mut effective = business.clone();
        if let Some(recorded) = self.overrides.get(&business.id) {
            effective.coordinates = Some(recorded.coordinates);
        }
        effective
    }

    /// Put a business (or nothing) under inspection. Always resets the
    /// check-in status, even when the same business is picked again.
    pub fn select_business(&mut self, business: Option<&Business>) -> Followup {
        let effective = business.map(|b| self.effective(b));
        self.status = CheckInStatus::Idle;

        let Some(business) = effective else {
            info!("Selection cleared");
            self.selected = None;
            self.remove_business_marker();
            return self.recenter_on_user();
        };

        info!("Selected business '{}' ({})", business.name, business.id);
        let coordinates = business.coordinates;
        self.selected = Some(business);

        match coordinates {
            Some(at) => {
                self.place_business_marker(at);
                match self.request_location(LocatePurpose::FrameSelection) {
                    Ok(request) => Followup::Locate(request),
                    Err(_) => self.frame_known_markers(),
                }
            }
            None => {
                self.remove_business_marker();
                self.recenter_on_user()
            }
        }
    }

    /// Ask for a fresh device position.
    ///
    /// Fails with [`StoreCheckError::GeolocationUnsupported`] before issuing
    /// anything when the platform has no location capability.
    pub fn refresh_current_location(&mut self) -> Result<LocationRequest> {
        match self.request_location(LocatePurpose::Refresh) {
            Ok(request) => Ok(request),
            Err(e) => {
                self.notifier.notify(Notice::alert(e.user_message()));
                Err(e)
            }
        }
    }

    /// Feed the outcome of a geolocation request back in. Responses to
    /// anything but the latest issued request are dropped.
    pub fn complete_location_request(
        &mut self,
        request: LocationRequest,
        outcome: std::result::Result<Coordinates, GeolocationError>,
    ) -> Followup {
        if request.generation != self.latest_request {
            debug!(
                "Discarding stale location response #{} (latest is #{})",
                request.generation, self.latest_request
            );
            return Followup::Done;
        }

        match outcome {
            Ok(position) => {
                info!("Device located at {}", position);
                self.user_location = Some(position);
                self.place_current_marker(position);
                if self.business_marker.is_some() {
                    Followup::FitAfterSettle
                } else {
                    self.map.fly_to(position, LOCATE_ZOOM);
                    Followup::Done
                }
            }
            Err(reason) => {
                let error = StoreCheckError::from(reason);
                warn!("{}", error);
                match request.purpose {
                    LocatePurpose::Refresh => {
                        self.notifier.notify(Notice::alert(error.user_message()));
                        Followup::Done
                    }
                    LocatePurpose::FrameSelection => {
                        let message = format!("Could not refresh current location: {error}");
                        self.notifier.notify(Notice::warning(message));
                        self.frame_known_markers()
                    }
                }
            }
        }
    }

    /// Check in at the selected business from the current device location
    pub fn perform_check_in(&mut self) -> Followup {
        let (Some(business), Some(user)) = (self.selected.as_ref(), self.user_location) else {
            debug!("Check-in ignored: needs a selected business and a known location");
            return Followup::Done;
        };

        let recorded = business.coordinates;
        match recorded {
            Some(recorded) => {
                let distance = user.distance_to(&recorded);
                self.status = CheckInStatus::for_distance(distance);
                info!(
                    "Check-in at '{}': {:.1} m away -> {:?}",
                    business.id, distance, self.status
                );
                Followup::Done
            }
            None => self.add_new_location(),
        }
    }

    /// Acknowledge that the recorded location looks wrong. Only the status
    /// changes; no coordinates are written.
    pub fn confirm_location_update(&mut self) -> bool {
        if self.status != CheckInStatus::TooFar {
            debug!(
                "Location update confirmation ignored in status {:?}",
                self.status
            );
            return false;
        }
        self.status = CheckInStatus::UpdateRequest;
        info!("Location update requested");
        true
    }

    /// Record the device location as the selected business's coordinates
    /// for the rest of the session.
    pub fn add_new_location(&mut self) -> Followup {
        let Some(user) = self.user_location else {
            debug!("Add location ignored: device location unknown");
            return Followup::Done;
        };
        let Some(business) = self.selected.as_mut() else {
            debug!("Add location ignored: nothing selected");
            return Followup::Done;
        };

        self.overrides.insert(
            business.id.clone(),
            SessionOverride {
                coordinates: user,
                recorded_at: Utc::now(),
            },
        );
        business.coordinates = Some(user);
        info!("Recorded location {} for business '{}'", user, business.id);

        self.status = CheckInStatus::LocationAdded;
        self.place_business_marker(user);
        Followup::FitAfterSettle
    }

    /// Frame both markers, reading their positions now. No-op unless both
    /// are placed.
    pub fn fit_both_markers(&mut self) {
        let (Some(current), Some(business)) = (&self.current_marker, &self.business_marker) else {
            debug!("Fit skipped: both markers are needed");
            return;
        };
        let fit = FitRequest::for_markers(current.at, business.at, self.map.viewport_width());
        self.map.fit_bounds(fit);
    }

    /// Resolves once the map has applied pending marker updates
    pub fn settled(&self) -> LocalBoxFuture<'static, ()> {
        self.map.settled()
    }

    fn request_location(&mut self, purpose: LocatePurpose) -> Result<LocationRequest> {
        if !self.geolocation_supported {
            return Err(StoreCheckError::GeolocationUnsupported);
        }
        self.latest_request += 1;
        debug!(
            "Issuing location request #{} ({:?})",
            self.latest_request, purpose
        );
        Ok(LocationRequest {
            generation: self.latest_request,
            purpose,
        })
    }

    fn recenter_on_user(&mut self) -> Followup {
        match self.user_location {
            Some(position) => {
                self.map.fly_to(position, LOCATE_ZOOM);
                Followup::Done
            }
            None => match self.refresh_current_location() {
                Ok(request) => Followup::Locate(request),
                Err(_) => Followup::Done,
            },
        }
    }

    /// Fallback framing when no fresh fix is available
    fn frame_known_markers(&mut self) -> Followup {
        match (&self.current_marker, &self.business_marker) {
            (Some(_), Some(_)) => Followup::FitAfterSettle,
            (None, Some(business)) => {
                self.map.fly_to(business.at, BUSINESS_ZOOM);
                Followup::Done
            }
            _ => Followup::Done,
        }
    }

    fn place_current_marker(&mut self, at: Coordinates) {
        upsert_marker(
            &mut self.map,
            &mut self.current_marker,
            MarkerRole::CurrentLocation,
            at,
        );
    }

    fn place_business_marker(&mut self, at: Coordinates) {
        upsert_marker(
            &mut self.map,
            &mut self.business_marker,
            MarkerRole::Business,
            at,
        );
    }

    fn remove_business_marker(&mut self) {
        if let Some(marker) = self.business_marker.take() {
            self.map.remove_marker(marker.handle);
        }
    }
}

fn upsert_marker<M: MapSurface>(
    map: &mut M,
    slot: &mut Option<Placed<M::Marker>>,
    role: MarkerRole,
    at: Coordinates,
) {
    match slot {
        Some(marker) => {
            map.move_marker(&marker.handle, at);
            marker.at = at;
        }
        None => {
            let handle = map.create_marker(role, at);
            *slot = Some(Placed { handle, at });
        }
    }
}
