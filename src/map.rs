//! Map surface interface and viewport framing policy
//!
//! The map widget itself is an external collaborator. Commands sent to it are
//! fire-and-forget; the only thing it hands back is an opaque marker handle,
//! which the caller owns and threads back into later move/remove calls.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use futures::future::LocalBoxFuture;

use crate::geo::{Bounds, Coordinates};

/// Viewports narrower than this use the bottom-sheet layout
pub const NARROW_VIEWPORT_PX: u32 = 640;
/// Upper zoom bound when framing two markers
pub const FIT_MAX_ZOOM: f64 = 15.0;
/// Zoom used when centring on the device location
pub const LOCATE_ZOOM: f64 = 14.0;
/// Zoom used when flying to a lone business marker
pub const BUSINESS_ZOOM: f64 = 15.0;
/// Time the map gets to apply a marker update before bounds are measured
pub const FIT_SETTLE_DELAY: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MarkerRole {
    CurrentLocation,
    Business,
}

impl MarkerRole {
    #[must_use]
    pub fn color(self) -> &'static str {
        match self {
            MarkerRole::CurrentLocation => "red",
            MarkerRole::Business => "blue",
        }
    }
}

/// Screen-space padding in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Padding {
    pub top: u32,
    pub bottom: u32,
    pub left: u32,
    pub right: u32,
}

impl Padding {
    /// Narrow screens reserve room for the bottom detail panel, wide screens
    /// for the control stack at the top.
    #[must_use]
    pub fn for_viewport(width_px: u32) -> Self {
        if width_px < NARROW_VIEWPORT_PX {
            Padding {
                top: 80,
                bottom: 200,
                left: 20,
                right: 20,
            }
        } else {
            Padding {
                top: 200,
                bottom: 100,
                left: 100,
                right: 100,
            }
        }
    }
}

/// A bounds-fit command
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitRequest {
    pub bounds: Bounds,
    pub padding: Padding,
    pub max_zoom: f64,
}

impl FitRequest {
    /// Frame the current-location and business markers together
    #[must_use]
    pub fn for_markers(current: Coordinates, business: Coordinates, width_px: u32) -> Self {
        let mut bounds = Bounds::at(current);
        bounds.extend(business);
        FitRequest {
            bounds,
            padding: Padding::for_viewport(width_px),
            max_zoom: FIT_MAX_ZOOM,
        }
    }
}

/// The map widget as seen by the check-in controller
pub trait MapSurface {
    /// Opaque handle to a placed marker
    type Marker;

    fn create_marker(&mut self, role: MarkerRole, at: Coordinates) -> Self::Marker;
    fn move_marker(&mut self, marker: &Self::Marker, at: Coordinates);
    fn remove_marker(&mut self, marker: Self::Marker);
    fn fly_to(&mut self, center: Coordinates, zoom: f64);
    fn fit_bounds(&mut self, fit: FitRequest);

    /// Current display width in pixels
    fn viewport_width(&self) -> u32;

    /// Resolves once pending marker updates have been applied. Surfaces
    /// without an explicit signal fall back to a short timer.
    fn settled(&self) -> LocalBoxFuture<'static, ()> {
        Box::pin(tokio::time::sleep(FIT_SETTLE_DELAY))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerId(pub u64);

/// A command as received by a map surface
#[derive(Debug, Clone, PartialEq)]
pub enum MapCommand {
    CreateMarker {
        marker: MarkerId,
        role: MarkerRole,
        at: Coordinates,
    },
    MoveMarker {
        marker: MarkerId,
        at: Coordinates,
    },
    RemoveMarker {
        marker: MarkerId,
    },
    FlyTo {
        center: Coordinates,
        zoom: f64,
    },
    FitBounds(FitRequest),
}

impl fmt::Display for MapCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapCommand::CreateMarker { marker, role, at } => {
                write!(f, "📍 {} marker #{} at {}", role.color(), marker.0, at)
            }
            MapCommand::MoveMarker { marker, at } => write!(f, "↪ marker #{} to {}", marker.0, at),
            MapCommand::RemoveMarker { marker } => write!(f, "✖ marker #{}", marker.0),
            MapCommand::FlyTo { center, zoom } => write!(f, "✈ fly to {center} (zoom {zoom})"),
            MapCommand::FitBounds(fit) => write!(
                f,
                "⛶ fit {} .. {} padding t{} b{} l{} r{} max zoom {}",
                fit.bounds.south_west,
                fit.bounds.north_east,
                fit.padding.top,
                fit.padding.bottom,
                fit.padding.left,
                fit.padding.right,
                fit.max_zoom
            ),
        }
    }
}

/// Map surface that keeps every command it receives and the markers that
/// are currently placed.
#[derive(Debug)]
pub struct RecordingMap {
    width_px: u32,
    settle_delay: Duration,
    next_marker: u64,
    live: BTreeMap<MarkerId, (MarkerRole, Coordinates)>,
    commands: Vec<MapCommand>,
}

impl RecordingMap {
    #[must_use]
    pub fn new(width_px: u32) -> Self {
        Self {
            width_px,
            settle_delay: FIT_SETTLE_DELAY,
            next_marker: 1,
            live: BTreeMap::new(),
            commands: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    pub fn set_viewport_width(&mut self, width_px: u32) {
        self.width_px = width_px;
    }

    #[must_use]
    pub fn commands(&self) -> &[MapCommand] {
        &self.commands
    }

    /// Drain the commands received so far
    pub fn take_commands(&mut self) -> Vec<MapCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Positions of placed markers with the given role
    #[must_use]
    pub fn markers(&self, role: MarkerRole) -> Vec<Coordinates> {
        self.live
            .values()
            .filter(|(r, _)| *r == role)
            .map(|(_, at)| *at)
            .collect()
    }

    /// Most recent viewport command, if any
    #[must_use]
    pub fn last_viewport_command(&self) -> Option<&MapCommand> {
        self.commands
            .iter()
            .rev()
            .find(|c| matches!(c, MapCommand::FlyTo { .. } | MapCommand::FitBounds(_)))
    }
}

impl MapSurface for RecordingMap {
    type Marker = MarkerId;

    fn create_marker(&mut self, role: MarkerRole, at: Coordinates) -> MarkerId {
        let marker = MarkerId(self.next_marker);
        self.next_marker += 1;
        self.live.insert(marker, (role, at));
        self.commands.push(MapCommand::CreateMarker { marker, role, at });
        marker
    }

    fn move_marker(&mut self, marker: &MarkerId, at: Coordinates) {
        if let Some(entry) = self.live.get_mut(marker) {
            entry.1 = at;
        }
        self.commands.push(MapCommand::MoveMarker {
            marker: *marker,
            at,
        });
    }

    fn remove_marker(&mut self, marker: MarkerId) {
        self.live.remove(&marker);
        self.commands.push(MapCommand::RemoveMarker { marker });
    }

    fn fly_to(&mut self, center: Coordinates, zoom: f64) {
        self.commands.push(MapCommand::FlyTo { center, zoom });
    }

    fn fit_bounds(&mut self, fit: FitRequest) {
        self.commands.push(MapCommand::FitBounds(fit));
    }

    fn viewport_width(&self) -> u32 {
        self.width_px
    }

    fn settled(&self) -> LocalBoxFuture<'static, ()> {
        Box::pin(tokio::time::sleep(self.settle_delay))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(375, Padding { top: 80, bottom: 200, left: 20, right: 20 })]
    #[case(639, Padding { top: 80, bottom: 200, left: 20, right: 20 })]
    #[case(640, Padding { top: 200, bottom: 100, left: 100, right: 100 })]
    #[case(1920, Padding { top: 200, bottom: 100, left: 100, right: 100 })]
    fn test_padding_by_viewport(#[case] width: u32, #[case] expected: Padding) {
        assert_eq!(Padding::for_viewport(width), expected);
    }

    #[test]
    fn test_fit_request_covers_both_markers() {
        let current = Coordinates::new(13.90, 100.60);
        let business = Coordinates::new(13.8267, 100.5750);
        let fit = FitRequest::for_markers(current, business, 1024);

        assert!(fit.bounds.contains(&current));
        assert!(fit.bounds.contains(&business));
        assert_eq!(fit.max_zoom, FIT_MAX_ZOOM);
        assert_eq!(fit.padding.top, 200);
    }

    #[test]
    fn test_coincident_markers_still_capped() {
        let p = Coordinates::new(13.8267, 100.5750);
        let fit = FitRequest::for_markers(p, p, 320);
        assert_eq!(fit.bounds.south_west, fit.bounds.north_east);
        assert_eq!(fit.max_zoom, 15.0);
    }

    #[test]
    fn test_recording_map_tracks_live_markers() {
        let mut map = RecordingMap::new(800);
        let red = map.create_marker(MarkerRole::CurrentLocation, Coordinates::new(1.0, 1.0));
        let blue = map.create_marker(MarkerRole::Business, Coordinates::new(2.0, 2.0));
        map.move_marker(&red, Coordinates::new(1.5, 1.5));
        map.remove_marker(blue);

        assert_eq!(
            map.markers(MarkerRole::CurrentLocation),
            vec![Coordinates::new(1.5, 1.5)]
        );
        assert!(map.markers(MarkerRole::Business).is_empty());
        assert_eq!(map.commands().len(), 4);
        assert!(map.last_viewport_command().is_none());
    }

    #[test]
    fn test_marker_colours() {
        assert_eq!(MarkerRole::CurrentLocation.color(), "red");
        assert_eq!(MarkerRole::Business.color(), "blue");
    }
}
