//! Single-threaded UI session
//!
//! Events from the picker and the controls arrive on a channel. Geolocation
//! fixes and map settle waits run as futures next to it, so the UI keeps
//! reacting while a fix is outstanding.

use std::sync::Arc;

use futures::StreamExt;
use futures::future::LocalBoxFuture;
use futures::stream::FuturesUnordered;
use tokio::sync::mpsc;
use tracing::{debug, instrument};

use crate::catalog::Catalog;
use crate::controller::{CheckInController, Followup, LocationRequest};
use crate::geo::Coordinates;
use crate::geolocation::{GeolocationError, GeolocationProvider};
use crate::map::MapSurface;
use crate::notice::Notifier;
use crate::picker::{LocationPicker, SelectionChanged};

/// Input coming from the user interface
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    SelectionChanged(SelectionChanged),
    RefreshLocation,
    CheckIn,
    ConfirmLocationUpdate,
}

enum Wakeup {
    Located(LocationRequest, Result<Coordinates, GeolocationError>),
    Settled,
}

type Pending<'a> = FuturesUnordered<LocalBoxFuture<'a, Wakeup>>;

pub struct Session<M: MapSurface, N: Notifier, G: GeolocationProvider> {
    controller: CheckInController<M, N>,
    picker: LocationPicker,
    geolocation: G,
}

impl<M, N, G> Session<M, N, G>
where
    M: MapSurface,
    N: Notifier,
    G: GeolocationProvider,
{
    pub fn new(catalog: Arc<Catalog>, map: M, notifier: N, geolocation: G) -> Self {
        let supported = geolocation.is_supported();
        Self {
            controller: CheckInController::new(map, notifier, supported),
            picker: LocationPicker::new(catalog),
            geolocation,
        }
    }

    pub fn controller(&self) -> &CheckInController<M, N> {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut CheckInController<M, N> {
        &mut self.controller
    }

    pub fn picker(&self) -> &LocationPicker {
        &self.picker
    }

    /// Apply one event without waiting on any follow-up work
    pub fn handle(&mut self, event: UiEvent) -> Followup {
        apply_event(&mut self.controller, &self.picker, event)
    }

    /// Run until the event channel closes, then finish outstanding work.
    pub async fn run(&mut self, events: mpsc::Receiver<UiEvent>) {
        self.run_with(events, |_| {}).await;
    }

    /// Like [`Session::run`], calling `observe` after every processed event
    /// or completion.
    #[instrument(level = "debug", skip_all)]
    pub async fn run_with<F>(&mut self, mut events: mpsc::Receiver<UiEvent>, mut observe: F)
    where
        F: FnMut(&CheckInController<M, N>),
    {
        let Session {
            controller,
            picker,
            geolocation,
        } = self;
        let geolocation: &G = geolocation;
        let mut pending: Pending<'_> = FuturesUnordered::new();

        let initial = match controller.refresh_current_location() {
            Ok(request) => Followup::Locate(request),
            Err(_) => Followup::Done,
        };
        schedule(initial, controller, geolocation, &mut pending);
        observe(&*controller);

        loop {
            tokio::select! {
                event = events.recv() => {
                    let Some(event) = event else { break };
                    debug!("UI event {:?}", event);
                    let followup = apply_event(controller, picker, event);
                    schedule(followup, controller, geolocation, &mut pending);
                    observe(&*controller);
                }
                Some(wakeup) = pending.next(), if !pending.is_empty() => {
                    let followup = wake(controller, wakeup);
                    schedule(followup, controller, geolocation, &mut pending);
                    observe(&*controller);
                }
            }
        }

        let count = pending.len();
        debug!("Event channel closed, finishing {count} pending tasks");
        while let Some(wakeup) = pending.next().await {
            let followup = wake(controller, wakeup);
            schedule(followup, controller, geolocation, &mut pending);
            observe(&*controller);
        }
    }
}

fn apply_event<M: MapSurface, N: Notifier>(
    controller: &mut CheckInController<M, N>,
    picker: &LocationPicker,
    event: UiEvent,
) -> Followup {
    match event {
        UiEvent::SelectionChanged(selection) => {
            controller.select_business(picker.resolve(&selection))
        }
        UiEvent::RefreshLocation => match controller.refresh_current_location() {
            Ok(request) => Followup::Locate(request),
            Err(_) => Followup::Done,
        },
        UiEvent::CheckIn => controller.perform_check_in(),
        UiEvent::ConfirmLocationUpdate => {
            controller.confirm_location_update();
            Followup::Done
        }
    }
}

fn wake<M: MapSurface, N: Notifier>(
    controller: &mut CheckInController<M, N>,
    wakeup: Wakeup,
) -> Followup {
    match wakeup {
        Wakeup::Located(request, outcome) => controller.complete_location_request(request, outcome),
        Wakeup::Settled => {
            controller.fit_both_markers();
            Followup::Done
        }
    }
}

fn schedule<'a, M, N, G>(
    followup: Followup,
    controller: &CheckInController<M, N>,
    geolocation: &'a G,
    pending: &mut Pending<'a>,
) where
    M: MapSurface,
    N: Notifier,
    G: GeolocationProvider,
{
    match followup {
        Followup::Done => {}
        Followup::Locate(request) => {
            pending.push(Box::pin(async move {
                Wakeup::Located(request, geolocation.current_position().await)
            }));
        }
        Followup::FitAfterSettle => {
            let settled = controller.settled();
            pending.push(Box::pin(async move {
                settled.await;
                Wakeup::Settled
            }));
        }
    }
}
