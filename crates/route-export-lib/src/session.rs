//! Point-and-click routing session
//!
//! A renderer-independent state machine for the two-marker routing flow:
//!
//! ```text
//! Idle --place--> AwaitingSecondPoint --place--> RouteActive
//!  ^                                                 |
//!  +------------- clear / route_failed --------------+
//!                 RouteActive --place--> AwaitingSecondPoint (restart)
//! ```
//!
//! The session never talks to a routing service or a map itself; it returns
//! [`SessionEffect`]s for the host to carry out and accepts the results
//! back. Resetting is a plain state change, so a host can rebuild whatever
//! display handle it needs from [`RoutingSession::state`].

use crate::{GeoPoint, RouteResult};

/// Initial map view
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MapDefaults {
    pub center: GeoPoint,
    pub zoom: u8,
}

impl Default for MapDefaults {
    fn default() -> Self {
        Self {
            center: GeoPoint::new(23.8859, 45.0792),
            zoom: 6,
        }
    }
}

/// Identifies one routing request so late answers can be discarded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(u64);

/// Which of the two markers an event refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Origin,
    Destination,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Idle,
    AwaitingSecondPoint {
        origin: GeoPoint,
    },
    RouteActive {
        origin: GeoPoint,
        destination: GeoPoint,
        /// Request whose answer is still expected, if any
        pending: Option<RequestId>,
        /// Latest route, `None` until the first answer arrives
        route: Option<RouteResult>,
    },
}

/// Work the host must perform after a transition
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEffect {
    /// Ask the routing service for a driving route
    RequestRoute {
        id: RequestId,
        origin: GeoPoint,
        destination: GeoPoint,
    },
    /// Markers and route were dropped; remove them from the display
    Cleared,
}

#[derive(Debug, Clone)]
pub struct RoutingSession {
    state: SessionState,
    next_request: u64,
}

impl Default for RoutingSession {
    fn default() -> Self {
        Self::new()
    }
}

impl RoutingSession {
    pub fn new() -> Self {
        Self {
            state: SessionState::Idle,
            next_request: 0,
        }
    }

    #[inline]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Placed markers in order
    pub fn markers(&self) -> Vec<GeoPoint> {
        match &self.state {
            SessionState::Idle => Vec::new(),
            SessionState::AwaitingSecondPoint { origin } => vec![*origin],
            SessionState::RouteActive {
                origin,
                destination,
                ..
            } => vec![*origin, *destination],
        }
    }

    /// Route the exporter should work on, if one has been received
    pub fn current_route(&self) -> Option<&RouteResult> {
        match &self.state {
            SessionState::RouteActive { route, .. } => route.as_ref(),
            _ => None,
        }
    }

    /// Whether an answer from the routing service is outstanding
    pub fn is_pending(&self) -> bool {
        matches!(
            self.state,
            SessionState::RouteActive {
                pending: Some(_),
                ..
            }
        )
    }

    fn request(&mut self, origin: GeoPoint, destination: GeoPoint) -> (RequestId, SessionEffect) {
        let id = RequestId(self.next_request);
        self.next_request += 1;
        (
            id,
            SessionEffect::RequestRoute {
                id,
                origin,
                destination,
            },
        )
    }

    /// Handle a click on the map
    ///
    /// A click while a route is shown discards it and starts over with the
    /// clicked point as the new origin.
    pub fn place_marker(&mut self, point: GeoPoint) -> Option<SessionEffect> {
        match std::mem::replace(&mut self.state, SessionState::Idle) {
            SessionState::Idle => {
                self.state = SessionState::AwaitingSecondPoint { origin: point };
                None
            }
            SessionState::AwaitingSecondPoint { origin } => {
                let (id, effect) = self.request(origin, point);
                self.state = SessionState::RouteActive {
                    origin,
                    destination: point,
                    pending: Some(id),
                    route: None,
                };
                Some(effect)
            }
            SessionState::RouteActive { .. } => {
                tracing::debug!("Third marker placed, restarting route");
                self.state = SessionState::AwaitingSecondPoint { origin: point };
                Some(SessionEffect::Cleared)
            }
        }
    }

    /// Handle a marker being dragged to `point`
    ///
    /// With both markers placed this re-requests the route; the previous
    /// route stays current until the new one arrives.
    pub fn drag_marker(&mut self, marker: Marker, point: GeoPoint) -> Option<SessionEffect> {
        match &mut self.state {
            SessionState::Idle => None,
            SessionState::AwaitingSecondPoint { origin } => {
                if marker == Marker::Origin {
                    *origin = point;
                }
                None
            }
            SessionState::RouteActive {
                origin,
                destination,
                ..
            } => {
                match marker {
                    Marker::Origin => *origin = point,
                    Marker::Destination => *destination = point,
                }
                let (origin, destination) = (*origin, *destination);
                let (id, effect) = self.request(origin, destination);
                if let SessionState::RouteActive { pending, .. } = &mut self.state {
                    *pending = Some(id);
                }
                Some(effect)
            }
        }
    }

    /// Accept the routing service's answer to request `id`
    ///
    /// Returns false (and changes nothing) for answers that are no longer
    /// awaited.
    pub fn route_computed(&mut self, id: RequestId, result: RouteResult) -> bool {
        match &mut self.state {
            SessionState::RouteActive { pending, route, .. } if *pending == Some(id) => {
                *pending = None;
                *route = Some(result);
                true
            }
            _ => {
                tracing::debug!("Discarding stale route answer {:?}", id);
                false
            }
        }
    }

    /// Replace the active route after the user reshaped it on the map
    pub fn route_edited(&mut self, result: RouteResult) -> bool {
        match &mut self.state {
            SessionState::RouteActive { route, .. } if route.is_some() => {
                *route = Some(result);
                true
            }
            _ => false,
        }
    }

    /// The routing service failed for request `id`; the session is cleared
    ///
    /// Returns the status line to show, or `None` for a stale failure.
    pub fn route_failed(&mut self, id: RequestId, reason: &str) -> Option<String> {
        let awaited = matches!(
            self.state,
            SessionState::RouteActive { pending: Some(pending), .. } if pending == id
        );
        if !awaited {
            return None;
        }
        tracing::warn!("Could not calculate route: {reason}");
        self.state = SessionState::Idle;
        Some(format!("Could not calculate route: {reason}"))
    }

    /// Drop markers and route
    pub fn clear(&mut self) -> SessionEffect {
        self.state = SessionState::Idle;
        SessionEffect::Cleared
    }
}

/// Status line for a freshly computed route, from its first leg
pub fn route_summary(result: &RouteResult) -> Option<String> {
    let leg = result.primary()?.legs.first()?;
    let distance = leg.distance_meters?;
    let mut summary = if distance >= 1000.0 {
        format!("Distance: {:.1} km", distance / 1000.0)
    } else {
        format!("Distance: {distance:.0} m")
    };
    if let Some(seconds) = leg.duration_seconds {
        let minutes = (seconds / 60.0).round() as u64;
        if minutes >= 60 {
            summary.push_str(&format!(" (Time: {} h {} min)", minutes / 60, minutes % 60));
        } else {
            summary.push_str(&format!(" (Time: {minutes} min)"));
        }
    }
    Some(summary)
}
