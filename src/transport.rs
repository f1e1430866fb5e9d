//! Population transports.
//!
//! A transport moves through a small state machine:
//!
//! ```text
//! Idle -> Scheduled -> InTransit -> Arrived
//!                  \            \-> Redirected -> Arrived
//!                   \-> Cancelled
//! ```
//!
//! A colony owns at most one scheduled transport. Launching hands the
//! transport to the galaxy, which tracks it until it lands.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::colony::ColonyId;
use crate::empire::EmpireId;

/// Where a transport is in its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TransportState {
    /// Nothing scheduled.
    #[default]
    Idle,
    /// Size and destination chosen; population not yet loaded.
    Scheduled,
    /// Launched and travelling.
    InTransit,
    /// Sent somewhere else while travelling.
    Redirected,
    /// Landed at its destination.
    Arrived,
    /// Called off before launch.
    Cancelled,
}

/// A population shipment between two colonies.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Transport {
    /// Current state.
    pub state: TransportState,
    /// Population units carried.
    pub size: u32,
    /// Sending colony.
    pub origin: Option<ColonyId>,
    /// Receiving colony.
    pub destination: Option<ColonyId>,
    /// Empire sending the population.
    pub owner: Option<EmpireId>,
    /// Owner of the destination when the transport was launched.
    pub target_empire: Option<EmpireId>,
    /// Distance covered per turn.
    pub travel_speed: f64,
    /// Turn the transport left its origin.
    pub launch_turn: u32,
    /// Turn the transport lands.
    pub arrival_turn: u32,
}

impl Transport {
    /// Whether the transport is travelling.
    #[must_use]
    pub const fn in_flight(&self) -> bool {
        matches!(
            self.state,
            TransportState::InTransit | TransportState::Redirected
        )
    }

    /// Whether a shipment is waiting for launch.
    #[must_use]
    pub const fn is_scheduled(&self) -> bool {
        matches!(self.state, TransportState::Scheduled)
    }

    /// Plan a shipment of `size` units. Replaces any earlier unlaunched plan.
    ///
    /// Returns `false` if the transport is already travelling.
    pub fn schedule(
        &mut self,
        origin: ColonyId,
        owner: EmpireId,
        destination: ColonyId,
        target_empire: EmpireId,
        size: u32,
    ) -> bool {
        if self.in_flight() {
            warn!(%origin, "transport already in flight, schedule rejected");
            return false;
        }
        *self = Self {
            state: TransportState::Scheduled,
            size,
            origin: Some(origin),
            destination: Some(destination),
            owner: Some(owner),
            target_empire: Some(target_empire),
            ..Self::default()
        };
        true
    }

    /// Load and send a scheduled shipment.
    ///
    /// Arrival takes at least one turn.
    pub fn launch(&mut self, turn: u32, distance: f64, speed: f64) -> bool {
        if !self.is_scheduled() || self.size == 0 {
            return false;
        }
        self.state = TransportState::InTransit;
        self.travel_speed = speed;
        self.launch_turn = turn;
        self.arrival_turn = turn + travel_turns(distance, speed);
        debug!(
            origin = ?self.origin,
            destination = ?self.destination,
            size = self.size,
            arrival = self.arrival_turn,
            "transport launched"
        );
        true
    }

    /// Send a travelling transport to a new destination from its current turn.
    pub fn redirect(
        &mut self,
        destination: ColonyId,
        target_empire: EmpireId,
        turn: u32,
        distance: f64,
    ) -> bool {
        if !self.in_flight() {
            return false;
        }
        self.state = TransportState::Redirected;
        self.destination = Some(destination);
        self.target_empire = Some(target_empire);
        self.arrival_turn = turn + travel_turns(distance, self.travel_speed);
        true
    }

    /// Call off an unlaunched shipment.
    pub fn cancel(&mut self) -> bool {
        if !self.is_scheduled() {
            return false;
        }
        self.state = TransportState::Cancelled;
        self.size = 0;
        true
    }

    /// Whether the transport lands on `turn`.
    #[must_use]
    pub const fn arrives_on(&self, turn: u32) -> bool {
        self.in_flight() && self.arrival_turn <= turn
    }

    /// Mark the transport as landed.
    pub fn land(&mut self) -> bool {
        if !self.in_flight() {
            return false;
        }
        self.state = TransportState::Arrived;
        true
    }
}

/// Whole turns needed to cover `distance`.
#[must_use]
pub fn travel_turns(distance: f64, speed: f64) -> u32 {
    if speed <= 0.0 || !distance.is_finite() {
        return 1;
    }
    let turns = (distance.max(0.0) / speed).ceil().clamp(1.0, f64::from(u16::MAX));
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let turns = turns as u32;
    turns
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scheduled(size: u32) -> Transport {
        let mut transport = Transport::default();
        assert!(transport.schedule(ColonyId(1), EmpireId(0), ColonyId(2), EmpireId(1), size));
        transport
    }

    #[test]
    fn test_lifecycle() {
        let mut transport = scheduled(10);
        assert!(transport.is_scheduled());
        assert!(transport.launch(4, 7.0, 3.0));
        assert_eq!(transport.arrival_turn, 7);
        assert!(!transport.arrives_on(6));
        assert!(transport.arrives_on(7));
        assert!(transport.land());
        assert_eq!(transport.state, TransportState::Arrived);
    }

    #[test]
    fn test_cannot_schedule_in_flight() {
        let mut transport = scheduled(10);
        transport.launch(0, 1.0, 1.0);
        assert!(!transport.schedule(ColonyId(1), EmpireId(0), ColonyId(3), EmpireId(0), 5));
        assert!(!transport.cancel());
    }

    #[test]
    fn test_cancel_only_before_launch() {
        let mut transport = scheduled(10);
        assert!(transport.cancel());
        assert_eq!(transport.state, TransportState::Cancelled);
        assert!(!transport.launch(0, 1.0, 1.0));
    }

    #[test]
    fn test_redirect_recomputes_arrival() {
        let mut transport = scheduled(10);
        transport.launch(0, 30.0, 3.0);
        assert!(transport.redirect(ColonyId(5), EmpireId(0), 2, 4.0));
        assert_eq!(transport.state, TransportState::Redirected);
        assert_eq!(transport.arrival_turn, 4);
        assert!(transport.in_flight());
    }

    #[test]
    fn test_travel_takes_at_least_one_turn() {
        assert_eq!(travel_turns(0.0, 3.0), 1);
        assert_eq!(travel_turns(5.0, 0.0), 1);
        assert_eq!(travel_turns(9.1, 3.0), 4);
    }
}
