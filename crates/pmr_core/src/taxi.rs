//! Taxi ride simulation: pure state transitions over a caller-owned session.
//!
//! A [`TaxiSimulationSession`] moves from its origin to its destination in
//! `total_ticks` equal steps. Each [`TaxiSimulator::advance`] call returns the
//! next session value; nothing is stored here, so the caller keeps the session
//! between ticks and decides when to persist it (see [`crate::tracking`]).
//!
//! ```text
//! Pending --activate/start--> Running --advance to 100%--> Arrived (terminal)
//!                             Running --stop--> Stopped --advance--> Running
//! ```
//!
//! Positions are blended in degree space, which is only accurate for short
//! urban rides. A stopped session is resumed by `advance`, never by a second
//! `start`.

use serde::{Deserialize, Serialize};

use crate::config::{
    SimulationParams, TrackingConfig, DEFAULT_LEG_DISTANCE_KM, DEFAULT_LEG_ETA_MINUTES,
};
use crate::error::{PmrError, Result};
use crate::geo::{distance_km, GeoPoint};
use crate::places::PlaceDirectory;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    Pending,
    Running,
    Arrived,
    Stopped,
}

/// Deserializing re-checks the construction rules and recomputes progress,
/// position and ETA from `ticks_elapsed`; stored derived values are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSession")]
pub struct TaxiSimulationSession {
    origin: GeoPoint,
    destination: GeoPoint,
    total_eta_minutes: f64,
    route_distance_km: f64,
    total_ticks: u32,
    ticks_elapsed: u32,
    progress_percent: f64,
    current_position: GeoPoint,
    remaining_eta_minutes: f64,
    status: SessionStatus,
}

#[derive(Deserialize)]
struct RawSession {
    origin: GeoPoint,
    destination: GeoPoint,
    total_eta_minutes: f64,
    route_distance_km: f64,
    total_ticks: u32,
    ticks_elapsed: u32,
    status: SessionStatus,
}

impl TryFrom<RawSession> for TaxiSimulationSession {
    type Error = PmrError;

    fn try_from(raw: RawSession) -> Result<Self> {
        check_total_eta(raw.total_eta_minutes)?;
        check_route_distance(raw.route_distance_km)?;
        if raw.total_ticks == 0 {
            return Err(PmrError::invalid_argument("total_ticks must be >= 1"));
        }
        if raw.ticks_elapsed > raw.total_ticks {
            return Err(PmrError::invalid_argument(format!(
                "ticks_elapsed {} exceeds total_ticks {}",
                raw.ticks_elapsed, raw.total_ticks
            )));
        }
        let finished = raw.ticks_elapsed == raw.total_ticks;
        let consistent = match raw.status {
            SessionStatus::Pending => raw.ticks_elapsed == 0,
            SessionStatus::Running | SessionStatus::Stopped => !finished,
            SessionStatus::Arrived => finished,
        };
        if !consistent {
            return Err(PmrError::invalid_argument(format!(
                "status {:?} does not match {} of {} ticks",
                raw.status, raw.ticks_elapsed, raw.total_ticks
            )));
        }

        let mut session = TaxiSimulationSession {
            origin: raw.origin,
            destination: raw.destination,
            total_eta_minutes: raw.total_eta_minutes,
            route_distance_km: raw.route_distance_km,
            total_ticks: raw.total_ticks,
            ticks_elapsed: raw.ticks_elapsed,
            progress_percent: 0.0,
            current_position: raw.origin,
            remaining_eta_minutes: raw.total_eta_minutes,
            status: raw.status,
        };
        session.refresh();
        Ok(session)
    }
}

fn check_total_eta(total_eta_minutes: f64) -> Result<()> {
    if !(total_eta_minutes.is_finite() && total_eta_minutes > 0.0) {
        return Err(PmrError::invalid_argument(
            "total_eta_minutes must be a positive number",
        ));
    }
    Ok(())
}

fn check_route_distance(route_distance_km: f64) -> Result<()> {
    if !(route_distance_km.is_finite() && route_distance_km >= 0.0) {
        return Err(PmrError::invalid_argument(
            "leg distance_km must be a non-negative number",
        ));
    }
    Ok(())
}

impl TaxiSimulationSession {
    pub fn origin(&self) -> GeoPoint {
        self.origin
    }

    pub fn destination(&self) -> GeoPoint {
        self.destination
    }

    pub fn total_eta_minutes(&self) -> f64 {
        self.total_eta_minutes
    }

    pub fn total_ticks(&self) -> u32 {
        self.total_ticks
    }

    pub fn ticks_elapsed(&self) -> u32 {
        self.ticks_elapsed
    }

    pub fn progress_percent(&self) -> f64 {
        self.progress_percent
    }

    pub fn current_position(&self) -> GeoPoint {
        self.current_position
    }

    pub fn remaining_eta_minutes(&self) -> f64 {
        self.remaining_eta_minutes
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_arrived(&self) -> bool {
        self.status == SessionStatus::Arrived
    }

    /// Planned route length; straight-line unless the leg supplied one.
    pub fn route_distance_km(&self) -> f64 {
        self.route_distance_km
    }

    /// Route distance still to cover, decaying linearly with progress.
    pub fn remaining_distance_km(&self) -> f64 {
        self.route_distance_km * (100.0 - self.progress_percent) / 100.0
    }

    fn refresh(&mut self) {
        self.ticks_elapsed = self.ticks_elapsed.min(self.total_ticks);
        if self.ticks_elapsed >= self.total_ticks {
            self.progress_percent = 100.0;
            self.current_position = self.destination;
            self.remaining_eta_minutes = 0.0;
            self.status = SessionStatus::Arrived;
            return;
        }
        if self.ticks_elapsed == 0 {
            self.progress_percent = 0.0;
            self.current_position = self.origin;
            self.remaining_eta_minutes = self.total_eta_minutes;
            return;
        }
        self.progress_percent =
            f64::from(self.ticks_elapsed) * 100.0 / f64::from(self.total_ticks);
        self.current_position = self
            .origin
            .interpolate(&self.destination, self.progress_percent / 100.0);
        self.remaining_eta_minutes = (self.total_eta_minutes * (100.0 - self.progress_percent)
            / 100.0)
            .round()
            .clamp(0.0, self.total_eta_minutes);
    }
}

/// A taxi segment of an itinerary, as the tracking workflow sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxiLeg {
    pub departure_label: String,
    pub arrival_label: String,
    pub duration_minutes: Option<f64>,
    pub distance_km: Option<f64>,
}

impl TaxiLeg {
    pub fn new(departure_label: impl Into<String>, arrival_label: impl Into<String>) -> Self {
        Self {
            departure_label: departure_label.into(),
            arrival_label: arrival_label.into(),
            duration_minutes: None,
            distance_km: None,
        }
    }

    pub fn with_duration_minutes(mut self, minutes: f64) -> Self {
        self.duration_minutes = Some(minutes);
        self
    }

    pub fn with_distance_km(mut self, km: f64) -> Self {
        self.distance_km = Some(km);
        self
    }
}

/// Drives sessions through their lifecycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaxiSimulator {
    params: SimulationParams,
    default_eta_minutes: f64,
    default_distance_km: f64,
}

impl Default for TaxiSimulator {
    fn default() -> Self {
        Self {
            params: SimulationParams::default(),
            default_eta_minutes: DEFAULT_LEG_ETA_MINUTES,
            default_distance_km: DEFAULT_LEG_DISTANCE_KM,
        }
    }
}

impl TaxiSimulator {
    pub fn new(params: SimulationParams) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            params,
            ..Self::default()
        })
    }

    pub fn from_config(config: &TrackingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            params: config.simulation,
            default_eta_minutes: config.default_eta_minutes,
            default_distance_km: config.default_distance_km,
        })
    }

    pub fn params(&self) -> SimulationParams {
        self.params
    }

    /// A session waiting for its ride to begin, positioned at `origin`.
    pub fn prepare(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
        total_eta_minutes: f64,
    ) -> Result<TaxiSimulationSession> {
        let route_distance_km = distance_km(&origin, &destination);
        self.build(origin, destination, total_eta_minutes, route_distance_km)
    }

    /// A running session at 0 %.
    pub fn start(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
        total_eta_minutes: f64,
    ) -> Result<TaxiSimulationSession> {
        let session = self.prepare(origin, destination, total_eta_minutes)?;
        self.activate(&session)
    }

    /// Resolve a leg's places and start it, filling in the planned ETA and
    /// distance when the leg has none.
    pub fn start_for_leg(
        &self,
        leg: &TaxiLeg,
        places: &PlaceDirectory,
    ) -> Result<TaxiSimulationSession> {
        let (origin, destination) = places.resolve_route(&leg.departure_label, &leg.arrival_label);
        let eta = leg.duration_minutes.unwrap_or(self.default_eta_minutes);
        let distance = leg.distance_km.unwrap_or(self.default_distance_km);
        check_route_distance(distance)?;
        let session = self.build(origin, destination, eta, distance)?;
        self.activate(&session)
    }

    /// `Pending -> Running`. Stopped sessions resume through [`Self::advance`].
    pub fn activate(&self, session: &TaxiSimulationSession) -> Result<TaxiSimulationSession> {
        match session.status {
            SessionStatus::Pending => {
                let mut next = session.clone();
                next.status = SessionStatus::Running;
                tracing::info!(
                    eta_minutes = next.total_eta_minutes,
                    total_ticks = next.total_ticks,
                    "taxi ride started"
                );
                Ok(next)
            }
            SessionStatus::Running => Ok(session.clone()),
            SessionStatus::Stopped => Err(PmrError::invalid_argument(
                "a stopped session resumes through advance, not start",
            )),
            SessionStatus::Arrived => Err(PmrError::SessionTerminated),
        }
    }

    /// Move `tick_count` ticks forward, clamped at arrival.
    pub fn advance(
        &self,
        session: &TaxiSimulationSession,
        tick_count: u32,
    ) -> Result<TaxiSimulationSession> {
        if tick_count == 0 {
            return Err(PmrError::invalid_argument("tick_count must be >= 1"));
        }
        match session.status {
            SessionStatus::Arrived => return Err(PmrError::SessionTerminated),
            SessionStatus::Pending => return Err(PmrError::SessionNotStarted),
            SessionStatus::Stopped => {
                tracing::info!(
                    progress_percent = session.progress_percent,
                    "taxi ride resumed"
                );
            }
            SessionStatus::Running => {}
        }

        let mut next = session.clone();
        next.status = SessionStatus::Running;
        next.ticks_elapsed = session.ticks_elapsed.saturating_add(tick_count);
        next.refresh();

        tracing::debug!(
            progress_percent = next.progress_percent,
            remaining_eta_minutes = next.remaining_eta_minutes,
            latitude = next.current_position.latitude(),
            longitude = next.current_position.longitude(),
            "advanced taxi session"
        );
        if next.is_arrived() {
            tracing::info!("taxi arrived at destination");
        }
        Ok(next)
    }

    /// Pause the ride; progress and position are kept.
    pub fn stop(&self, session: &TaxiSimulationSession) -> Result<TaxiSimulationSession> {
        match session.status {
            SessionStatus::Arrived => Err(PmrError::SessionTerminated),
            SessionStatus::Pending => Err(PmrError::SessionNotStarted),
            SessionStatus::Running | SessionStatus::Stopped => {
                let mut next = session.clone();
                next.status = SessionStatus::Stopped;
                tracing::info!(
                    progress_percent = next.progress_percent,
                    "taxi ride stopped"
                );
                Ok(next)
            }
        }
    }

    fn build(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
        total_eta_minutes: f64,
        route_distance_km: f64,
    ) -> Result<TaxiSimulationSession> {
        check_total_eta(total_eta_minutes)?;
        Ok(TaxiSimulationSession {
            origin,
            destination,
            total_eta_minutes,
            route_distance_km,
            total_ticks: self.params.total_ticks.max(1),
            ticks_elapsed: 0,
            progress_percent: 0.0,
            current_position: origin,
            remaining_eta_minutes: total_eta_minutes,
            status: SessionStatus::Pending,
        })
    }
}
