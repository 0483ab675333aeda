//! Host-side tracking: snapshot records, flush cadence and a step loop.
//!
//! The simulator is pure; persistence and display are the host's job. This
//! module gives hosts the record shape the external `simulations_taxi` table
//! expects, the "flush every Nth tick" policy, and a [`TrackingRun`] helper
//! that advances one tick at a time and hands due snapshots to a
//! [`SnapshotSink`]. Wall-clock pacing stays with the caller.

use serde::Serialize;
use thiserror::Error;

use crate::config::DEFAULT_PERSIST_EVERY_TICKS;
use crate::error::PmrError;
use crate::geo::GeoPoint;
use crate::taxi::{SessionStatus, TaxiSimulationSession, TaxiSimulator};

#[derive(Debug, Error)]
pub enum TrackingError {
    #[error(transparent)]
    Simulation(#[from] PmrError),
    #[error("snapshot sink failed: {0}")]
    Sink(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Value of the external `statut_course` column.
///
/// A stopped ride is written back as waiting, the same as one not yet begun.
pub fn course_status(status: SessionStatus) -> &'static str {
    match status {
        SessionStatus::Pending | SessionStatus::Stopped => "en_attente",
        SessionStatus::Running => "en_cours",
        SessionStatus::Arrived => "arrivee",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaxiSnapshot {
    pub tick: u32,
    #[serde(rename = "position_actuelle")]
    pub position: GeoPoint,
    #[serde(rename = "progression_pct")]
    pub progress_percent: f64,
    #[serde(rename = "eta_minutes")]
    pub eta_minutes: f64,
    #[serde(rename = "distance_restante_km")]
    pub remaining_distance_km: f64,
    #[serde(rename = "statut_course")]
    pub status: &'static str,
}

impl From<&TaxiSimulationSession> for TaxiSnapshot {
    fn from(session: &TaxiSimulationSession) -> Self {
        Self {
            tick: session.ticks_elapsed(),
            position: session.current_position(),
            progress_percent: session.progress_percent(),
            eta_minutes: session.remaining_eta_minutes(),
            remaining_distance_km: session.remaining_distance_km(),
            status: course_status(session.status()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersistCadence {
    every_ticks: u32,
}

impl Default for PersistCadence {
    fn default() -> Self {
        Self {
            every_ticks: DEFAULT_PERSIST_EVERY_TICKS,
        }
    }
}

impl PersistCadence {
    /// `every_ticks` of zero is treated as one.
    pub fn every(every_ticks: u32) -> Self {
        Self {
            every_ticks: every_ticks.max(1),
        }
    }

    pub fn every_ticks(&self) -> u32 {
        self.every_ticks
    }

    /// Whether the transition `previous -> next` must be written out: a
    /// cadence boundary was crossed, the ride arrived, or the status changed.
    pub fn should_persist(
        &self,
        previous: &TaxiSimulationSession,
        next: &TaxiSimulationSession,
    ) -> bool {
        if next.status() != previous.status() || next.is_arrived() {
            return true;
        }
        previous.ticks_elapsed() / self.every_ticks != next.ticks_elapsed() / self.every_ticks
    }
}

pub trait SnapshotSink {
    fn record(&mut self, snapshot: &TaxiSnapshot) -> Result<(), TrackingError>;
}

/// Keeps every recorded snapshot in memory.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    snapshots: Vec<TaxiSnapshot>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshots(&self) -> &[TaxiSnapshot] {
        &self.snapshots
    }

    pub fn last(&self) -> Option<&TaxiSnapshot> {
        self.snapshots.last()
    }
}

impl SnapshotSink for RecordingSink {
    fn record(&mut self, snapshot: &TaxiSnapshot) -> Result<(), TrackingError> {
        self.snapshots.push(snapshot.clone());
        Ok(())
    }
}

/// One tracked ride: the current session plus its simulator and cadence.
#[derive(Debug, Clone)]
pub struct TrackingRun {
    simulator: TaxiSimulator,
    cadence: PersistCadence,
    session: TaxiSimulationSession,
}

impl TrackingRun {
    pub fn new(
        simulator: TaxiSimulator,
        cadence: PersistCadence,
        session: TaxiSimulationSession,
    ) -> Self {
        Self {
            simulator,
            cadence,
            session,
        }
    }

    pub fn session(&self) -> &TaxiSimulationSession {
        &self.session
    }

    pub fn into_session(self) -> TaxiSimulationSession {
        self.session
    }

    pub fn is_finished(&self) -> bool {
        self.session.is_arrived()
    }

    /// Advance one tick; returns the snapshot when it was due and recorded.
    pub fn step<S: SnapshotSink + ?Sized>(
        &mut self,
        sink: &mut S,
    ) -> Result<Option<TaxiSnapshot>, TrackingError> {
        let next = self.simulator.advance(&self.session, 1)?;
        let due = self.cadence.should_persist(&self.session, &next);
        self.session = next;
        if !due {
            return Ok(None);
        }
        let snapshot = TaxiSnapshot::from(&self.session);
        sink.record(&snapshot)?;
        tracing::debug!(
            tick = snapshot.tick,
            progress_percent = snapshot.progress_percent,
            eta_minutes = snapshot.eta_minutes,
            "persisted taxi snapshot"
        );
        Ok(Some(snapshot))
    }

    /// Stop the ride and record the stopped state.
    pub fn stop<S: SnapshotSink + ?Sized>(
        &mut self,
        sink: &mut S,
    ) -> Result<TaxiSnapshot, TrackingError> {
        self.session = self.simulator.stop(&self.session)?;
        let snapshot = TaxiSnapshot::from(&self.session);
        sink.record(&snapshot)?;
        Ok(snapshot)
    }

    /// Step until arrival without pacing; used by tests and batch replays.
    pub fn run_to_arrival<S: SnapshotSink + ?Sized>(
        &mut self,
        sink: &mut S,
    ) -> Result<&TaxiSimulationSession, TrackingError> {
        while !self.is_finished() {
            self.step(sink)?;
        }
        Ok(&self.session)
    }
}
